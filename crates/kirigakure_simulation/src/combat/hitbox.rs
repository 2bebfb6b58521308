//! Detached attack hitbox.
//!
//! Отдельный entity, принадлежащий актору (`owner`). Enabled только в active
//! sub-window текущего замаха; открывает/закрывает его scheduler, а
//! `enforce_hitbox_invariant` гасит всё, что осталось висеть.

use bevy::prelude::*;

use crate::actor::archetype::{Archetype, HitboxShape};
use crate::components::Facing;

#[derive(Component, Clone, Debug, Reflect)]
#[reflect(Component)]
pub struct AttackHitbox {
    pub owner: Entity,
    pub shape: HitboxShape,
    pub damage: u32,
    /// World-space center, synced from the owner each tick.
    pub center: Vec2,
    enabled: bool,
    swing: Option<u32>,
    /// Bodies already struck during the current swing (prevents double hits).
    struck: Vec<Entity>,
}

impl AttackHitbox {
    pub fn new(owner: Entity, archetype: &Archetype) -> Self {
        Self {
            owner,
            shape: archetype.hitbox,
            damage: archetype.attack_damage,
            center: Vec2::ZERO,
            enabled: false,
            swing: None,
            struck: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn swing(&self) -> Option<u32> {
        self.swing
    }

    /// Enable for `swing`; hit memory starts empty.
    pub fn open(&mut self, swing: u32) {
        self.enabled = true;
        self.swing = Some(swing);
        self.struck.clear();
    }

    /// Close if still serving `swing`. Returns true if it was open.
    pub fn close(&mut self, swing: u32) -> bool {
        if self.swing == Some(swing) && self.enabled {
            self.enabled = false;
            return true;
        }
        false
    }

    /// Unconditional shutdown (stun, death, invariant guard).
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn has_struck(&self, body: Entity) -> bool {
        self.struck.contains(&body)
    }

    pub fn record_strike(&mut self, body: Entity) {
        if !self.struck.contains(&body) {
            self.struck.push(body);
        }
    }

    pub fn place(&mut self, owner_position: Vec2, facing: Facing) {
        self.center = owner_position + Vec2::new(facing.sign() * self.shape.reach, 0.0);
    }

    /// AABB containment test used by hosts without their own collision layer.
    pub fn overlaps(&self, body_center: Vec2, body_half_extents: Vec2) -> bool {
        let delta = (self.center - body_center).abs();
        let reach = self.shape.half_extents + body_half_extents;
        delta.x <= reach.x && delta.y <= reach.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hitbox() -> AttackHitbox {
        AttackHitbox::new(Entity::from_raw(1), &Archetype::player())
    }

    #[test]
    fn test_open_close_tracks_swing() {
        let mut hitbox = hitbox();
        assert!(!hitbox.is_enabled());

        hitbox.open(3);
        assert!(hitbox.is_enabled());
        assert!(!hitbox.close(2));
        assert!(hitbox.is_enabled());
        assert!(hitbox.close(3));
        assert!(!hitbox.is_enabled());
    }

    #[test]
    fn test_strike_memory_resets_per_swing() {
        let mut hitbox = hitbox();
        let body = Entity::from_raw(7);

        hitbox.open(0);
        hitbox.record_strike(body);
        assert!(hitbox.has_struck(body));

        hitbox.open(1);
        assert!(!hitbox.has_struck(body));
    }

    #[test]
    fn test_placement_follows_facing() {
        let mut hitbox = hitbox();
        hitbox.place(Vec2::new(500.0, 450.0), Facing::Left);
        assert_eq!(hitbox.center, Vec2::new(380.0, 450.0));

        hitbox.place(Vec2::new(500.0, 450.0), Facing::Right);
        assert_eq!(hitbox.center, Vec2::new(620.0, 450.0));

        assert!(hitbox.overlaps(Vec2::new(700.0, 450.0), Vec2::new(20.0, 30.0)));
        assert!(!hitbox.overlaps(Vec2::new(800.0, 450.0), Vec2::new(20.0, 30.0)));
    }
}
