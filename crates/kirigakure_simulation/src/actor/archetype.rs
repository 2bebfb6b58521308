//! Archetype descriptors: одна state machine для всех акторов,
//! различия (health, speed, ranges, damage, timings): только в данных.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Which archetype an actor was spawned from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum ActorKind {
    Player,
    Grunt,
    Boss,
}

impl ActorKind {
    pub fn team(&self) -> Team {
        match self {
            ActorKind::Player => Team::Player,
            ActorKind::Grunt | ActorKind::Boss => Team::Hostile,
        }
    }

    pub fn is_enemy(&self) -> bool {
        self.team() == Team::Hostile
    }
}

/// Side of the fight. Hitboxes never resolve against their own team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum Team {
    Player,
    Hostile,
}

/// What happens once an actor of this archetype dies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub enum DeathBehavior {
    /// Body is removed after the death animation.
    Despawn,
    /// Despawn + tell the Encounter Director the boss is down.
    NotifyBossDefeat,
    /// Body stays, the encounter is lost.
    EndEncounter,
}

/// Windup → active → recovery durations (ms), measured from attack start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub struct AttackTiming {
    pub windup_ms: u64,
    pub active_ms: u64,
    pub recovery_ms: u64,
}

impl AttackTiming {
    pub fn active_start(&self, started_at: u64) -> u64 {
        started_at + self.windup_ms
    }

    pub fn active_end(&self, started_at: u64) -> u64 {
        self.active_start(started_at) + self.active_ms
    }

    pub fn finished_at(&self, started_at: u64) -> u64 {
        self.active_end(started_at) + self.recovery_ms
    }

    /// True while `now` is inside the hitbox window `[start+windup, start+windup+active)`.
    pub fn is_active_at(&self, started_at: u64, now: u64) -> bool {
        now >= self.active_start(started_at) && now < self.active_end(started_at)
    }
}

/// Attack collider placed `reach` units ahead of the actor in its facing direction.
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct HitboxShape {
    pub reach: f32,
    pub half_extents: Vec2,
}

#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
pub struct Archetype {
    pub kind: ActorKind,
    pub max_health: u32,
    pub move_speed: f32,
    pub jump_speed: f32,
    /// Enemy only: distance at which the actor starts chasing.
    pub detect_range: f32,
    /// Enemy only: distance at which the actor stops and swings.
    pub attack_range: f32,
    pub attack_damage: u32,
    /// Enemy only: minimum gap between two attack starts.
    pub attack_cooldown_ms: u64,
    pub timing: AttackTiming,
    pub hitbox: HitboxShape,
    pub hit_recovery_ms: u64,
    pub death_anim_ms: u64,
    pub scale: f32,
    pub on_death: DeathBehavior,
}

impl Archetype {
    pub fn player() -> Self {
        Self {
            kind: ActorKind::Player,
            max_health: 100,
            move_speed: 250.0,
            jump_speed: 600.0,
            detect_range: 0.0,
            attack_range: 0.0,
            attack_damage: 1,
            attack_cooldown_ms: 0,
            timing: AttackTiming {
                windup_ms: 300,
                active_ms: 100,
                recovery_ms: 100,
            },
            hitbox: HitboxShape {
                reach: 120.0,
                half_extents: Vec2::new(75.0, 75.0),
            },
            hit_recovery_ms: 250,
            death_anim_ms: 600,
            scale: 2.0,
            on_death: DeathBehavior::EndEncounter,
        }
    }

    pub fn grunt() -> Self {
        Self {
            kind: ActorKind::Grunt,
            max_health: 3,
            move_speed: 100.0,
            jump_speed: 0.0,
            detect_range: 500.0,
            attack_range: 150.0,
            attack_damage: 20,
            attack_cooldown_ms: 2000,
            timing: AttackTiming {
                windup_ms: 300,
                active_ms: 100,
                recovery_ms: 100,
            },
            hitbox: HitboxShape {
                reach: 120.0,
                half_extents: Vec2::new(75.0, 75.0),
            },
            hit_recovery_ms: 500,
            death_anim_ms: 600,
            scale: 2.0,
            on_death: DeathBehavior::Despawn,
        }
    }

    pub fn boss() -> Self {
        Self {
            kind: ActorKind::Boss,
            max_health: 10,
            move_speed: 140.0,
            jump_speed: 0.0,
            detect_range: 900.0,
            attack_range: 220.0,
            attack_damage: 35,
            attack_cooldown_ms: 1600,
            timing: AttackTiming {
                windup_ms: 450,
                active_ms: 150,
                recovery_ms: 250,
            },
            hitbox: HitboxShape {
                reach: 180.0,
                half_extents: Vec2::new(110.0, 110.0),
            },
            hit_recovery_ms: 400,
            death_anim_ms: 1200,
            scale: 3.0,
            on_death: DeathBehavior::NotifyBossDefeat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attack_timing_window_is_half_open() {
        let timing = Archetype::player().timing;

        assert!(!timing.is_active_at(1000, 1299));
        assert!(timing.is_active_at(1000, 1300));
        assert!(timing.is_active_at(1000, 1399));
        assert!(!timing.is_active_at(1000, 1400));
        assert_eq!(timing.finished_at(1000), 1500);
    }

    #[test]
    fn test_boss_outclasses_grunt() {
        let grunt = Archetype::grunt();
        let boss = Archetype::boss();

        assert!(boss.max_health > grunt.max_health);
        assert!(boss.attack_damage > grunt.attack_damage);
        assert!(boss.attack_range > grunt.attack_range);
        assert!(boss.scale > grunt.scale);
        assert_eq!(boss.on_death, DeathBehavior::NotifyBossDefeat);
    }

    #[test]
    fn test_grunt_dies_in_a_few_hits() {
        let grunt = Archetype::grunt();
        let player = Archetype::player();
        let hits = grunt.max_health / player.attack_damage;

        assert!((3..=10).contains(&hits));
        assert!(ActorKind::Grunt.is_enemy());
        assert!(!ActorKind::Player.is_enemy());
    }
}
