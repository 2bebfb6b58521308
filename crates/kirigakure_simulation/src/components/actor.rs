//! Базовые компоненты акторов: Actor, Health, Kinematics, timers.

use bevy::prelude::*;

use crate::actor::archetype::{ActorKind, Team};

/// Актор (player, grunt, boss): базовый компонент для живых существ.
///
/// Остальные компоненты с дефолтами добавляются через Required Components;
/// `Health` и `ActorStateMachine` вставляет `spawn_actor` по archetype.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(Kinematics, Grounded, ActorIntents, Invincibility, AttackCooldown, BodyCollision, StatusTint)]
pub struct Actor {
    pub kind: ActorKind,
}

impl Actor {
    pub fn new(kind: ActorKind) -> Self {
        Self { kind }
    }

    pub fn team(&self) -> Team {
        self.kind.team()
    }
}

/// Здоровье актора
///
/// Инвариант: 0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    /// Returns the amount actually removed.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let before = self.current;
        self.current = self.current.saturating_sub(amount);
        before - self.current
    }

    pub fn heal(&mut self, amount: u32) {
        self.current = self.current.saturating_add(amount).min(self.max);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn sign(&self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn flipped(&self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }

    /// Facing that looks from `from_x` towards `to_x`.
    pub fn towards(from_x: f32, to_x: f32) -> Self {
        if to_x < from_x {
            Facing::Left
        } else {
            Facing::Right
        }
    }
}

/// Position/velocity exchanged with the host physics once per tick.
///
/// The core writes `velocity` and `facing`; physics integrates and writes
/// `position` back.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Kinematics {
    pub position: Vec2,
    pub velocity: Vec2,
    pub facing: Facing,
}

impl Kinematics {
    pub fn at(position: Vec2, facing: Facing) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            facing,
        }
    }

    /// Horizontal direction pointing away from `other_x` (ties use the opposite of facing).
    pub fn away_from(&self, other_x: f32) -> f32 {
        if self.position.x < other_x {
            -1.0
        } else if self.position.x > other_x {
            1.0
        } else {
            -self.facing.sign()
        }
    }
}

/// "Body touches ground": boundary fact written by physics.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Grounded(pub bool);

/// Intents sampled once per tick: player input or enemy AI.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct ActorIntents {
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
    pub attack: bool,
    pub block: bool,
}

impl ActorIntents {
    pub fn horizontal(&self) -> f32 {
        match (self.move_left, self.move_right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}

/// Timed damage immunity. Active while `now < until`.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Invincibility {
    pub until: Option<u64>,
}

impl Invincibility {
    pub fn is_active(&self, now: u64) -> bool {
        self.until.is_some_and(|until| now < until)
    }

    pub fn grant(&mut self, now: u64, duration_ms: u64) -> u64 {
        let until = now + duration_ms;
        self.until = Some(self.until.map_or(until, |current| current.max(until)));
        until
    }

    pub fn clear(&mut self) {
        self.until = None;
    }
}

/// Enemy attack gate: no new swing before `ready_at`.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct AttackCooldown {
    pub ready_at: u64,
}

impl AttackCooldown {
    pub fn is_ready(&self, now: u64) -> bool {
        now >= self.ready_at
    }

    pub fn start(&mut self, now: u64, cooldown_ms: u64) {
        self.ready_at = now + cooldown_ms;
    }
}

/// Collision response of the actor's body. Disabled on death.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct BodyCollision {
    pub enabled: bool,
}

impl Default for BodyCollision {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Status colour for the renderer (hit flash, guard, stun...).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub enum StatusTint {
    #[default]
    Normal,
    HitFlash,
    Guarding,
    Stunned,
    Invincible,
}

/// Link from an actor to its detached attack hitbox entity.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitboxLink(pub Entity);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_damage() {
        let mut health = Health::new(100);
        assert_eq!(health.take_damage(30), 30);
        assert_eq!(health.current, 70);
        assert!(health.is_alive());

        assert_eq!(health.take_damage(100), 70); // Saturating sub
        assert_eq!(health.current, 0);
        assert!(!health.is_alive());
    }

    #[test]
    fn test_health_heal() {
        let mut health = Health::new(100);
        health.take_damage(50);
        health.heal(30);
        assert_eq!(health.current, 80);

        health.heal(100); // Clamped to max
        assert_eq!(health.current, 100);
    }

    #[test]
    fn test_invincibility_window() {
        let mut invincibility = Invincibility::default();
        assert!(!invincibility.is_active(0));

        assert_eq!(invincibility.grant(1000, 1000), 2000);
        assert!(invincibility.is_active(1999));
        assert!(!invincibility.is_active(2000));

        // shorter grant never shortens the window
        invincibility.grant(1100, 200);
        assert_eq!(invincibility.until, Some(2000));
    }

    #[test]
    fn test_attack_cooldown() {
        let mut cooldown = AttackCooldown::default();
        assert!(cooldown.is_ready(0));

        cooldown.start(500, 2000);
        assert!(!cooldown.is_ready(2499));
        assert!(cooldown.is_ready(2500));
    }

    #[test]
    fn test_away_from_and_facing() {
        let kin = Kinematics::at(Vec2::new(100.0, 0.0), Facing::Right);
        assert_eq!(kin.away_from(200.0), -1.0);
        assert_eq!(kin.away_from(50.0), 1.0);
        assert_eq!(kin.away_from(100.0), -1.0);

        assert_eq!(Facing::towards(100.0, 50.0), Facing::Left);
        assert_eq!(Facing::Left.flipped(), Facing::Right);
    }

    #[test]
    fn test_intents_horizontal() {
        let mut intents = ActorIntents::default();
        assert_eq!(intents.horizontal(), 0.0);
        intents.move_left = true;
        assert_eq!(intents.horizontal(), -1.0);
        intents.move_right = true;
        assert_eq!(intents.horizontal(), 0.0);
    }
}
