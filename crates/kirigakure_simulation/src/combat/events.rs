//! Combat events (boundary in/out).

use bevy::prelude::*;

use crate::actor::archetype::ActorKind;
use crate::actor::state::ActorState;

/// Input: physics reports two colliders overlapping (hitbox vs body, any order).
#[derive(Event, Debug, Clone, Copy)]
pub struct ColliderOverlap {
    pub a: Entity,
    pub b: Entity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum HitOutcome {
    Damage,
    Blocked,
    Parried,
}

/// Output: a hit was resolved (audio/camera/particles)
#[derive(Event, Debug, Clone, Copy)]
pub struct DamageResolved {
    pub attacker: Entity,
    pub defender: Entity,
    pub outcome: HitOutcome,
    pub amount: u32,
}

/// Output: animation selection
#[derive(Event, Debug, Clone, Copy)]
pub struct ActorStateChanged {
    pub actor: Entity,
    pub old: ActorState,
    pub new: ActorState,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct ActorDied {
    pub entity: Entity,
    pub kind: ActorKind,
    pub killer: Option<Entity>,
}

/// On-death notifications consumed by the Encounter Director.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncounterSignal {
    BossDefeated { boss: Entity },
    PlayerDefeated { player: Entity },
}

/// Fire-and-forget presentation hints.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum PresentationCue {
    Swing { actor: Entity },
    Blood { at: Vec2 },
    ParrySpark { at: Vec2 },
    GuardClang { at: Vec2 },
    CameraShake { intensity: f32, duration_ms: u64 },
}
