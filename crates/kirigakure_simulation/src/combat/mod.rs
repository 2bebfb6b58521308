//! Combat module
//!
//! ECS ответственность:
//! - Combat rules: parry/block/damage, invincibility, hit memory
//! - Attack hitbox lifecycle (открывает scheduler, гасит invariant guard)
//! - Events: DamageResolved, ActorStateChanged, ActorDied, PresentationCue
//!
//! Host ответственность:
//! - collision detection → `ColliderOverlap`
//! - animation/audio/camera по событиям

use bevy::prelude::*;

pub mod events;
pub mod hitbox;
pub mod resolver;
pub mod systems;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod resolver_tests;

pub use events::{
    ActorDied, ActorStateChanged, ColliderOverlap, DamageResolved, EncounterSignal, HitOutcome, PresentationCue,
};
pub use hitbox::AttackHitbox;
pub use resolver::{judge_guard, resolve_hit, Combatant, GuardJudgement, HitReport, IgnoreReason, Resolution, Strike};

use crate::SimulationSet;

/// Combat Plugin
///
/// Порядок в тике:
/// 1. resolve_overlaps (Resolution set): после state machine
/// 2. enforce_hitbox_invariant (Invariants set): до Encounter Director
///
/// Обе системы работают всегда: resolve_overlaps сам сбрасывает overlaps,
/// пока gameplay заморожен.
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<ColliderOverlap>()
            .add_event::<DamageResolved>()
            .add_event::<ActorStateChanged>()
            .add_event::<ActorDied>()
            .add_event::<EncounterSignal>()
            .add_event::<PresentationCue>();

        app.register_type::<AttackHitbox>();

        app.add_systems(
            FixedUpdate,
            (
                systems::resolve_overlaps.in_set(SimulationSet::Resolution),
                systems::enforce_hitbox_invariant.in_set(SimulationSet::Invariants),
            ),
        );
    }
}
