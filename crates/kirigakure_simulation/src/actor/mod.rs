//! Actor domain: archetypes, state machine, spawn, locomotion
//!
//! Содержит:
//! - Archetype (данные grunt/boss/player вместо иерархии классов)
//! - ActorStateMachine (Idle/Moving/Attacking/Blocking/HitReacting/Stunned/Dead)
//! - spawn_actor / despawn_actor
//! - evaluate_actor_states, apply_locomotion

use bevy::prelude::*;

pub mod archetype;
pub mod spawn;
pub mod state;
pub mod systems;


pub use archetype::{ActorKind, Archetype, AttackTiming, DeathBehavior, HitboxShape, Team};
pub use spawn::{despawn_actor, spawn_actor, spawn_actor_in_world};
pub use state::{ActorState, ActorStateMachine, StateChange, TickInput};
pub use systems::{apply_locomotion, evaluate_actor_states, resting_tint};

use crate::clock::gameplay_running;
use crate::SimulationSet;

/// Actor Plugin
///
/// Порядок: evaluate_actor_states → apply_locomotion (оба в StateMachine set,
/// только пока gameplay clock бежит).
pub struct ActorPlugin;

impl Plugin for ActorPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<state::ActorStateMachine>()
            .register_type::<crate::components::Actor>()
            .register_type::<crate::components::Health>()
            .register_type::<crate::components::Kinematics>()
            .register_type::<crate::components::StatusTint>();

        app.add_systems(
            FixedUpdate,
            (evaluate_actor_states, apply_locomotion)
                .chain()
                .in_set(SimulationSet::StateMachine)
                .run_if(gameplay_running),
        );
    }
}
