//! AI module: enemy decision making
//!
//! Enemy AI только пишет `ActorIntents`; переходы состояний делает общая
//! actor state machine, так что у игрока и врагов одни правила.

use bevy::prelude::*;

pub mod simple_fsm;

pub use simple_fsm::{enemy_intents, next_ai_state, AIState};

use crate::clock::gameplay_running;
use crate::SimulationSet;

/// AI Plugin
///
/// Регистрирует enemy_intents в AI set (перед state machine).
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<AIState>().add_systems(
            FixedUpdate,
            enemy_intents
                .in_set(SimulationSet::Ai)
                .run_if(gameplay_running),
        );
    }
}
