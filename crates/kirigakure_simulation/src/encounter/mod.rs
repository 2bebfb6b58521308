//! Encounter Director
//!
//! Intro → Wave1 → Interstitial → BossIntro → BossFight → Victory,
//! любая живая фаза → Defeat. Фаза монотонна; назад только через restart.
//!
//! Director наблюдает смерти (через `EncounterSignal` и счётчики
//! `Encounter`) и диалоги, а сам спавнит/деспавнит акторов.

use bevy::prelude::*;

pub mod dialog;
pub mod director;
pub mod events;
pub mod state;

pub use dialog::{DialogLine, DialogScript};
pub use events::{DialogFinished, DialogRequested, PhaseChanged, RestartRequested, ScoreChanged};
pub use state::{Encounter, EncounterPhase, PhaseChange, PhaseError};

use crate::SimulationSet;

pub struct EncounterPlugin;

impl Plugin for EncounterPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Encounter>()
            .add_event::<PhaseChanged>()
            .add_event::<ScoreChanged>()
            .add_event::<DialogRequested>()
            .add_event::<DialogFinished>()
            .add_event::<RestartRequested>();

        app.add_systems(
            FixedUpdate,
            (
                director::handle_restart,
                director::bootstrap_encounter,
                director::handle_encounter_signals,
                director::handle_dialog_finished,
                director::check_wave_complete,
                director::spawn_throttle,
            )
                .chain()
                .in_set(SimulationSet::Director),
        );
    }
}
