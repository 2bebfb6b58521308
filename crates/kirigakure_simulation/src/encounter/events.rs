//! Encounter events (UI/dialog boundary).

use bevy::prelude::*;

use crate::encounter::dialog::DialogScript;
use crate::encounter::state::EncounterPhase;

/// Output: phase advanced (or reset by restart).
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseChanged {
    pub old: EncounterPhase,
    pub new: EncounterPhase,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreChanged {
    pub score: u32,
}

/// Output: show this dialog; gameplay is paused until `DialogFinished`.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogRequested {
    pub script: DialogScript,
}

/// Input: the player dismissed the last line.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogFinished {
    pub script: DialogScript,
}

/// Input: retry after Victory/Defeat. Ignored in any other phase.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct RestartRequested;
