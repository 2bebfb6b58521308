//! Encounter context: phase, counters, alive set.
//!
//! Единственный владелец прогресса прохождения. Мутации только через
//! `add_kill`, `add_score`, `advance_phase`, `restart` и alive-set методы.

use std::collections::BTreeSet;

use bevy::prelude::*;
use thiserror::Error;

use crate::components::Facing;
use crate::encounter::dialog::DialogScript;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Reflect)]
pub enum EncounterPhase {
    #[default]
    Intro,
    Wave1,
    Interstitial,
    BossIntro,
    BossFight,
    Victory,
    Defeat,
}

impl EncounterPhase {
    /// Scripted successor. Defeat is reachable from anywhere and is not listed.
    pub fn next(&self) -> Option<EncounterPhase> {
        match self {
            EncounterPhase::Intro => Some(EncounterPhase::Wave1),
            EncounterPhase::Wave1 => Some(EncounterPhase::Interstitial),
            EncounterPhase::Interstitial => Some(EncounterPhase::BossIntro),
            EncounterPhase::BossIntro => Some(EncounterPhase::BossFight),
            EncounterPhase::BossFight => Some(EncounterPhase::Victory),
            EncounterPhase::Victory | EncounterPhase::Defeat => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, EncounterPhase::Victory | EncounterPhase::Defeat)
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PhaseError {
    #[error("encounter already ended in {0:?}")]
    AlreadyEnded(EncounterPhase),

    #[error("illegal phase transition {from:?} → {to:?}")]
    IllegalTransition { from: EncounterPhase, to: EncounterPhase },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseChange {
    pub from: EncounterPhase,
    pub to: EncounterPhase,
}

#[derive(Resource, Debug, Clone)]
pub struct Encounter {
    phase: EncounterPhase,
    kill_count: u32,
    score: u32,
    alive_enemies: BTreeSet<Entity>,
    pub player: Option<Entity>,
    pub boss: Option<Entity>,
    /// Spawn throttle deadline; `None` while the throttle is halted.
    pub next_spawn_at: Option<u64>,
    pub spawn_side: Facing,
    /// Dialog currently on screen (clock paused until it finishes).
    pub open_dialog: Option<DialogScript>,
    pub bootstrapped: bool,
}

impl Default for Encounter {
    fn default() -> Self {
        Self {
            phase: EncounterPhase::Intro,
            kill_count: 0,
            score: 0,
            alive_enemies: BTreeSet::new(),
            player: None,
            boss: None,
            next_spawn_at: None,
            spawn_side: Facing::Right,
            open_dialog: None,
            bootstrapped: false,
        }
    }
}

impl Encounter {
    pub fn phase(&self) -> EncounterPhase {
        self.phase
    }

    pub fn kill_count(&self) -> u32 {
        self.kill_count
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn add_kill(&mut self) -> u32 {
        self.kill_count += 1;
        self.kill_count
    }

    pub fn add_score(&mut self, points: u32) -> u32 {
        self.score = self.score.saturating_add(points);
        self.score
    }

    /// Forward to the scripted successor, or to Defeat from any live phase.
    pub fn advance_phase(&mut self, to: EncounterPhase) -> Result<PhaseChange, PhaseError> {
        let from = self.phase;
        if from.is_terminal() {
            return Err(PhaseError::AlreadyEnded(from));
        }
        if to != EncounterPhase::Defeat && from.next() != Some(to) {
            return Err(PhaseError::IllegalTransition { from, to });
        }
        self.phase = to;
        Ok(PhaseChange { from, to })
    }

    /// Full reset back to Intro. The only way the phase moves backwards.
    pub fn restart(&mut self) -> PhaseChange {
        let from = self.phase;
        *self = Self::default();
        PhaseChange {
            from,
            to: EncounterPhase::Intro,
        }
    }

    pub fn register_enemy(&mut self, enemy: Entity) {
        self.alive_enemies.insert(enemy);
    }

    /// Returns true if `enemy` was tracked.
    pub fn forget_enemy(&mut self, enemy: Entity) -> bool {
        self.alive_enemies.remove(&enemy)
    }

    pub fn is_alive_enemy(&self, enemy: Entity) -> bool {
        self.alive_enemies.contains(&enemy)
    }

    pub fn alive_count(&self) -> usize {
        self.alive_enemies.len()
    }

    pub fn alive_enemies(&self) -> impl Iterator<Item = Entity> + '_ {
        self.alive_enemies.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_order() {
        let mut encounter = Encounter::default();
        let script = [
            EncounterPhase::Wave1,
            EncounterPhase::Interstitial,
            EncounterPhase::BossIntro,
            EncounterPhase::BossFight,
            EncounterPhase::Victory,
        ];
        for to in script {
            let change = encounter.advance_phase(to).expect("scripted step");
            assert!(change.from < change.to);
        }
        assert_eq!(encounter.phase(), EncounterPhase::Victory);
    }

    #[test]
    fn test_rejects_skip_and_regression() {
        let mut encounter = Encounter::default();
        assert_eq!(
            encounter.advance_phase(EncounterPhase::BossFight),
            Err(PhaseError::IllegalTransition {
                from: EncounterPhase::Intro,
                to: EncounterPhase::BossFight
            })
        );

        encounter.advance_phase(EncounterPhase::Wave1).unwrap();
        assert!(encounter.advance_phase(EncounterPhase::Intro).is_err());
        assert!(encounter.advance_phase(EncounterPhase::Wave1).is_err());
        assert_eq!(encounter.phase(), EncounterPhase::Wave1);
    }

    #[test]
    fn test_defeat_from_any_live_phase() {
        for steps in 0..5 {
            let mut encounter = Encounter::default();
            let mut phase = EncounterPhase::Intro;
            for _ in 0..steps {
                phase = phase.next().unwrap();
                encounter.advance_phase(phase).unwrap();
            }
            assert!(encounter.advance_phase(EncounterPhase::Defeat).is_ok());
            assert_eq!(
                encounter.advance_phase(EncounterPhase::Defeat),
                Err(PhaseError::AlreadyEnded(EncounterPhase::Defeat))
            );
        }
    }

    #[test]
    fn test_victory_is_final() {
        let mut encounter = Encounter::default();
        for to in [
            EncounterPhase::Wave1,
            EncounterPhase::Interstitial,
            EncounterPhase::BossIntro,
            EncounterPhase::BossFight,
            EncounterPhase::Victory,
        ] {
            encounter.advance_phase(to).unwrap();
        }
        assert!(encounter.advance_phase(EncounterPhase::Victory).is_err());
        assert!(encounter.advance_phase(EncounterPhase::Defeat).is_err());
    }

    #[test]
    fn test_counters_and_restart() {
        let mut encounter = Encounter::default();
        encounter.add_kill();
        assert_eq!(encounter.add_kill(), 2);
        assert_eq!(encounter.add_score(150), 150);

        let enemy = Entity::from_raw(9);
        encounter.register_enemy(enemy);
        assert!(encounter.is_alive_enemy(enemy));
        encounter.advance_phase(EncounterPhase::Wave1).unwrap();

        let change = encounter.restart();
        assert_eq!(change.from, EncounterPhase::Wave1);
        assert_eq!(encounter.phase(), EncounterPhase::Intro);
        assert_eq!(encounter.kill_count(), 0);
        assert_eq!(encounter.score(), 0);
        assert_eq!(encounter.alive_count(), 0);
    }
}
