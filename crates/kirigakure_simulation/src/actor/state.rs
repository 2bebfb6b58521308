//! Actor State Machine.
//!
//! Один автомат на все archetypes. Переходы вызываются двумя путями:
//! - `evaluate` раз в тик по intents (priority: Dead > Stunned >
//!   HitReacting > Attacking > block held > move/attack intent);
//! - прямые переходы от resolver/scheduler (`hit_react`, `stun`, `kill`,
//!   `finish_attack`, ...), каждый валидирует токен своего состояния.
//!
//! Dead терминален: ни один метод не выводит из него.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum ActorState {
    Idle,
    Moving,
    /// `swing`: монотонный номер замаха, токен для scheduled effects.
    Attacking { swing: u32, started_at: u64 },
    /// `since` не обновляется, пока block удерживается без перерыва.
    Blocking { since: u64 },
    HitReacting { since: u64 },
    Stunned { since: u64 },
    Dead { since: u64 },
}

impl Default for ActorState {
    fn default() -> Self {
        Self::Idle
    }
}

impl ActorState {
    pub fn name(&self) -> &'static str {
        match self {
            ActorState::Idle => "Idle",
            ActorState::Moving => "Moving",
            ActorState::Attacking { .. } => "Attacking",
            ActorState::Blocking { .. } => "Blocking",
            ActorState::HitReacting { .. } => "HitReacting",
            ActorState::Stunned { .. } => "Stunned",
            ActorState::Dead { .. } => "Dead",
        }
    }

    /// States that ignore intents until a timer or an outcome releases them.
    pub fn is_locked(&self) -> bool {
        matches!(
            self,
            ActorState::Attacking { .. }
                | ActorState::HitReacting { .. }
                | ActorState::Stunned { .. }
                | ActorState::Dead { .. }
        )
    }

    /// Free to walk/jump (locomotion applies intents).
    pub fn is_free(&self) -> bool {
        matches!(self, ActorState::Idle | ActorState::Moving)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub from: ActorState,
    pub to: ActorState,
}

/// Per-tick input to `ActorStateMachine::evaluate`.
///
/// Gates (`can_attack`, `can_block`) are computed by the caller from
/// archetype/cooldown/invincibility so the machine stays component-agnostic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub wants_move: bool,
    pub wants_attack: bool,
    pub wants_block: bool,
    pub can_attack: bool,
    pub can_block: bool,
}

#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct ActorStateMachine {
    state: ActorState,
    next_swing: u32,
}

impl ActorStateMachine {
    pub fn state(&self) -> ActorState {
        self.state
    }

    pub fn is_dead(&self) -> bool {
        matches!(self.state, ActorState::Dead { .. })
    }

    pub fn is_stunned(&self) -> bool {
        matches!(self.state, ActorState::Stunned { .. })
    }

    pub fn is_hit_reacting(&self) -> bool {
        matches!(self.state, ActorState::HitReacting { .. })
    }

    pub fn block_started_at(&self) -> Option<u64> {
        match self.state {
            ActorState::Blocking { since } => Some(since),
            _ => None,
        }
    }

    /// `(swing, started_at)` of the attack in progress.
    pub fn current_attack(&self) -> Option<(u32, u64)> {
        match self.state {
            ActorState::Attacking { swing, started_at } => Some((swing, started_at)),
            _ => None,
        }
    }

    fn transition(&mut self, to: ActorState) -> Option<StateChange> {
        if self.state == to {
            return None;
        }
        let from = self.state;
        self.state = to;
        Some(StateChange { from, to })
    }

    /// Intent-driven transition, first match wins.
    pub fn evaluate(&mut self, input: TickInput, now: u64) -> Option<StateChange> {
        if self.state.is_locked() {
            return None;
        }

        if input.wants_block && input.can_block {
            let since = self.block_started_at().unwrap_or(now);
            return self.transition(ActorState::Blocking { since });
        }

        if input.wants_attack && input.can_attack {
            return self.begin_attack(now);
        }

        if input.wants_move {
            self.transition(ActorState::Moving)
        } else {
            self.transition(ActorState::Idle)
        }
    }

    pub fn begin_attack(&mut self, now: u64) -> Option<StateChange> {
        if self.state.is_locked() {
            return None;
        }
        let swing = self.next_swing;
        self.next_swing = self.next_swing.wrapping_add(1);
        self.transition(ActorState::Attacking { swing, started_at: now })
    }

    /// Attack timeline completed. Stale swings (interrupted, restarted) are ignored.
    pub fn finish_attack(&mut self, swing: u32) -> Option<StateChange> {
        match self.state {
            ActorState::Attacking { swing: current, .. } if current == swing => {
                self.transition(ActorState::Idle)
            }
            _ => None,
        }
    }

    /// Non-lethal hit. A stun outranks the hit reaction and is kept.
    pub fn hit_react(&mut self, now: u64) -> Option<StateChange> {
        match self.state {
            ActorState::Dead { .. } | ActorState::Stunned { .. } => None,
            _ => self.transition(ActorState::HitReacting { since: now }),
        }
    }

    pub fn recover_from_hit(&mut self, since: u64) -> Option<StateChange> {
        match self.state {
            ActorState::HitReacting { since: current } if current == since => {
                self.transition(ActorState::Idle)
            }
            _ => None,
        }
    }

    /// Parry outcome: cancels any attack in progress.
    pub fn stun(&mut self, now: u64) -> Option<StateChange> {
        if self.is_dead() {
            return None;
        }
        self.transition(ActorState::Stunned { since: now })
    }

    pub fn recover_from_stun(&mut self, since: u64) -> Option<StateChange> {
        match self.state {
            ActorState::Stunned { since: current } if current == since => {
                self.transition(ActorState::Idle)
            }
            _ => None,
        }
    }

    pub fn kill(&mut self, now: u64) -> Option<StateChange> {
        if self.is_dead() {
            return None;
        }
        self.transition(ActorState::Dead { since: now })
    }
}
