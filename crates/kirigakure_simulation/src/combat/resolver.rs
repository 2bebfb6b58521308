//! Combat Resolver: overlap (hitbox → body) → Damage / Blocked / Parried.
//!
//! Чистая логика над копиями компонентов (`Combatant`), без доступа к World.
//! Система `resolve_overlaps` копирует компоненты, вызывает `resolve_hit`
//! и записывает результат обратно + применяет follow-ups из `HitReport`
//! (scheduler, hit-stop, encounter counters, events).
//!
//! Порядок preconditions авторитетен: dead → invincible → already struck
//! this swing → hit reaction in progress → block.

use bevy::prelude::*;

use crate::actor::archetype::ActorKind;
use crate::actor::state::{ActorStateMachine, StateChange};
use crate::combat::events::HitOutcome;
use crate::components::{Health, Invincibility, Kinematics, StatusTint};
use crate::config::CombatConfig;

/// Snapshot of one side of a hit.
#[derive(Debug, Clone, PartialEq)]
pub struct Combatant {
    pub kind: ActorKind,
    pub state: ActorStateMachine,
    pub health: Health,
    pub kinematics: Kinematics,
    pub invincibility: Invincibility,
    pub tint: StatusTint,
}

/// The attacking hitbox, as seen by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strike {
    pub damage: u32,
    /// Defender is already in this swing's hit memory.
    pub already_struck: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    DefenderDead,
    DefenderInvincible,
    AlreadyStruck,
    DefenderRecovering,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardJudgement {
    Parry,
    Block,
}

/// Parry iff the block is younger than the window: `now - since < window`.
pub fn judge_guard(now: u64, block_started_at: u64, parry_window_ms: u64) -> GuardJudgement {
    let elapsed = now.saturating_sub(block_started_at);
    if elapsed < parry_window_ms {
        GuardJudgement::Parry
    } else {
        GuardJudgement::Block
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitSeverity {
    Graze,
    Heavy,
    KillingBlow,
}

impl HitSeverity {
    /// Heavy = a quarter or more of max health in one hit.
    pub fn classify(amount: u32, max_health: u32, killed: bool) -> Self {
        if killed {
            HitSeverity::KillingBlow
        } else if amount.saturating_mul(4) >= max_health {
            HitSeverity::Heavy
        } else {
            HitSeverity::Graze
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitReport {
    pub outcome: HitOutcome,
    pub amount: u32,
    pub killed: bool,
    pub severity: Option<HitSeverity>,
    pub hit_stop_ms: u64,
    pub score_bonus: u32,
    pub attacker_change: Option<StateChange>,
    pub defender_change: Option<StateChange>,
    /// Defender's hit reaction ends at this time.
    pub recover_at: Option<u64>,
    /// Attacker's stun ends at this time.
    pub stun_until: Option<u64>,
    pub invincible_until: Option<u64>,
}

impl HitReport {
    fn new(outcome: HitOutcome) -> Self {
        Self {
            outcome,
            amount: 0,
            killed: false,
            severity: None,
            hit_stop_ms: 0,
            score_bonus: 0,
            attacker_change: None,
            defender_change: None,
            recover_at: None,
            stun_until: None,
            invincible_until: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    Ignored(IgnoreReason),
    Resolved(HitReport),
}

impl Resolution {
    pub fn report(&self) -> Option<&HitReport> {
        match self {
            Resolution::Resolved(report) => Some(report),
            Resolution::Ignored(_) => None,
        }
    }
}

pub fn resolve_hit(
    attacker: &mut Combatant,
    defender: &mut Combatant,
    strike: Strike,
    now: u64,
    config: &CombatConfig,
) -> Resolution {
    if defender.state.is_dead() {
        return Resolution::Ignored(IgnoreReason::DefenderDead);
    }
    if defender.invincibility.is_active(now) {
        return Resolution::Ignored(IgnoreReason::DefenderInvincible);
    }
    if strike.already_struck {
        return Resolution::Ignored(IgnoreReason::AlreadyStruck);
    }
    if defender.kind.is_enemy() && defender.state.is_hit_reacting() {
        return Resolution::Ignored(IgnoreReason::DefenderRecovering);
    }

    let away = defender.kinematics.away_from(attacker.kinematics.position.x);

    if let Some(since) = defender.state.block_started_at() {
        return Resolution::Resolved(match judge_guard(now, since, config.parry_window_ms) {
            GuardJudgement::Parry => parry(attacker, defender, away, now, config),
            GuardJudgement::Block => {
                let impulse = config.knockback.block;
                defender.kinematics.velocity = Vec2::new(away * impulse.x, impulse.y);
                HitReport::new(HitOutcome::Blocked)
            }
        });
    }

    Resolution::Resolved(damage(defender, strike, away, now, config))
}

fn parry(
    attacker: &mut Combatant,
    defender: &mut Combatant,
    away: f32,
    now: u64,
    config: &CombatConfig,
) -> HitReport {
    let mut report = HitReport::new(HitOutcome::Parried);

    report.attacker_change = attacker.state.stun(now);
    if report.attacker_change.is_some() {
        report.stun_until = Some(now + config.stun_ms);
        attacker.tint = StatusTint::Stunned;
        let impulse = config.knockback.stun;
        attacker.kinematics.velocity = Vec2::new(-away * impulse.x, impulse.y);
    }

    // knockback-cancel, no invincibility
    defender.kinematics.velocity.x = 0.0;

    report.hit_stop_ms = config.hit_stop.parry_ms;
    report.score_bonus = config.scoring.parry_bonus;
    report
}

fn damage(defender: &mut Combatant, strike: Strike, away: f32, now: u64, config: &CombatConfig) -> HitReport {
    let mut report = HitReport::new(HitOutcome::Damage);

    report.amount = defender.health.take_damage(strike.damage);
    report.killed = !defender.health.is_alive();
    defender.tint = StatusTint::HitFlash;

    let severity = HitSeverity::classify(report.amount, defender.health.max, report.killed);
    report.severity = Some(severity);
    report.hit_stop_ms = match severity {
        HitSeverity::Graze => config.hit_stop.graze_ms,
        HitSeverity::Heavy => config.hit_stop.heavy_ms,
        HitSeverity::KillingBlow => config.hit_stop.killing_blow_ms,
    };

    if report.killed {
        report.defender_change = defender.state.kill(now);
        defender.kinematics.velocity = Vec2::ZERO;
        report.score_bonus = match defender.kind {
            ActorKind::Grunt => config.scoring.grunt_kill,
            ActorKind::Boss => config.scoring.boss_kill,
            ActorKind::Player => 0,
        };
        return report;
    }

    report.defender_change = defender.state.hit_react(now);
    if report.defender_change.is_some() {
        report.recover_at = Some(now + config.archetype(defender.kind).hit_recovery_ms);
    }

    let impulse = if defender.kind == ActorKind::Player {
        config.knockback.player_hurt
    } else {
        config.knockback.enemy_hurt
    };
    defender.kinematics.velocity = Vec2::new(away * impulse.x, impulse.y);

    if defender.kind == ActorKind::Player {
        report.invincible_until = Some(defender.invincibility.grant(now, config.invincibility_ms));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parry_window_boundary() {
        assert_eq!(judge_guard(1199, 1000, 200), GuardJudgement::Parry);
        assert_eq!(judge_guard(1200, 1000, 200), GuardJudgement::Block);
        assert_eq!(judge_guard(1000, 1000, 200), GuardJudgement::Parry);
    }

    #[test]
    fn test_severity_classes() {
        assert_eq!(HitSeverity::classify(20, 100, false), HitSeverity::Graze);
        assert_eq!(HitSeverity::classify(35, 100, false), HitSeverity::Heavy);
        assert_eq!(HitSeverity::classify(1, 3, false), HitSeverity::Heavy);
        assert_eq!(HitSeverity::classify(1, 10, false), HitSeverity::Graze);
        assert_eq!(HitSeverity::classify(1, 10, true), HitSeverity::KillingBlow);
    }
}
