//! Overlap resolution system.
//!
//! Physics сообщает `ColliderOverlap`; здесь пара разворачивается в
//! (attacker hitbox, defender body), компоненты копируются в `Combatant`,
//! `resolve_hit` решает исход, а follow-ups раскладываются по scheduler,
//! clock (hit-stop), encounter (kills/score) и events.

use bevy::prelude::*;

use crate::actor::archetype::DeathBehavior;
use crate::actor::state::{ActorStateMachine, StateChange};
use crate::clock::CombatClock;
use crate::combat::events::{
    ActorDied, ActorStateChanged, ColliderOverlap, DamageResolved, EncounterSignal, HitOutcome, PresentationCue,
};
use crate::combat::hitbox::AttackHitbox;
use crate::combat::resolver::{resolve_hit, Combatant, HitReport, HitSeverity, Resolution, Strike};
use crate::components::{Actor, BodyCollision, Health, HitboxLink, Invincibility, Kinematics, StatusTint};
use crate::config::CombatConfig;
use crate::effects::{EffectAction, EffectScheduler};
use crate::encounter::{Encounter, ScoreChanged};

type FighterItem<'a> = (
    &'a Actor,
    Mut<'a, ActorStateMachine>,
    Mut<'a, Health>,
    Mut<'a, Kinematics>,
    Mut<'a, Invincibility>,
    Mut<'a, StatusTint>,
    Mut<'a, BodyCollision>,
    Option<&'a HitboxLink>,
);

fn snapshot(item: &FighterItem) -> Combatant {
    Combatant {
        kind: item.0.kind,
        state: *item.1,
        health: *item.2,
        kinematics: *item.3,
        invincibility: *item.4,
        tint: *item.5,
    }
}

fn write_back(item: &mut FighterItem, combatant: &Combatant) {
    *item.1 = combatant.state;
    *item.2 = combatant.health;
    *item.3 = combatant.kinematics;
    *item.4 = combatant.invincibility;
    *item.5 = combatant.tint;
}

/// Hitbox side first; `None` for body-body or hitbox-hitbox pairs.
fn split_overlap(overlap: &ColliderOverlap, hitboxes: &Query<&mut AttackHitbox>) -> Option<(Entity, Entity)> {
    match (hitboxes.contains(overlap.a), hitboxes.contains(overlap.b)) {
        (true, false) => Some((overlap.a, overlap.b)),
        (false, true) => Some((overlap.b, overlap.a)),
        _ => None,
    }
}

/// Система: resolve hitbox/body overlaps.
///
/// Пока gameplay заморожен (dialog, hit-stop, defeat/victory), overlaps
/// сбрасываются без обработки.
#[allow(clippy::too_many_arguments)]
pub fn resolve_overlaps(
    mut overlaps: EventReader<ColliderOverlap>,
    mut clock: ResMut<CombatClock>,
    config: Res<CombatConfig>,
    mut scheduler: ResMut<EffectScheduler>,
    mut encounter: ResMut<Encounter>,
    mut hitboxes: Query<&mut AttackHitbox>,
    mut actors: Query<(
        &Actor,
        &mut ActorStateMachine,
        &mut Health,
        &mut Kinematics,
        &mut Invincibility,
        &mut StatusTint,
        &mut BodyCollision,
        Option<&HitboxLink>,
    )>,
    mut damage_events: EventWriter<DamageResolved>,
    mut state_events: EventWriter<ActorStateChanged>,
    mut died_events: EventWriter<ActorDied>,
    mut signals: EventWriter<EncounterSignal>,
    mut cues: EventWriter<PresentationCue>,
    mut score_events: EventWriter<ScoreChanged>,
) {
    if !clock.is_running() {
        overlaps.clear();
        return;
    }
    let now = clock.now();

    for overlap in overlaps.read() {
        let Some((hitbox_entity, body)) = split_overlap(overlap, &hitboxes) else {
            continue;
        };
        let Ok(hitbox) = hitboxes.get(hitbox_entity) else {
            continue;
        };
        if !hitbox.is_enabled() || hitbox.owner == body {
            continue;
        }
        let attacker = hitbox.owner;
        let strike = Strike {
            damage: hitbox.damage,
            already_struck: hitbox.has_struck(body),
        };

        let Ok([mut attacker_item, mut defender_item]) = actors.get_many_mut([attacker, body]) else {
            continue;
        };
        if attacker_item.0.team() == defender_item.0.team() {
            continue;
        }

        let mut attacker_view = snapshot(&attacker_item);
        let mut defender_view = snapshot(&defender_item);
        let resolution = resolve_hit(&mut attacker_view, &mut defender_view, strike, now, &config);
        write_back(&mut attacker_item, &attacker_view);
        write_back(&mut defender_item, &defender_view);

        let report = match resolution {
            Resolution::Ignored(reason) => {
                crate::logger::log(&format!(
                    "🛡️ Overlap {:?} → {:?} ignored: {:?} (t={})",
                    attacker, body, reason, now
                ));
                continue;
            }
            Resolution::Resolved(report) => report,
        };

        if let Ok(mut hitbox) = hitboxes.get_mut(hitbox_entity) {
            hitbox.record_strike(body);
        }

        crate::logger::log(&format!(
            "⚔️ {:?} ({:?}) → {:?} ({:?}): {:?} amount={} hp={}/{} t={}",
            attacker,
            attacker_item.0.kind,
            body,
            defender_item.0.kind,
            report.outcome,
            report.amount,
            defender_view.health.current,
            defender_view.health.max,
            now
        ));

        if report.hit_stop_ms > 0 {
            clock.request_hit_stop(report.hit_stop_ms);
        }

        // Attacker side: parry stun
        if let Some(change) = report.attacker_change {
            scheduler.cancel_owner_where(attacker, EffectAction::is_swing_step);
            if let Ok(mut hitbox) = hitboxes.get_mut(hitbox_entity) {
                hitbox.disable();
            }
            if let Some(until) = report.stun_until {
                scheduler.schedule(until, attacker, EffectAction::RecoverFromStun { since: now });
            }
            emit_state_change(&mut state_events, attacker, change);
        }

        // Defender side
        if let Some(change) = report.defender_change {
            emit_state_change(&mut state_events, body, change);
        }
        if let Some(recover_at) = report.recover_at {
            scheduler.schedule(recover_at, body, EffectAction::RecoverFromHit { since: now });
        }
        if let Some(until) = report.invincible_until {
            scheduler.schedule(until, body, EffectAction::EndInvincibility { until });
        }
        if report.outcome == HitOutcome::Damage && !report.killed {
            scheduler.schedule(now + config.hit_flash_ms, body, EffectAction::RestoreTint);
        }

        if report.killed {
            *defender_item.6 = BodyCollision { enabled: false };
            let defender_hitbox = defender_item.7.map(|link| link.0);
            if let Some(mut hitbox) = defender_hitbox.and_then(|e| hitboxes.get_mut(e).ok()) {
                hitbox.disable();
            }
            handle_death(
                &config,
                &mut scheduler,
                &mut encounter,
                defender_item.0,
                body,
                attacker,
                now,
                &mut died_events,
                &mut signals,
            );
        }

        if report.score_bonus > 0 {
            let score = encounter.add_score(report.score_bonus);
            score_events.write(ScoreChanged { score });
        }

        emit_cues(&mut cues, &report, defender_view.kinematics.position);
        damage_events.write(DamageResolved {
            attacker,
            defender: body,
            outcome: report.outcome,
            amount: report.amount,
        });
    }
}

fn emit_state_change(writer: &mut EventWriter<ActorStateChanged>, actor: Entity, change: StateChange) {
    writer.write(ActorStateChanged {
        actor,
        old: change.from,
        new: change.to,
    });
}

/// Death: pending effects dropped, alive set updated, on-death capability fired.
#[allow(clippy::too_many_arguments)]
fn handle_death(
    config: &CombatConfig,
    scheduler: &mut EffectScheduler,
    encounter: &mut Encounter,
    actor: &Actor,
    entity: Entity,
    killer: Entity,
    now: u64,
    died_events: &mut EventWriter<ActorDied>,
    signals: &mut EventWriter<EncounterSignal>,
) {
    let archetype = config.archetype(actor.kind);

    scheduler.cancel_owner(entity);
    if actor.kind.is_enemy() {
        encounter.forget_enemy(entity);
        encounter.add_kill();
    }

    match archetype.on_death {
        DeathBehavior::Despawn => {
            scheduler.schedule(now + archetype.death_anim_ms, entity, EffectAction::DeathComplete);
        }
        DeathBehavior::NotifyBossDefeat => {
            scheduler.schedule(now + archetype.death_anim_ms, entity, EffectAction::DeathComplete);
            signals.write(EncounterSignal::BossDefeated { boss: entity });
        }
        DeathBehavior::EndEncounter => {
            signals.write(EncounterSignal::PlayerDefeated { player: entity });
        }
    }

    crate::logger::log_info(&format!(
        "💀 {:?} {:?} died (killer {:?}, kills={}, t={})",
        actor.kind,
        entity,
        killer,
        encounter.kill_count(),
        now
    ));

    died_events.write(ActorDied {
        entity,
        kind: actor.kind,
        killer: Some(killer),
    });
}

fn emit_cues(cues: &mut EventWriter<PresentationCue>, report: &HitReport, at: Vec2) {
    match report.outcome {
        HitOutcome::Damage => {
            cues.write(PresentationCue::Blood { at });
            let (intensity, duration_ms) = match report.severity {
                Some(HitSeverity::KillingBlow) => (0.03, 250),
                Some(HitSeverity::Heavy) => (0.02, 200),
                _ => (0.01, 100),
            };
            cues.write(PresentationCue::CameraShake { intensity, duration_ms });
        }
        HitOutcome::Parried => {
            cues.write(PresentationCue::ParrySpark { at });
            cues.write(PresentationCue::CameraShake {
                intensity: 0.02,
                duration_ms: 100,
            });
        }
        HitOutcome::Blocked => {
            cues.write(PresentationCue::GuardClang { at });
        }
    }
}
