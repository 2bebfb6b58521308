//! Actor systems: intent evaluation + locomotion.

use bevy::prelude::*;

use crate::actor::archetype::ActorKind;
use crate::actor::state::{ActorState, ActorStateMachine, TickInput};
use crate::clock::CombatClock;
use crate::combat::events::{ActorStateChanged, PresentationCue};
use crate::components::{
    Actor, ActorIntents, AttackCooldown, Facing, Grounded, Invincibility, Kinematics, StatusTint,
};
use crate::config::CombatConfig;
use crate::effects::{EffectAction, EffectScheduler};

/// Tint an actor shows when no flash is running.
pub fn resting_tint(state: ActorState, invincible: bool) -> StatusTint {
    match state {
        ActorState::Stunned { .. } => StatusTint::Stunned,
        ActorState::Blocking { .. } => StatusTint::Guarding,
        ActorState::Dead { .. } => StatusTint::Normal,
        _ if invincible => StatusTint::Invincible,
        _ => StatusTint::Normal,
    }
}

/// Система: evaluate intents → state transitions.
///
/// Вход в Attacking планирует весь timeline замаха (open/close hitbox,
/// finish) и гасит attack intent (edge-triggered).
pub fn evaluate_actor_states(
    clock: Res<CombatClock>,
    config: Res<CombatConfig>,
    mut scheduler: ResMut<EffectScheduler>,
    mut actors: Query<(
        Entity,
        &Actor,
        &mut ActorStateMachine,
        &mut ActorIntents,
        &Invincibility,
        &mut AttackCooldown,
        &mut StatusTint,
    )>,
    mut state_events: EventWriter<ActorStateChanged>,
    mut cues: EventWriter<PresentationCue>,
) {
    let now = clock.now();

    for (entity, actor, mut machine, mut intents, invincibility, mut cooldown, mut tint) in actors.iter_mut() {
        let is_player = actor.kind == ActorKind::Player;
        let input = TickInput {
            wants_move: intents.horizontal() != 0.0,
            wants_attack: intents.attack,
            wants_block: intents.block,
            can_attack: if is_player {
                !invincibility.is_active(now)
            } else {
                cooldown.is_ready(now)
            },
            can_block: is_player,
        };

        let Some(change) = machine.evaluate(input, now) else {
            continue;
        };

        if let ActorState::Attacking { swing, started_at } = change.to {
            let archetype = config.archetype(actor.kind);
            let timing = archetype.timing;

            intents.attack = false;
            if !is_player {
                cooldown.start(started_at, archetype.attack_cooldown_ms);
            }

            scheduler.schedule(timing.active_start(started_at), entity, EffectAction::OpenHitbox { swing });
            scheduler.schedule(timing.active_end(started_at), entity, EffectAction::CloseHitbox { swing });
            scheduler.schedule(timing.finished_at(started_at), entity, EffectAction::FinishAttack { swing });

            cues.write(PresentationCue::Swing { actor: entity });
        }

        if *tint != StatusTint::HitFlash {
            *tint = resting_tint(change.to, invincibility.is_active(now));
        }

        state_events.write(ActorStateChanged {
            actor: entity,
            old: change.from,
            new: change.to,
        });
    }
}

/// Система: state → velocity/facing для host physics.
///
/// HitReacting/Stunned оставляют velocity как есть (knockback).
pub fn apply_locomotion(
    config: Res<CombatConfig>,
    mut actors: Query<(&Actor, &ActorStateMachine, &ActorIntents, &Grounded, &mut Kinematics)>,
) {
    for (actor, machine, intents, grounded, mut kinematics) in actors.iter_mut() {
        let archetype = config.archetype(actor.kind);

        match machine.state() {
            ActorState::Moving => {
                let direction = intents.horizontal();
                kinematics.velocity.x = direction * archetype.move_speed;
                kinematics.facing = if direction < 0.0 { Facing::Left } else { Facing::Right };
            }
            ActorState::Idle | ActorState::Blocking { .. } | ActorState::Attacking { .. } => {
                kinematics.velocity.x = 0.0;
            }
            ActorState::HitReacting { .. } | ActorState::Stunned { .. } => {}
            ActorState::Dead { .. } => {
                kinematics.velocity = Vec2::ZERO;
            }
        }

        if intents.jump && grounded.0 && machine.state().is_free() && archetype.jump_speed > 0.0 {
            kinematics.velocity.y = -archetype.jump_speed;
        }
    }
}
