//! Simple FSM AI для enemy акторов
//!
//! Конечный автомат поверх `ActorIntents`:
//! Idle → Chase → Engage → (Idle если игрок мёртв или ушёл)
//!
//! Архитектура:
//! - FSM работает в FixedUpdate (AI set), только пока gameplay clock бежит
//! - Переходы основаны на расстоянии до игрока и archetype ranges
//! - Engage поднимает attack intent; cooldown проверяет state machine

use bevy::prelude::*;

use crate::actor::state::ActorStateMachine;
use crate::components::{Actor, ActorIntents, AttackCooldown, Enemy, Facing, Kinematics, Player};
use crate::config::CombatConfig;
use crate::clock::CombatClock;

/// AI FSM состояния
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Component)]
pub enum AIState {
    /// Idle: игрок вне detect range (или мёртв)
    #[default]
    Idle,

    /// Chase: идём к игроку
    Chase { target: Entity },

    /// Engage: стоим в attack range и бьём по cooldown
    Engage { target: Entity },
}

/// Pure transition: where should an enemy at `distance` from a live target be?
pub fn next_ai_state(target: Option<Entity>, distance: f32, detect_range: f32, attack_range: f32) -> AIState {
    match target {
        None => AIState::Idle,
        Some(target) if distance <= attack_range => AIState::Engage { target },
        Some(target) if distance <= detect_range => AIState::Chase { target },
        Some(_) => AIState::Idle,
    }
}

/// Система: enemy AI → intents
///
/// Locked акторы (attacking, hit, stunned, dead) получают пустые intents и
/// не поворачиваются.
pub fn enemy_intents(
    clock: Res<CombatClock>,
    config: Res<CombatConfig>,
    mut enemies: Query<
        (
            Entity,
            &Actor,
            &ActorStateMachine,
            &AttackCooldown,
            &mut ActorIntents,
            &mut Kinematics,
            &mut AIState,
        ),
        (With<Enemy>, Without<Player>),
    >,
    players: Query<(Entity, &Kinematics, &ActorStateMachine), With<Player>>,
) {
    let now = clock.now();
    let target = players
        .iter()
        .find(|(_, _, machine)| !machine.is_dead())
        .map(|(entity, kinematics, _)| (entity, kinematics.position));

    for (entity, actor, machine, cooldown, mut intents, mut kinematics, mut ai_state) in enemies.iter_mut() {
        *intents = ActorIntents::default();

        if machine.state().is_locked() {
            continue;
        }

        let archetype = config.archetype(actor.kind);
        let (target_entity, target_position) = match target {
            Some((player, position)) => (Some(player), position),
            None => (None, kinematics.position),
        };
        let distance = (target_position.x - kinematics.position.x).abs();

        let next = next_ai_state(target_entity, distance, archetype.detect_range, archetype.attack_range);
        if next != *ai_state {
            crate::logger::log(&format!("🤖 {:?} {:?}: {:?} → {:?}", actor.kind, entity, *ai_state, next));
            *ai_state = next;
        }

        match next {
            AIState::Idle => {}
            AIState::Chase { .. } => {
                kinematics.facing = Facing::towards(kinematics.position.x, target_position.x);
                match kinematics.facing {
                    Facing::Left => intents.move_left = true,
                    Facing::Right => intents.move_right = true,
                }
            }
            AIState::Engage { .. } => {
                kinematics.facing = Facing::towards(kinematics.position.x, target_position.x);
                intents.attack = cooldown.is_ready(now);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_ai_state_by_distance() {
        let player = Entity::from_raw(1);

        assert_eq!(next_ai_state(Some(player), 100.0, 500.0, 150.0), AIState::Engage { target: player });
        assert_eq!(next_ai_state(Some(player), 150.0, 500.0, 150.0), AIState::Engage { target: player });
        assert_eq!(next_ai_state(Some(player), 400.0, 500.0, 150.0), AIState::Chase { target: player });
        assert_eq!(next_ai_state(Some(player), 800.0, 500.0, 150.0), AIState::Idle);
        assert_eq!(next_ai_state(None, 10.0, 500.0, 150.0), AIState::Idle);
    }
}
