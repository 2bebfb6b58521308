//! Control markers: кто пишет `ActorIntents` актора.

use bevy::prelude::*;

use crate::ai::AIState;

/// Marker component для player-controlled entity
///
/// Intents приходят от host input layer раз в тик.
/// Enemy AI использует `Without<Player>` filter.
///
/// В encounter ровно один entity имеет этот компонент.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Player;

/// Marker component для hostile акторов (grunt, boss).
///
/// Intents пишет `ai::enemy_intents`.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(AIState)]
pub struct Enemy;
