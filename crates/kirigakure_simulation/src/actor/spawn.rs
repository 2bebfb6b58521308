//! Actor spawn/despawn.
//!
//! Актор = body entity + отдельный hitbox entity, связанные `HitboxLink`.
//! Despawn всегда идёт через `despawn_actor`: hitbox, pending effects и
//! alive set чистятся в одном тике.

use bevy::prelude::*;

use crate::actor::archetype::{ActorKind, Archetype};
use crate::actor::state::ActorStateMachine;
use crate::combat::hitbox::AttackHitbox;
use crate::components::{Actor, Enemy, Facing, Health, HitboxLink, Kinematics, Player};
use crate::effects::EffectScheduler;
use crate::encounter::Encounter;

fn actor_bundle(archetype: &Archetype, position: Vec2, facing: Facing) -> impl Bundle {
    (
        Actor::new(archetype.kind),
        Health::new(archetype.max_health),
        ActorStateMachine::default(),
        Kinematics::at(position, facing),
        Name::new(match archetype.kind {
            ActorKind::Player => "Player",
            ActorKind::Grunt => "Grunt",
            ActorKind::Boss => "Boss",
        }),
    )
}

/// Spawn через Commands (systems). Returns the body entity.
pub fn spawn_actor(commands: &mut Commands, archetype: &Archetype, position: Vec2, facing: Facing) -> Entity {
    let mut body = commands.spawn(actor_bundle(archetype, position, facing));
    match archetype.kind {
        ActorKind::Player => body.insert(Player),
        ActorKind::Grunt | ActorKind::Boss => body.insert(Enemy),
    };
    let actor = body.id();

    let mut hitbox = AttackHitbox::new(actor, archetype);
    hitbox.place(position, facing);
    let hitbox = commands.spawn((hitbox, Name::new("AttackHitbox"))).id();
    commands.entity(actor).insert(HitboxLink(hitbox));

    crate::logger::log(&format!(
        "🧍 Spawned {:?} {:?} at ({:.0}, {:.0}) hitbox={:?}",
        archetype.kind, actor, position.x, position.y, hitbox
    ));

    actor
}

/// Spawn напрямую в World (tests, host setup).
pub fn spawn_actor_in_world(world: &mut World, archetype: &Archetype, position: Vec2, facing: Facing) -> Entity {
    let mut body = world.spawn(actor_bundle(archetype, position, facing));
    match archetype.kind {
        ActorKind::Player => body.insert(Player),
        ActorKind::Grunt | ActorKind::Boss => body.insert(Enemy),
    };
    let actor = body.id();

    let mut hitbox = AttackHitbox::new(actor, archetype);
    hitbox.place(position, facing);
    let hitbox = world.spawn((hitbox, Name::new("AttackHitbox"))).id();
    world.entity_mut(actor).insert(HitboxLink(hitbox));

    actor
}

/// Destroy an actor: pending effects cancelled, alive set updated, body and
/// hitbox despawned at the next sync point of the same tick.
pub fn despawn_actor(
    commands: &mut Commands,
    scheduler: &mut EffectScheduler,
    encounter: &mut Encounter,
    actor: Entity,
    hitbox: Option<Entity>,
) {
    let cancelled = scheduler.cancel_owner(actor);
    encounter.forget_enemy(actor);

    if let Some(hitbox) = hitbox {
        if let Ok(mut entity) = commands.get_entity(hitbox) {
            entity.despawn();
        }
    }
    if let Ok(mut entity) = commands.get_entity(actor) {
        entity.despawn();
    }

    crate::logger::log(&format!(
        "🗑️ Despawned {:?} (hitbox {:?}, {} pending effects cancelled)",
        actor, hitbox, cancelled
    ));
}
