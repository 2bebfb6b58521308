//! Hitbox invariant: enabled ⇒ owner Attacking with the same swing and
//! `now` inside `[start + windup, start + windup + active)`.

use bevy::prelude::*;

use crate::actor::state::ActorStateMachine;
use crate::clock::CombatClock;
use crate::combat::hitbox::AttackHitbox;
use crate::components::{Actor, Kinematics};
use crate::config::CombatConfig;

/// Система: re-place hitboxes in front of their owners and disable any
/// hitbox whose owner left the active window (hit, stun, death, despawn).
pub fn enforce_hitbox_invariant(
    clock: Res<CombatClock>,
    config: Res<CombatConfig>,
    mut hitboxes: Query<(Entity, &mut AttackHitbox)>,
    owners: Query<(&Actor, &ActorStateMachine, &Kinematics)>,
) {
    let now = clock.now();

    for (entity, mut hitbox) in hitboxes.iter_mut() {
        let Ok((actor, machine, kinematics)) = owners.get(hitbox.owner) else {
            if hitbox.is_enabled() {
                hitbox.disable();
                crate::logger::log_warning(&format!("⚠️ Hitbox {:?} lost its owner, disabled", entity));
            }
            continue;
        };

        hitbox.place(kinematics.position, kinematics.facing);

        if !hitbox.is_enabled() {
            continue;
        }

        let timing = config.archetype(actor.kind).timing;
        let valid = machine
            .current_attack()
            .is_some_and(|(swing, started_at)| {
                hitbox.swing() == Some(swing) && timing.is_active_at(started_at, now)
            });

        if !valid {
            hitbox.disable();
            crate::logger::log(&format!(
                "🔒 Hitbox {:?} of {:?} disabled: owner {} at t={}",
                entity,
                hitbox.owner,
                machine.state().name(),
                now
            ));
        }
    }
}
