//! Effect Scheduler: deadline queue вместо callback-таймеров.
//!
//! Ключ `(fire_at, seq)`: BTreeMap отдаёт эффекты в порядке времени,
//! ничьи разрешаются порядком вставки. Каждый эффект принадлежит актору;
//! если актор исчез до срабатывания, эффект пропускается.
//!
//! Срабатывание (`run_scheduled_effects`) идёт только пока gameplay clock
//! бежит, поэтому hit-stop и пауза диалога замораживают все дедлайны.

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::actor::spawn::despawn_actor;
use crate::actor::systems::resting_tint;
use crate::actor::state::ActorStateMachine;
use crate::clock::{gameplay_running, CombatClock};
use crate::combat::events::ActorStateChanged;
use crate::combat::hitbox::AttackHitbox;
use crate::components::{HitboxLink, Invincibility, StatusTint};
use crate::encounter::Encounter;
use crate::SimulationSet;

/// Deferred actor action. Each variant carries the token of the state it
/// belongs to, so a stale effect becomes a no-op instead of a wrong transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectAction {
    OpenHitbox { swing: u32 },
    CloseHitbox { swing: u32 },
    FinishAttack { swing: u32 },
    RecoverFromHit { since: u64 },
    RecoverFromStun { since: u64 },
    EndInvincibility { until: u64 },
    RestoreTint,
    DeathComplete,
}

impl EffectAction {
    pub fn is_swing_step(&self) -> bool {
        matches!(
            self,
            EffectAction::OpenHitbox { .. } | EffectAction::CloseHitbox { .. } | EffectAction::FinishAttack { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EffectId {
    pub fire_at: u64,
    seq: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledEffect {
    pub owner: Entity,
    pub action: EffectAction,
}

#[derive(Resource, Debug, Default)]
pub struct EffectScheduler {
    queue: BTreeMap<EffectId, ScheduledEffect>,
    next_seq: u64,
}

impl EffectScheduler {
    pub fn schedule(&mut self, fire_at: u64, owner: Entity, action: EffectAction) -> EffectId {
        let id = EffectId {
            fire_at,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.queue.insert(id, ScheduledEffect { owner, action });
        id
    }

    pub fn cancel(&mut self, id: EffectId) -> bool {
        self.queue.remove(&id).is_some()
    }

    /// Drop every pending effect of `owner`. Returns how many were dropped.
    pub fn cancel_owner(&mut self, owner: Entity) -> usize {
        self.cancel_owner_where(owner, |_| true)
    }

    pub fn cancel_owner_where(&mut self, owner: Entity, predicate: impl Fn(&EffectAction) -> bool) -> usize {
        let before = self.queue.len();
        self.queue
            .retain(|_, effect| effect.owner != owner || !predicate(&effect.action));
        before - self.queue.len()
    }

    /// Remove and return everything due at `now`, in firing order.
    pub fn drain_due(&mut self, now: u64) -> Vec<(EffectId, ScheduledEffect)> {
        let mut due = Vec::new();
        while let Some(entry) = self.queue.first_entry() {
            if entry.key().fire_at > now {
                break;
            }
            let (id, effect) = entry.remove_entry();
            due.push((id, effect));
        }
        due
    }

    pub fn pending_for(&self, owner: Entity) -> usize {
        self.queue.values().filter(|effect| effect.owner == owner).count()
    }

    pub fn next_fire_at(&self) -> Option<u64> {
        self.queue.keys().next().map(|id| id.fire_at)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

/// Система: fire all effects due at the current gameplay time.
pub fn run_scheduled_effects(
    clock: Res<CombatClock>,
    mut scheduler: ResMut<EffectScheduler>,
    mut encounter: ResMut<Encounter>,
    mut commands: Commands,
    mut actors: Query<(
        &mut ActorStateMachine,
        &mut Invincibility,
        &mut StatusTint,
        Option<&HitboxLink>,
    )>,
    mut hitboxes: Query<&mut AttackHitbox>,
    mut state_events: EventWriter<ActorStateChanged>,
) {
    let now = clock.now();

    for (id, effect) in scheduler.drain_due(now) {
        let Ok((mut machine, mut invincibility, mut tint, link)) = actors.get_mut(effect.owner) else {
            crate::logger::log_warning(&format!(
                "⚠️ Skipping {:?} scheduled at t={}: owner {:?} is gone",
                effect.action, id.fire_at, effect.owner
            ));
            continue;
        };
        let hitbox = link.map(|link| link.0);

        let change = match effect.action {
            EffectAction::OpenHitbox { swing } => {
                if machine.current_attack().map(|(current, _)| current) == Some(swing) {
                    if let Some(mut hitbox) = hitbox.and_then(|e| hitboxes.get_mut(e).ok()) {
                        hitbox.open(swing);
                    }
                }
                None
            }
            EffectAction::CloseHitbox { swing } => {
                if let Some(mut hitbox) = hitbox.and_then(|e| hitboxes.get_mut(e).ok()) {
                    hitbox.close(swing);
                }
                None
            }
            EffectAction::FinishAttack { swing } => machine.finish_attack(swing),
            EffectAction::RecoverFromHit { since } => machine.recover_from_hit(since),
            EffectAction::RecoverFromStun { since } => machine.recover_from_stun(since),
            EffectAction::EndInvincibility { until } => {
                if invincibility.until == Some(until) {
                    invincibility.clear();
                }
                *tint = resting_tint(machine.state(), invincibility.is_active(now));
                None
            }
            EffectAction::RestoreTint => {
                if *tint == StatusTint::HitFlash {
                    *tint = resting_tint(machine.state(), invincibility.is_active(now));
                }
                None
            }
            EffectAction::DeathComplete => {
                despawn_actor(&mut commands, &mut scheduler, &mut encounter, effect.owner, hitbox);
                None
            }
        };

        if let Some(change) = change {
            if *tint != StatusTint::HitFlash {
                *tint = resting_tint(change.to, invincibility.is_active(now));
            }
            state_events.write(ActorStateChanged {
                actor: effect.owner,
                old: change.from,
                new: change.to,
            });
        }
    }
}

pub struct EffectsPlugin;

impl Plugin for EffectsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EffectScheduler>().add_systems(
            FixedUpdate,
            run_scheduled_effects
                .in_set(SimulationSet::Effects)
                .run_if(gameplay_running),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_time_order_with_insertion_ties() {
        let mut scheduler = EffectScheduler::default();
        let a = Entity::from_raw(1);
        let b = Entity::from_raw(2);

        scheduler.schedule(300, a, EffectAction::CloseHitbox { swing: 0 });
        scheduler.schedule(100, a, EffectAction::OpenHitbox { swing: 0 });
        scheduler.schedule(300, b, EffectAction::RestoreTint);
        scheduler.schedule(300, a, EffectAction::FinishAttack { swing: 0 });

        let due: Vec<_> = scheduler.drain_due(300).into_iter().map(|(_, e)| e).collect();
        assert_eq!(
            due,
            vec![
                ScheduledEffect { owner: a, action: EffectAction::OpenHitbox { swing: 0 } },
                ScheduledEffect { owner: a, action: EffectAction::CloseHitbox { swing: 0 } },
                ScheduledEffect { owner: b, action: EffectAction::RestoreTint },
                ScheduledEffect { owner: a, action: EffectAction::FinishAttack { swing: 0 } },
            ]
        );
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_drain_leaves_future_effects() {
        let mut scheduler = EffectScheduler::default();
        let a = Entity::from_raw(1);

        scheduler.schedule(100, a, EffectAction::RestoreTint);
        scheduler.schedule(101, a, EffectAction::DeathComplete);

        assert_eq!(scheduler.drain_due(100).len(), 1);
        assert_eq!(scheduler.next_fire_at(), Some(101));

        // fires at most once
        assert!(scheduler.drain_due(100).is_empty());
        assert_eq!(scheduler.drain_due(500).len(), 1);
    }

    #[test]
    fn test_cancel_by_id_and_owner() {
        let mut scheduler = EffectScheduler::default();
        let a = Entity::from_raw(1);
        let b = Entity::from_raw(2);

        let id = scheduler.schedule(100, a, EffectAction::RestoreTint);
        scheduler.schedule(200, a, EffectAction::OpenHitbox { swing: 4 });
        scheduler.schedule(250, a, EffectAction::RecoverFromHit { since: 0 });
        scheduler.schedule(200, b, EffectAction::OpenHitbox { swing: 1 });

        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));

        assert_eq!(scheduler.cancel_owner_where(a, EffectAction::is_swing_step), 1);
        assert_eq!(scheduler.pending_for(a), 1);

        assert_eq!(scheduler.cancel_owner(a), 1);
        assert_eq!(scheduler.pending_for(a), 0);
        assert_eq!(scheduler.pending_for(b), 1);
    }
}
