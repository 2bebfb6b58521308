//! Kirigakure Simulation Core
//!
//! ECS-симуляция боя на Bevy 0.16 для 2D side-scroller:
//! clock + hit-stop, actor state machine, combat resolver, effect scheduler,
//! encounter director.
//!
//! Граница с host (renderer/physics/input):
//! - host пишет `ActorIntents`, `Grounded`, `Kinematics::position`, шлёт
//!   `ColliderOverlap`, `DialogFinished`, `RestartRequested`;
//! - ядро пишет velocity/facing/`StatusTint`, шлёт `DamageResolved`,
//!   `ActorStateChanged`, `PhaseChanged`, `ScoreChanged`, `DialogRequested`,
//!   `PresentationCue`.
//!
//! Порядок внутри тика (FixedUpdate, `SimulationSet`):
//! Clock → Effects → Ai → StateMachine → Resolution → Invariants → Director

use std::time::Duration;

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod actor;
pub mod ai;
pub mod clock;
pub mod combat;
pub mod components;
pub mod config;
pub mod effects;
pub mod encounter;
pub mod logger;

// Re-export базовых типов для удобства
pub use actor::{spawn_actor, spawn_actor_in_world, ActorKind, ActorPlugin, ActorState, ActorStateMachine, Archetype};
pub use ai::{AIPlugin, AIState};
pub use clock::{ClockPlugin, CombatClock};
pub use combat::{
    ActorDied, ActorStateChanged, AttackHitbox, ColliderOverlap, CombatPlugin, DamageResolved, EncounterSignal,
    HitOutcome, PresentationCue,
};
pub use components::*;
pub use config::{CombatConfig, ConfigError};
pub use effects::{EffectAction, EffectScheduler, EffectsPlugin};
pub use encounter::{
    DialogFinished, DialogRequested, DialogScript, Encounter, EncounterPhase, EncounterPlugin, PhaseChanged,
    RestartRequested, ScoreChanged,
};
pub use logger::init_logger;

/// Фазы одного simulation тика (chained).
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    Clock,
    Effects,
    Ai,
    StateMachine,
    Resolution,
    Invariants,
    Director,
}

/// Главный plugin симуляции (объединяет все подсистемы)
#[derive(Default)]
pub struct SimulationPlugin {
    config: CombatConfig,
}

impl SimulationPlugin {
    pub fn with_config(config: CombatConfig) -> Self {
        Self { config }
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let tick_ms = self.config.tick_ms;

        app.insert_resource(self.config.clone())
            .insert_resource(CombatClock::new(tick_ms))
            // Fixed timestep = один тик CombatClock
            .insert_resource(Time::<Fixed>::from_duration(Duration::from_millis(tick_ms)));

        // Детерминистичный RNG (seed по умолчанию, если host не задал свой)
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app.configure_sets(
            FixedUpdate,
            (
                SimulationSet::Clock,
                SimulationSet::Effects,
                SimulationSet::Ai,
                SimulationSet::StateMachine,
                SimulationSet::Resolution,
                SimulationSet::Invariants,
                SimulationSet::Director,
            )
                .chain(),
        );

        // Подсистемы
        app.add_plugins((
            ClockPlugin,
            EffectsPlugin,
            AIPlugin,
            ActorPlugin,
            CombatPlugin,
            EncounterPlugin,
        ));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed));

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
