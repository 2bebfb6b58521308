//! Combat tunables.
//!
//! Defaults reproduce the shipped encounter; hosts may override any subset
//! through `CombatConfig::from_json` (missing fields keep their defaults).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::actor::archetype::{ActorKind, Archetype};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed combat config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid combat config: {0}")]
    Invalid(String),
}

/// Hit-stop durations (ms) by hit severity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitStopConfig {
    pub graze_ms: u64,
    pub heavy_ms: u64,
    pub killing_blow_ms: u64,
    pub parry_ms: u64,
}

impl Default for HitStopConfig {
    fn default() -> Self {
        Self {
            graze_ms: 40,
            heavy_ms: 70,
            killing_blow_ms: 120,
            parry_ms: 90,
        }
    }
}

/// Knockback impulses (units/s). Negative y is up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnockbackConfig {
    pub block: Vec2,
    pub player_hurt: Vec2,
    pub enemy_hurt: Vec2,
    pub stun: Vec2,
}

impl Default for KnockbackConfig {
    fn default() -> Self {
        Self {
            block: Vec2::new(200.0, 0.0),
            player_hurt: Vec2::new(400.0, -400.0),
            enemy_hurt: Vec2::new(100.0, 0.0),
            stun: Vec2::new(200.0, -200.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub grunt_kill: u32,
    pub boss_kill: u32,
    pub parry_bonus: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            grunt_kill: 100,
            boss_kill: 1000,
            parry_bonus: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterConfig {
    /// Spawn the player and open the intro dialog on the first tick.
    pub autostart: bool,
    pub spawn_interval_ms: u64,
    pub max_alive_grunts: usize,
    pub wave_kill_target: u32,
    pub spawn_offset: f32,
    pub spawn_jitter: f32,
    pub level_min_x: f32,
    pub level_max_x: f32,
    pub level_margin: f32,
    pub ground_y: f32,
    pub player_start: Vec2,
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            autostart: true,
            spawn_interval_ms: 3000,
            max_alive_grunts: 3,
            wave_kill_target: 5,
            spawn_offset: 600.0,
            spawn_jitter: 80.0,
            level_min_x: 0.0,
            level_max_x: 3000.0,
            level_margin: 60.0,
            ground_y: 450.0,
            player_start: Vec2::new(100.0, 450.0),
        }
    }
}

impl EncounterConfig {
    pub fn clamp_x(&self, x: f32) -> f32 {
        x.clamp(
            self.level_min_x + self.level_margin,
            self.level_max_x - self.level_margin,
        )
    }

    pub fn level_mid_x(&self) -> f32 {
        (self.level_min_x + self.level_max_x) * 0.5
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchetypeTable {
    pub player: Archetype,
    pub grunt: Archetype,
    pub boss: Archetype,
}

impl Default for ArchetypeTable {
    fn default() -> Self {
        Self {
            player: Archetype::player(),
            grunt: Archetype::grunt(),
            boss: Archetype::boss(),
        }
    }
}

impl ArchetypeTable {
    pub fn get(&self, kind: ActorKind) -> &Archetype {
        match kind {
            ActorKind::Player => &self.player,
            ActorKind::Grunt => &self.grunt,
            ActorKind::Boss => &self.boss,
        }
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Length of one simulation tick (ms of gameplay time).
    pub tick_ms: u64,
    /// A block younger than this turns a hit into a parry.
    pub parry_window_ms: u64,
    pub invincibility_ms: u64,
    pub stun_ms: u64,
    pub hit_flash_ms: u64,
    pub hit_stop: HitStopConfig,
    pub knockback: KnockbackConfig,
    pub scoring: ScoringConfig,
    pub encounter: EncounterConfig,
    pub archetypes: ArchetypeTable,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            tick_ms: 16,
            parry_window_ms: 200,
            invincibility_ms: 1000,
            stun_ms: 1500,
            hit_flash_ms: 100,
            hit_stop: HitStopConfig::default(),
            knockback: KnockbackConfig::default(),
            scoring: ScoringConfig::default(),
            encounter: EncounterConfig::default(),
            archetypes: ArchetypeTable::default(),
        }
    }
}

impl CombatConfig {
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        let config: CombatConfig = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::Invalid("tick_ms must be positive".into()));
        }
        if self.parry_window_ms == 0 {
            return Err(ConfigError::Invalid("parry_window_ms must be positive".into()));
        }
        if self.encounter.max_alive_grunts == 0 {
            return Err(ConfigError::Invalid("max_alive_grunts must be positive".into()));
        }
        if self.encounter.wave_kill_target == 0 {
            return Err(ConfigError::Invalid("wave_kill_target must be positive".into()));
        }
        let usable = self.encounter.level_max_x - self.encounter.level_min_x;
        if usable <= 2.0 * self.encounter.level_margin {
            return Err(ConfigError::Invalid(format!(
                "level bounds [{}, {}] leave no room inside margin {}",
                self.encounter.level_min_x, self.encounter.level_max_x, self.encounter.level_margin
            )));
        }
        for archetype in [&self.archetypes.player, &self.archetypes.grunt, &self.archetypes.boss] {
            if archetype.max_health == 0 {
                return Err(ConfigError::Invalid(format!(
                    "{:?} archetype needs a positive max_health",
                    archetype.kind
                )));
            }
        }
        Ok(())
    }

    pub fn archetype(&self, kind: ActorKind) -> &Archetype {
        self.archetypes.get(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = CombatConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.parry_window_ms, 200);
        assert_eq!(config.encounter.max_alive_grunts, 3);
        assert_eq!(config.encounter.wave_kill_target, 5);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = CombatConfig::from_json(r#"{ "tick_ms": 10, "encounter": { "spawn_interval_ms": 500 } }"#)
            .expect("override parses");

        assert_eq!(config.tick_ms, 10);
        assert_eq!(config.encounter.spawn_interval_ms, 500);
        assert_eq!(config.encounter.max_alive_grunts, 3);
        assert_eq!(config.archetypes.grunt.max_health, 3);
    }

    #[test]
    fn test_rejects_zero_parry_window() {
        let err = CombatConfig::from_json(r#"{ "parry_window_ms": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = CombatConfig::from_json("{ tick_ms: ").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_clamp_x_respects_margin() {
        let encounter = EncounterConfig::default();
        assert_eq!(encounter.clamp_x(-500.0), 60.0);
        assert_eq!(encounter.clamp_x(9000.0), 2940.0);
        assert_eq!(encounter.clamp_x(1200.0), 1200.0);
    }
}
