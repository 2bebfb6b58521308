//! ECS Components для акторов encounter
//!
//! Организация:
//! - actor: базовые характеристики (kind, health, kinematics, timers, tint)
//! - player: control markers (Player, Enemy)
//!
//! State machine и hitbox живут в `actor` и `combat` соответственно.

pub mod actor;
pub mod player;

pub use actor::*;
pub use player::*;
