//! Combat systems

pub mod hitbox_guard;
pub mod resolution;

pub use hitbox_guard::*;
pub use resolution::*;
