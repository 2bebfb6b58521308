//! Combat Clock: монотонное gameplay-время + hit-stop override.
//!
//! Two time bases:
//! - `real_ms` always advances by one tick;
//! - `now_ms` (gameplay time, used by every deadline) stands still while the
//!   clock is paused (dialog, defeat, victory) or inside a hit-stop.
//!
//! Hit-stop requests compose by max, never by queuing.

use bevy::prelude::*;

#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct CombatClock {
    real_ms: u64,
    now_ms: u64,
    tick_ms: u64,
    hit_stop_remaining_ms: u64,
    paused: bool,
}

impl Default for CombatClock {
    fn default() -> Self {
        Self::new(16)
    }
}

impl CombatClock {
    pub fn new(tick_ms: u64) -> Self {
        Self {
            real_ms: 0,
            now_ms: 0,
            tick_ms,
            hit_stop_remaining_ms: 0,
            paused: false,
        }
    }

    /// Gameplay timestamp (ms).
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    pub fn real_now(&self) -> u64 {
        self.real_ms
    }

    pub fn tick_ms(&self) -> u64 {
        self.tick_ms
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn in_hit_stop(&self) -> bool {
        self.hit_stop_remaining_ms > 0
    }

    pub fn hit_stop_remaining(&self) -> u64 {
        self.hit_stop_remaining_ms
    }

    /// Gameplay advances this tick: not paused, not frozen by hit-stop.
    pub fn is_running(&self) -> bool {
        !self.paused && !self.in_hit_stop()
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Extend the freeze to at least `duration_ms` from now.
    pub fn request_hit_stop(&mut self, duration_ms: u64) {
        self.hit_stop_remaining_ms = self.hit_stop_remaining_ms.max(duration_ms);
    }

    /// Advance one tick of `delta_ms`.
    ///
    /// Hit-stop absorbs the tick first; whatever is left over moves gameplay
    /// time, so actors resume exactly where they stopped.
    pub fn advance(&mut self, delta_ms: u64) {
        self.real_ms += delta_ms;
        if self.paused {
            return;
        }

        let absorbed = delta_ms.min(self.hit_stop_remaining_ms);
        self.hit_stop_remaining_ms -= absorbed;
        self.now_ms += delta_ms - absorbed;
    }

    pub fn tick(&mut self) {
        self.advance(self.tick_ms);
    }
}

/// Run condition: state machine / effects / AI only advance while gameplay runs.
pub fn gameplay_running(clock: Res<CombatClock>) -> bool {
    clock.is_running()
}

/// System: one clock tick per FixedUpdate.
pub fn advance_combat_clock(mut clock: ResMut<CombatClock>) {
    let was_frozen = clock.in_hit_stop();
    clock.tick();

    if was_frozen && !clock.in_hit_stop() {
        crate::logger::log(&format!("⏱️ Hit-stop released at t={}", clock.now()));
    }
}

pub struct ClockPlugin;

impl Plugin for ClockPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CombatClock>().add_systems(
            FixedUpdate,
            advance_combat_clock.in_set(crate::SimulationSet::Clock),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_advances_by_tick() {
        let mut clock = CombatClock::new(10);
        clock.tick();
        clock.tick();
        assert_eq!(clock.now(), 20);
        assert_eq!(clock.real_now(), 20);
    }

    #[test]
    fn test_pause_freezes_gameplay_time_only() {
        let mut clock = CombatClock::new(10);
        clock.tick();
        clock.pause();
        clock.tick();
        clock.tick();
        assert_eq!(clock.now(), 10);
        assert_eq!(clock.real_now(), 30);
        assert!(!clock.is_running());

        clock.resume();
        clock.tick();
        assert_eq!(clock.now(), 20);
    }

    #[test]
    fn test_hit_stop_nests_by_max() {
        let mut clock = CombatClock::new(10);
        clock.request_hit_stop(40);
        clock.request_hit_stop(25);
        assert_eq!(clock.hit_stop_remaining(), 40);

        clock.request_hit_stop(90);
        assert_eq!(clock.hit_stop_remaining(), 90);
    }

    #[test]
    fn test_hit_stop_resumes_with_remainder() {
        let mut clock = CombatClock::new(16);
        clock.advance(100);
        clock.request_hit_stop(40);

        clock.tick(); // 16 absorbed
        clock.tick(); // 32 absorbed
        assert_eq!(clock.now(), 100);
        assert!(clock.in_hit_stop());

        clock.tick(); // 8 absorbed, 8 advance
        assert_eq!(clock.now(), 108);
        assert!(clock.is_running());
    }
}
