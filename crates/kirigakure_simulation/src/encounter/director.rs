//! Encounter Director systems.
//!
//! Работают каждый тик (Director set, последним), даже пока clock на паузе:
//! dialog/restart приходят именно в паузе. Все дедлайны считаются по
//! gameplay времени, так что пауза и hit-stop сами останавливают spawn.
//!
//! Порядок: restart → bootstrap → signals (Defeat первым) → dialogs →
//! wave complete → spawn throttle.

use bevy::prelude::*;
use rand::Rng;

use crate::actor::archetype::ActorKind;
use crate::actor::spawn::{despawn_actor, spawn_actor};
use crate::clock::CombatClock;
use crate::combat::events::EncounterSignal;
use crate::components::{Actor, Enemy, Facing, HitboxLink, Kinematics, Player};
use crate::config::CombatConfig;
use crate::effects::EffectScheduler;
use crate::encounter::dialog::DialogScript;
use crate::encounter::events::{DialogFinished, DialogRequested, PhaseChanged, RestartRequested, ScoreChanged};
use crate::encounter::state::{Encounter, EncounterPhase};
use crate::DeterministicRng;

/// Advance the phase; an illegal step is a logic bug (assert in debug).
fn change_phase(encounter: &mut Encounter, to: EncounterPhase, phases: &mut EventWriter<PhaseChanged>) -> bool {
    match encounter.advance_phase(to) {
        Ok(change) => {
            crate::logger::log_info(&format!(
                "🎬 Phase {:?} → {:?} (kills={}, score={})",
                change.from,
                change.to,
                encounter.kill_count(),
                encounter.score()
            ));
            phases.write(PhaseChanged {
                old: change.from,
                new: change.to,
            });
            true
        }
        Err(err) => {
            crate::logger::log_error(&format!("❌ Phase ordering violation: {}", err));
            debug_assert!(false, "phase ordering violation: {}", err);
            false
        }
    }
}

fn open_dialog(
    encounter: &mut Encounter,
    clock: &mut CombatClock,
    dialogs: &mut EventWriter<DialogRequested>,
    script: DialogScript,
) {
    encounter.open_dialog = Some(script);
    clock.pause();
    dialogs.write(DialogRequested { script });
    crate::logger::log_info(&format!("💬 Dialog {:?} opened ({} lines)", script, script.lines().len()));
}

/// Система: spawn the player and open the intro dialog once per playthrough.
pub fn bootstrap_encounter(
    mut commands: Commands,
    config: Res<CombatConfig>,
    mut encounter: ResMut<Encounter>,
    mut clock: ResMut<CombatClock>,
    mut dialogs: EventWriter<DialogRequested>,
) {
    if encounter.bootstrapped || !config.encounter.autostart {
        return;
    }
    encounter.bootstrapped = true;

    let player = spawn_actor(
        &mut commands,
        config.archetype(ActorKind::Player),
        config.encounter.player_start,
        Facing::Right,
    );
    encounter.player = Some(player);

    open_dialog(&mut encounter, &mut clock, &mut dialogs, DialogScript::Intro);
}

/// Система: on-death signals. Defeat pre-empts everything; Victory fires once.
pub fn handle_encounter_signals(
    mut signals: EventReader<EncounterSignal>,
    mut encounter: ResMut<Encounter>,
    mut clock: ResMut<CombatClock>,
    mut phases: EventWriter<PhaseChanged>,
    mut dialogs: EventWriter<DialogRequested>,
) {
    let mut player_down = false;
    let mut boss_down = false;
    for signal in signals.read() {
        match signal {
            EncounterSignal::PlayerDefeated { .. } => player_down = true,
            EncounterSignal::BossDefeated { .. } => boss_down = true,
        }
    }

    if player_down {
        if encounter.phase().is_terminal() {
            return;
        }
        if change_phase(&mut encounter, EncounterPhase::Defeat, &mut phases) {
            encounter.next_spawn_at = None;
            clock.pause();
        }
        return;
    }

    if boss_down {
        if encounter.phase() != EncounterPhase::BossFight {
            crate::logger::log(&format!(
                "Boss defeat signal ignored in {:?}",
                encounter.phase()
            ));
            return;
        }
        if change_phase(&mut encounter, EncounterPhase::Victory, &mut phases) {
            encounter.next_spawn_at = None;
            open_dialog(&mut encounter, &mut clock, &mut dialogs, DialogScript::Outro);
        }
    }
}

/// Система: dialog completion drives the scripted phases.
#[allow(clippy::too_many_arguments)]
pub fn handle_dialog_finished(
    mut finished: EventReader<DialogFinished>,
    mut commands: Commands,
    config: Res<CombatConfig>,
    mut encounter: ResMut<Encounter>,
    mut clock: ResMut<CombatClock>,
    players: Query<&Kinematics, With<Player>>,
    mut phases: EventWriter<PhaseChanged>,
    mut dialogs: EventWriter<DialogRequested>,
) {
    for event in finished.read() {
        if encounter.open_dialog != Some(event.script) {
            crate::logger::log_warning(&format!(
                "⚠️ DialogFinished({:?}) without matching open dialog ({:?})",
                event.script, encounter.open_dialog
            ));
            continue;
        }
        encounter.open_dialog = None;

        match event.script {
            DialogScript::Intro => {
                if change_phase(&mut encounter, EncounterPhase::Wave1, &mut phases) {
                    encounter.next_spawn_at = Some(clock.now());
                }
                clock.resume();
            }
            DialogScript::Interstitial => {
                if change_phase(&mut encounter, EncounterPhase::BossIntro, &mut phases) {
                    let player_x = encounter
                        .player
                        .and_then(|player| players.get(player).ok())
                        .map_or(config.encounter.player_start.x, |kinematics| kinematics.position.x);
                    spawn_boss(&mut commands, &config, &mut encounter, player_x);
                    open_dialog(&mut encounter, &mut clock, &mut dialogs, DialogScript::BossIntro);
                }
            }
            DialogScript::BossIntro => {
                change_phase(&mut encounter, EncounterPhase::BossFight, &mut phases);
                clock.resume();
            }
            DialogScript::Outro => {
                crate::logger::log_info(&format!(
                    "🏁 Encounter cleared: score={} kills={}",
                    encounter.score(),
                    encounter.kill_count()
                ));
            }
        }
    }
}

/// Boss goes to the level edge opposite the player.
fn spawn_boss(commands: &mut Commands, config: &CombatConfig, encounter: &mut Encounter, player_x: f32) -> Entity {
    let level = &config.encounter;
    let x = if player_x < level.level_mid_x() {
        level.clamp_x(level.level_max_x)
    } else {
        level.clamp_x(level.level_min_x)
    };
    let facing = Facing::towards(x, player_x);

    let boss = spawn_actor(
        commands,
        config.archetype(ActorKind::Boss),
        Vec2::new(x, level.ground_y),
        facing,
    );
    encounter.register_enemy(boss);
    encounter.boss = Some(boss);
    boss
}

/// Система: Wave1 → Interstitial on the kill target, in the same tick as the kill.
#[allow(clippy::too_many_arguments)]
pub fn check_wave_complete(
    mut commands: Commands,
    config: Res<CombatConfig>,
    mut encounter: ResMut<Encounter>,
    mut scheduler: ResMut<EffectScheduler>,
    mut clock: ResMut<CombatClock>,
    enemies: Query<Option<&HitboxLink>, With<Enemy>>,
    mut phases: EventWriter<PhaseChanged>,
    mut dialogs: EventWriter<DialogRequested>,
) {
    if encounter.phase() != EncounterPhase::Wave1 || encounter.kill_count() < config.encounter.wave_kill_target {
        return;
    }
    if !change_phase(&mut encounter, EncounterPhase::Interstitial, &mut phases) {
        return;
    }
    encounter.next_spawn_at = None;

    let survivors: Vec<Entity> = encounter.alive_enemies().collect();
    for enemy in survivors {
        let hitbox = enemies.get(enemy).ok().flatten().map(|link| link.0);
        despawn_actor(&mut commands, &mut scheduler, &mut encounter, enemy, hitbox);
    }

    open_dialog(&mut encounter, &mut clock, &mut dialogs, DialogScript::Interstitial);
}

/// Система: Wave1 spawn throttle (cap on alive grunts, alternating sides).
pub fn spawn_throttle(
    mut commands: Commands,
    config: Res<CombatConfig>,
    clock: Res<CombatClock>,
    mut rng: ResMut<DeterministicRng>,
    mut encounter: ResMut<Encounter>,
    players: Query<&Kinematics, With<Player>>,
) {
    if encounter.phase() != EncounterPhase::Wave1 {
        return;
    }
    let Some(due) = encounter.next_spawn_at else {
        return;
    };
    let now = clock.now();
    if now < due {
        return;
    }
    let level = &config.encounter;
    encounter.next_spawn_at = Some(now + level.spawn_interval_ms);

    if encounter.alive_count() >= level.max_alive_grunts {
        return;
    }
    let Some(player_x) = encounter
        .player
        .and_then(|player| players.get(player).ok())
        .map(|kinematics| kinematics.position.x)
    else {
        return;
    };

    let side = encounter.spawn_side;
    encounter.spawn_side = side.flipped();

    let jitter = if level.spawn_jitter > 0.0 {
        rng.rng.gen_range(-level.spawn_jitter..=level.spawn_jitter)
    } else {
        0.0
    };
    let x = level.clamp_x(player_x + side.sign() * (level.spawn_offset + jitter));

    let grunt = spawn_actor(
        &mut commands,
        config.archetype(ActorKind::Grunt),
        Vec2::new(x, level.ground_y),
        Facing::towards(x, player_x),
    );
    encounter.register_enemy(grunt);

    crate::logger::log(&format!(
        "👹 Grunt spawned at x={:.0} ({} alive, next at t={})",
        x,
        encounter.alive_count(),
        now + level.spawn_interval_ms
    ));
}

/// Система: restart after Victory/Defeat. Everything is torn down and the
/// next tick bootstraps a fresh playthrough.
#[allow(clippy::too_many_arguments)]
pub fn handle_restart(
    mut requests: EventReader<RestartRequested>,
    mut commands: Commands,
    mut encounter: ResMut<Encounter>,
    mut scheduler: ResMut<EffectScheduler>,
    mut clock: ResMut<CombatClock>,
    actors: Query<(Entity, Option<&HitboxLink>), With<Actor>>,
    mut phases: EventWriter<PhaseChanged>,
    mut scores: EventWriter<ScoreChanged>,
) {
    if requests.read().count() == 0 {
        return;
    }
    if !encounter.phase().is_terminal() {
        crate::logger::log_warning(&format!("⚠️ Restart ignored in {:?}", encounter.phase()));
        return;
    }

    for (actor, link) in actors.iter() {
        despawn_actor(&mut commands, &mut scheduler, &mut encounter, actor, link.map(|link| link.0));
    }
    scheduler.clear();

    let change = encounter.restart();
    clock.resume();

    crate::logger::log_info(&format!("🔄 Restart from {:?}", change.from));
    phases.write(PhaseChanged {
        old: change.from,
        new: change.to,
    });
    scores.write(ScoreChanged { score: 0 });
}
