//! Headless прогон encounter'а Kirigakure
//!
//! Минимальный host вокруг ядра: velocity/гравитация/земля, AABB overlaps
//! hitbox vs body, скриптованный игрок, диалоги закрываются сразу.
//! Тики гоняются напрямую через FixedUpdate, без wall clock.

use bevy::prelude::*;
use kirigakure_simulation::*;

const GRAVITY: f32 = 1800.0;
const BODY_HALF_EXTENTS: Vec2 = Vec2::new(16.0, 24.0);
const ENGAGE_DISTANCE: f32 = 140.0;
/// Игрок поднимает блок за столько ms до активного окна врага (→ parry).
const GUARD_LEAD_MS: u64 = 120;
const THREAT_DISTANCE: f32 = 280.0;
const MAX_TICKS: u32 = 20_000;

fn main() {
    let seed = 42;
    println!("Starting Kirigakure headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin::default());

    let config = app.world().resource::<CombatConfig>().clone();
    let dt = config.tick_ms as f32 / 1000.0;

    let mut dialogs = app.world().resource::<Events<DialogRequested>>().get_cursor();
    let mut phases = app.world().resource::<Events<PhaseChanged>>().get_cursor();
    let mut hits = app.world().resource::<Events<DamageResolved>>().get_cursor();

    let mut parries = 0u32;
    let mut ticks = 0u32;

    for tick in 0..MAX_TICKS {
        ticks = tick + 1;
        let world = app.world_mut();

        integrate_bodies(world, &config, dt);
        drive_player(world, &config);
        send_overlaps(world, &config);

        world.run_schedule(FixedUpdate);

        let requested: Vec<DialogScript> = dialogs
            .read(world.resource::<Events<DialogRequested>>())
            .map(|event| event.script)
            .collect();
        for script in requested {
            for line in script.lines() {
                logger::log_info(&format!("💬 {}: {}", line.speaker, line.text));
            }
            world.send_event(DialogFinished { script });
        }

        for change in phases.read(world.resource::<Events<PhaseChanged>>()) {
            println!("Tick {}: phase {:?} → {:?}", tick, change.old, change.new);
        }
        parries += hits
            .read(world.resource::<Events<DamageResolved>>())
            .filter(|hit| hit.outcome == HitOutcome::Parried)
            .count() as u32;

        rotate_events(world);

        let encounter = world.resource::<Encounter>();
        if tick % 500 == 0 {
            println!(
                "Tick {}: phase={:?} kills={} score={} alive={} entities={}",
                tick,
                encounter.phase(),
                encounter.kill_count(),
                encounter.score(),
                encounter.alive_count(),
                world.entities().len()
            );
        }
        if encounter.phase().is_terminal() && encounter.open_dialog.is_none() {
            break;
        }
    }

    let encounter = app.world().resource::<Encounter>();
    println!(
        "Simulation complete after {} ticks: phase={:?} kills={} score={} parries={}",
        ticks,
        encounter.phase(),
        encounter.kill_count(),
        encounter.score(),
        parries
    );
}

/// Double-buffer swap, как это делает `First` в обычном App::update.
fn rotate_events(world: &mut World) {
    fn rotate<E: Event>(world: &mut World) {
        world.resource_mut::<Events<E>>().update();
    }

    rotate::<ColliderOverlap>(world);
    rotate::<DamageResolved>(world);
    rotate::<ActorStateChanged>(world);
    rotate::<ActorDied>(world);
    rotate::<EncounterSignal>(world);
    rotate::<PresentationCue>(world);
    rotate::<PhaseChanged>(world);
    rotate::<ScoreChanged>(world);
    rotate::<DialogRequested>(world);
    rotate::<DialogFinished>(world);
    rotate::<RestartRequested>(world);
}

/// Host physics: гравитация, земля, границы уровня. Стоит вместе с clock.
fn integrate_bodies(world: &mut World, config: &CombatConfig, dt: f32) {
    if !world.resource::<CombatClock>().is_running() {
        return;
    }
    let level = &config.encounter;

    let mut bodies = world.query::<(&mut Kinematics, &mut Grounded)>();
    for (mut kinematics, mut grounded) in bodies.iter_mut(world) {
        kinematics.velocity.y += GRAVITY * dt;
        let velocity = kinematics.velocity;
        kinematics.position += velocity * dt;
        kinematics.position.x = level.clamp_x(kinematics.position.x);

        if kinematics.position.y >= level.ground_y {
            kinematics.position.y = level.ground_y;
            kinematics.velocity.y = 0.0;
            grounded.0 = true;
        } else {
            grounded.0 = false;
        }
    }
}

/// Скриптованный игрок: идёт к ближайшему врагу, рубит в упор и
/// поднимает блок прямо перед активным окном чужого замаха.
fn drive_player(world: &mut World, config: &CombatConfig) {
    let now = world.resource::<CombatClock>().now();

    let mut enemies = world.query_filtered::<(&Actor, &Kinematics, &ActorStateMachine), With<Enemy>>();
    let threats: Vec<(f32, Option<u64>)> = enemies
        .iter(world)
        .filter(|(_, _, machine)| !machine.is_dead())
        .map(|(actor, kinematics, machine)| {
            let active_start = machine
                .current_attack()
                .map(|(_, started_at)| config.archetype(actor.kind).timing.active_start(started_at));
            (kinematics.position.x, active_start)
        })
        .collect();

    let mut players = world.query_filtered::<(&Kinematics, &mut ActorIntents), With<Player>>();
    let Ok((kinematics, mut intents)) = players.single_mut(world) else {
        return;
    };

    *intents = ActorIntents::default();
    let x = kinematics.position.x;

    let incoming = threats.iter().any(|&(enemy_x, active_start)| {
        (enemy_x - x).abs() < THREAT_DISTANCE
            && active_start.is_some_and(|start| now + GUARD_LEAD_MS >= start)
    });
    if incoming {
        intents.block = true;
        return;
    }

    let Some(&(target_x, _)) = threats
        .iter()
        .min_by(|a, b| (a.0 - x).abs().total_cmp(&(b.0 - x).abs()))
    else {
        return;
    };

    let toward = Facing::towards(x, target_x);
    if (target_x - x).abs() > ENGAGE_DISTANCE || kinematics.facing != toward {
        match toward {
            Facing::Left => intents.move_left = true,
            Facing::Right => intents.move_right = true,
        }
    } else {
        intents.attack = true;
    }
}

/// Host collision: enabled hitbox vs чужие живые тела.
fn send_overlaps(world: &mut World, config: &CombatConfig) {
    let mut hitboxes = world.query::<(Entity, &AttackHitbox)>();
    let mut bodies = world.query::<(Entity, &Actor, &Kinematics, &BodyCollision)>();

    let mut overlaps = Vec::new();
    for (hitbox_entity, hitbox) in hitboxes.iter(world) {
        if !hitbox.is_enabled() {
            continue;
        }
        for (body, actor, kinematics, collision) in bodies.iter(world) {
            if body == hitbox.owner || !collision.enabled {
                continue;
            }
            let half_extents = BODY_HALF_EXTENTS * config.archetype(actor.kind).scale;
            if hitbox.overlaps(kinematics.position, half_extents) {
                overlaps.push(ColliderOverlap {
                    a: hitbox_entity,
                    b: body,
                });
            }
        }
    }

    for overlap in overlaps {
        world.send_event(overlap);
    }
}
