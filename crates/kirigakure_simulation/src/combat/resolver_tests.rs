//! Tests for the Combat Resolver (pure, no World).

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use super::super::resolver::*;
    use crate::actor::archetype::ActorKind;
    use crate::actor::state::{ActorState, ActorStateMachine, TickInput};
    use crate::combat::events::HitOutcome;
    use crate::components::{Facing, Health, Invincibility, Kinematics, StatusTint};
    use crate::config::CombatConfig;

    fn combatant(kind: ActorKind, x: f32) -> Combatant {
        let config = CombatConfig::default();
        Combatant {
            kind,
            state: ActorStateMachine::default(),
            health: Health::new(config.archetype(kind).max_health),
            kinematics: Kinematics::at(Vec2::new(x, 450.0), Facing::Right),
            invincibility: Invincibility::default(),
            tint: StatusTint::Normal,
        }
    }

    fn blocking_player(since: u64) -> Combatant {
        let mut player = combatant(ActorKind::Player, 100.0);
        player.state.evaluate(
            TickInput {
                wants_block: true,
                can_block: true,
                ..Default::default()
            },
            since,
        );
        player
    }

    fn attacking_grunt(started_at: u64) -> Combatant {
        let mut grunt = combatant(ActorKind::Grunt, 200.0);
        grunt.state.begin_attack(started_at);
        grunt
    }

    fn grunt_strike() -> Strike {
        Strike {
            damage: 20,
            already_struck: false,
        }
    }

    fn player_strike() -> Strike {
        Strike {
            damage: 1,
            already_struck: false,
        }
    }

    #[test]
    fn test_parry_inside_window() {
        let config = CombatConfig::default();
        let mut player = blocking_player(1000);
        let mut grunt = attacking_grunt(850);

        let resolution = resolve_hit(&mut grunt, &mut player, grunt_strike(), 1150, &config);
        let report = resolution.report().unwrap();

        assert_eq!(report.outcome, HitOutcome::Parried);
        assert_eq!(report.amount, 0);
        assert_eq!(player.health.current, 100);
        assert_eq!(grunt.state.state(), ActorState::Stunned { since: 1150 });
        assert_eq!(report.stun_until, Some(2650));
        assert_eq!(report.score_bonus, config.scoring.parry_bonus);
        assert_eq!(grunt.tint, StatusTint::Stunned);
        assert_eq!(player.kinematics.velocity.x, 0.0);
        assert!(!player.invincibility.is_active(1150));
    }

    #[test]
    fn test_block_after_window() {
        let config = CombatConfig::default();
        let mut player = blocking_player(1000);
        let mut grunt = attacking_grunt(1000);

        let resolution = resolve_hit(&mut grunt, &mut player, grunt_strike(), 1300, &config);
        let report = resolution.report().unwrap();

        assert_eq!(report.outcome, HitOutcome::Blocked);
        assert_eq!(player.health.current, 100);
        // pushed away from the grunt (grunt is to the right)
        assert_eq!(player.kinematics.velocity.x, -config.knockback.block.x);
        assert!(grunt.state.current_attack().is_some());
        assert_eq!(report.hit_stop_ms, 0);
    }

    #[test]
    fn test_parry_boundary_199_vs_200() {
        let config = CombatConfig::default();

        let mut player = blocking_player(1000);
        let mut grunt = attacking_grunt(900);
        let early = resolve_hit(&mut grunt, &mut player, grunt_strike(), 1199, &config);
        assert_eq!(early.report().unwrap().outcome, HitOutcome::Parried);

        let mut player = blocking_player(1000);
        let mut grunt = attacking_grunt(900);
        let late = resolve_hit(&mut grunt, &mut player, grunt_strike(), 1200, &config);
        assert_eq!(late.report().unwrap().outcome, HitOutcome::Blocked);
    }

    #[test]
    fn test_damage_grants_player_invincibility() {
        let config = CombatConfig::default();
        let mut player = combatant(ActorKind::Player, 100.0);
        let mut grunt = attacking_grunt(0);

        let report = *resolve_hit(&mut grunt, &mut player, grunt_strike(), 400, &config)
            .report()
            .unwrap();
        assert_eq!(report.outcome, HitOutcome::Damage);
        assert_eq!(report.amount, 20);
        assert_eq!(player.health.current, 80);
        assert_eq!(report.invincible_until, Some(1400));
        assert!(player.state.is_hit_reacting());
        assert_eq!(player.kinematics.velocity, Vec2::new(-400.0, -400.0));
        assert_eq!(player.tint, StatusTint::HitFlash);

        // invincible: no-op until 1400
        let mut second = attacking_grunt(1000);
        let ignored = resolve_hit(&mut second, &mut player, grunt_strike(), 1399, &config);
        assert_eq!(ignored, Resolution::Ignored(IgnoreReason::DefenderInvincible));
        assert_eq!(player.health.current, 80);

        let landed = resolve_hit(&mut second, &mut player, grunt_strike(), 1400, &config);
        assert_eq!(landed.report().unwrap().amount, 20);
        assert_eq!(player.health.current, 60);
    }

    #[test]
    fn test_grunt_dies_on_third_hit() {
        let config = CombatConfig::default();
        let mut player = combatant(ActorKind::Player, 100.0);
        let mut grunt = combatant(ActorKind::Grunt, 200.0);

        for (hit, now) in [(1u32, 400u64), (2, 1000), (3, 1600)] {
            let report = *resolve_hit(&mut player, &mut grunt, player_strike(), now, &config)
                .report()
                .unwrap();
            assert_eq!(grunt.health.current, 3 - hit);

            if hit < 3 {
                assert!(!report.killed);
                assert_eq!(report.recover_at, Some(now + 500));
                // hit reaction ends before the next swing lands
                grunt.state.recover_from_hit(now);
            } else {
                assert!(report.killed);
                assert_eq!(report.severity, Some(HitSeverity::KillingBlow));
                assert_eq!(report.hit_stop_ms, config.hit_stop.killing_blow_ms);
                assert_eq!(report.score_bonus, config.scoring.grunt_kill);
                assert!(grunt.state.is_dead());
                assert_eq!(grunt.kinematics.velocity, Vec2::ZERO);
            }
        }
    }

    #[test]
    fn test_enemy_hit_guard_while_recovering() {
        let config = CombatConfig::default();
        let mut player = combatant(ActorKind::Player, 100.0);
        let mut grunt = combatant(ActorKind::Grunt, 200.0);

        resolve_hit(&mut player, &mut grunt, player_strike(), 400, &config);
        let again = resolve_hit(&mut player, &mut grunt, player_strike(), 600, &config);
        assert_eq!(again, Resolution::Ignored(IgnoreReason::DefenderRecovering));
        assert_eq!(grunt.health.current, 2);
    }

    #[test]
    fn test_same_swing_hits_once() {
        let config = CombatConfig::default();
        let mut player = combatant(ActorKind::Player, 100.0);
        let mut grunt = combatant(ActorKind::Grunt, 200.0);

        let strike = Strike {
            damage: 1,
            already_struck: true,
        };
        let resolution = resolve_hit(&mut player, &mut grunt, strike, 400, &config);
        assert_eq!(resolution, Resolution::Ignored(IgnoreReason::AlreadyStruck));
        assert_eq!(grunt.health.current, 3);
    }

    #[test]
    fn test_dead_blocking_defender_is_noop() {
        let config = CombatConfig::default();
        let mut player = blocking_player(1000);
        player.health.take_damage(100);
        player.state.kill(1050);
        let mut grunt = attacking_grunt(900);

        let resolution = resolve_hit(&mut grunt, &mut player, grunt_strike(), 1100, &config);
        assert_eq!(resolution, Resolution::Ignored(IgnoreReason::DefenderDead));
        assert!(grunt.state.current_attack().is_some());
    }

    #[test]
    fn test_stunned_enemy_still_takes_damage() {
        let config = CombatConfig::default();
        let mut player = combatant(ActorKind::Player, 100.0);
        let mut boss = combatant(ActorKind::Boss, 200.0);
        boss.state.stun(100);

        let report = *resolve_hit(&mut player, &mut boss, player_strike(), 300, &config)
            .report()
            .unwrap();
        assert_eq!(report.amount, 1);
        assert!(report.defender_change.is_none());
        assert!(boss.state.is_stunned());
        assert_eq!(boss.health.current, 9);
    }

    #[test]
    fn test_health_zero_iff_dead() {
        let config = CombatConfig::default();
        let mut grunt = attacking_grunt(0);
        let mut player = combatant(ActorKind::Player, 100.0);

        let mut now = 400;
        while !player.state.is_dead() {
            resolve_hit(&mut grunt, &mut player, grunt_strike(), now, &config);
            assert_eq!(player.health.current == 0, player.state.is_dead());
            player.state.recover_from_hit(now);
            now += config.invincibility_ms;
        }
        assert_eq!(player.health.current, 0);
    }
}
