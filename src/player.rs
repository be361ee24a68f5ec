// Player step
// one call per tick: pending behavior change, behavior update, phase timer,
// turn animation

use bevy::prelude::*;

use crate::characters::behavior::{AttackPhase, Behavior, BehaviorMachine, Trigger};
use crate::characters::config::Tuning;
use crate::characters::events::{ActorEvent, GameplayEvent, flush_events};
use crate::characters::health::Lifecycle;
use crate::characters::movement::{Body, Intent, Motion, apply_gravity, drive, integrate};
use crate::map::collision::CollisionResolver;
use crate::map::tilemap::TileMap;

// THE PLAYER MARKER
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Player {
    pub score: u32,
}

pub fn advance_player(
    body: &mut Body,
    motion: &mut Motion,
    machine: &mut BehaviorMachine,
    intent: &mut Intent,
    resolver: &CollisionResolver,
    tuning: &Tuning,
    events: &mut Vec<ActorEvent>,
) {
    // requests made last tick take effect before anything moves
    match machine.apply_request() {
        Some(Behavior::Melee(_)) => body.velocity = Vec3::ZERO,
        Some(Behavior::Ranged) => {
            body.velocity = Vec3::ZERO;
            events.push(ActorEvent::ShotFired { origin: body.position, facing: motion.facing, hostile: false });
        }
        Some(Behavior::Normal) | None => {}
    }

    match machine.state() {
        Behavior::Normal => {
            drive(body, motion, intent, &tuning.motion, events);
            integrate(body, motion, resolver, &tuning.motion, events);
            if intent.attack {
                machine.fire(Trigger::Attack, motion.grounded);
            }
            if intent.special {
                machine.fire(Trigger::Special, motion.grounded);
            }
        }
        Behavior::Melee(phase) => {
            // only the action phase moves, and the lunge still goes through the map
            let lunge = if phase == AttackPhase::Action { motion.facing.sign() * tuning.attack.lunge_speed } else { 0.0 };
            body.velocity = Vec3::new(lunge, 0.0, 0.0);
            integrate(body, motion, resolver, &tuning.motion, events);
        }
        Behavior::Ranged => {
            body.velocity.x = 0.0;
            if !motion.grounded {
                apply_gravity(body, tuning.motion.gravity, tuning.motion.fall_limit);
            }
            integrate(body, motion, resolver, &tuning.motion, events);
        }
    }

    machine.advance(&tuning.attack);
    motion.turn.tick(motion.facing, tuning.motion.turn_time, tuning.seconds_per_tick());
    intent.clear_edges();
}

pub fn advance_players(
    map: Option<Res<TileMap>>,
    tuning: Res<Tuning>,
    mut players: Query<
        (Entity, &mut Body, &mut Motion, &mut BehaviorMachine, &mut Intent, &Lifecycle),
        With<Player>,
    >,
    mut writer: MessageWriter<GameplayEvent>,
) {
    let Some(map) = map else { return; };
    let resolver = CollisionResolver::new(&map, tuning.motion.clearance);
    let mut events = Vec::new();

    for (entity, mut body, mut motion, mut machine, mut intent, lifecycle) in players.iter_mut() {
        if !lifecycle.alive {
            continue;
        }
        advance_player(&mut body, &mut motion, &mut machine, &mut intent, &resolver, &tuning, &mut events);
        flush_events(entity, &mut events, &mut writer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Rig {
        map: TileMap,
        tuning: Tuning,
        body: Body,
        motion: Motion,
        machine: BehaviorMachine,
    }

    impl Rig {
        fn new() -> Self {
            let tuning = Tuning::default();
            let map = TileMap::from_ascii(&format!("{}\n{}\n{}", ".".repeat(40), ".".repeat(40), "#".repeat(40)), 1.0)
                .unwrap();
            let y = 0.5 + tuning.motion.clearance + 0.4;
            Self {
                map,
                body: Body::new(Vec3::new(5.0, y, 0.0), tuning.player.half_extents()),
                tuning,
                motion: Motion::default(),
                machine: BehaviorMachine::default(),
            }
        }

        fn tick(&mut self, mut intent: Intent) -> Vec<ActorEvent> {
            let resolver = CollisionResolver::new(&self.map, self.tuning.motion.clearance);
            let mut events = Vec::new();
            advance_player(
                &mut self.body,
                &mut self.motion,
                &mut self.machine,
                &mut intent,
                &resolver,
                &self.tuning,
                &mut events,
            );
            events
        }
    }

    #[test]
    fn melee_returns_to_normal_on_tick_twenty_five() {
        let mut rig = Rig::new();
        rig.tick(Intent { attack: true, ..default() });
        assert_eq!(rig.machine.state(), Behavior::Normal);

        for tick in 1..=24 {
            rig.tick(Intent::default());
            assert!(matches!(rig.machine.state(), Behavior::Melee(_)), "left melee early on tick {tick}");
        }
        assert_eq!(rig.machine.state(), Behavior::Melee(AttackPhase::Recovery));
        rig.tick(Intent::default());
        assert_eq!(rig.machine.state(), Behavior::Normal);
    }

    #[test]
    fn attack_input_during_attack_is_ignored() {
        let mut rig = Rig::new();
        rig.tick(Intent { attack: true, ..default() });
        for _ in 0..10 {
            rig.tick(Intent { attack: true, special: true, ..default() });
            assert_eq!(rig.machine.pending(), None);
        }
    }

    #[test]
    fn lunge_moves_only_during_action() {
        let mut rig = Rig::new();
        rig.tick(Intent { attack: true, ..default() });
        let start = rig.body.position.x;
        for _ in 0..8 {
            rig.tick(Intent::default());
        }
        assert_eq!(rig.body.position.x, start);
        assert!(rig.machine.is_striking());
        for _ in 0..5 {
            rig.tick(Intent::default());
        }
        let lunged = rig.body.position.x;
        assert!((lunged - start - 5.0 * rig.tuning.attack.lunge_speed).abs() < 1e-4);
        for _ in 0..12 {
            rig.tick(Intent::default());
        }
        assert_eq!(rig.body.position.x, lunged);
        assert!(rig.motion.grounded);
    }

    #[test]
    fn melee_in_the_air_is_refused() {
        let mut rig = Rig::new();
        rig.tick(Intent { jump: true, ..default() });
        assert!(!rig.motion.grounded);
        rig.tick(Intent { attack: true, ..default() });
        rig.tick(Intent::default());
        assert_eq!(rig.machine.state(), Behavior::Normal);
    }

    #[test]
    fn ranged_fires_once_and_lasts_twenty_ticks() {
        let mut rig = Rig::new();
        rig.body.velocity.x = 0.2;
        rig.tick(Intent { special: true, ..default() });

        let mut shots = 0;
        let mut ticks = 0;
        loop {
            let events = rig.tick(Intent::default());
            shots += events.iter().filter(|e| matches!(e, ActorEvent::ShotFired { hostile: false, .. })).count();
            ticks += 1;
            if rig.machine.state() == Behavior::Normal {
                break;
            }
            assert_eq!(rig.body.velocity.x, 0.0);
        }
        assert_eq!(ticks, rig.tuning.attack.ranged_ticks);
        assert_eq!(shots, 1);
    }
}
