// NPC enemies
// walk until hit by a wall, fall under gravity, and (bosses only) fire beams
// on a randomized timer. Defeat is requested by the contact pass and applied
// at the top of the enemy's next tick, same as the player's behavior changes.

use bevy::prelude::*;
use rand::Rng;

use crate::characters::config::{EnemyKindTuning, EnemyTuning, Tuning};
use crate::characters::events::{ActorEvent, GameplayEvent, flush_events};
use crate::characters::health::Lifecycle;
use crate::characters::movement::{Body, Motion, apply_gravity, integrate};
use crate::level::LevelRng;
use crate::map::collision::CollisionResolver;
use crate::map::tilemap::TileMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Weak,
    // training dummy, never moves
    Scarecrow,
    Boss,
}

impl EnemyKind {
    pub fn tuning(self, enemies: &EnemyTuning) -> &EnemyKindTuning {
        match self {
            EnemyKind::Weak => &enemies.weak,
            EnemyKind::Scarecrow => &enemies.scarecrow,
            EnemyKind::Boss => &enemies.boss,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnemyBehavior {
    #[default]
    Walk,
    Defeated,
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enemy {
    pub kind: EnemyKind,
    behavior: EnemyBehavior,
    request: Option<EnemyBehavior>,
    defeated_ticks: u32,
    fire_timer: u32,
}

impl Enemy {
    pub fn new(kind: EnemyKind, enemies: &EnemyTuning, rng: &mut impl Rng) -> Self {
        Self {
            kind,
            behavior: EnemyBehavior::Walk,
            request: None,
            defeated_ticks: 0,
            fire_timer: roll(rng, enemies.first_fire_base, enemies.first_fire_spread),
        }
    }

    pub fn behavior(&self) -> EnemyBehavior {
        self.behavior
    }

    pub fn is_defeated(&self) -> bool {
        self.behavior == EnemyBehavior::Defeated || self.request == Some(EnemyBehavior::Defeated)
    }

    pub fn request_defeat(&mut self) {
        if self.behavior != EnemyBehavior::Defeated {
            self.request = Some(EnemyBehavior::Defeated);
        }
    }

    pub fn fire_timer(&self) -> u32 {
        self.fire_timer
    }
}

fn roll(rng: &mut impl Rng, base: u32, spread: u32) -> u32 {
    if spread == 0 {
        return base.max(1);
    }
    (base + rng.random_range(0..spread)).max(1)
}

pub fn advance_enemy(
    body: &mut Body,
    motion: &mut Motion,
    enemy: &mut Enemy,
    lifecycle: &mut Lifecycle,
    resolver: &CollisionResolver,
    tuning: &Tuning,
    rng: &mut impl Rng,
    events: &mut Vec<ActorEvent>,
) {
    if let Some(next) = enemy.request.take() {
        enemy.behavior = next;
        if next == EnemyBehavior::Defeated {
            body.velocity = Vec3::ZERO;
            enemy.defeated_ticks = tuning.ticks(tuning.enemies.defeated_time);
            events.push(ActorEvent::EnemyDefeated(body.position));
            info!("{:?} enemy defeated at {:?}", enemy.kind, body.position);
        }
    }

    match enemy.behavior {
        EnemyBehavior::Walk => {
            let kind = enemy.kind.tuning(&tuning.enemies);
            body.velocity.x = motion.facing.sign() * kind.walk_speed;
            if !motion.grounded {
                apply_gravity(body, tuning.motion.gravity, tuning.motion.fall_limit);
            }
            let contact = integrate(body, motion, resolver, &tuning.motion, events);
            if contact.wall {
                motion.face(motion.facing.flipped(), tuning.motion.turn_time);
            }

            if kind.fires {
                enemy.fire_timer = enemy.fire_timer.saturating_sub(1);
                if enemy.fire_timer == 0 {
                    events.push(ActorEvent::ShotFired { origin: body.position, facing: motion.facing, hostile: true });
                    enemy.fire_timer = roll(rng, tuning.enemies.refire_base, tuning.enemies.refire_spread);
                }
            }
        }
        EnemyBehavior::Defeated => {
            enemy.defeated_ticks = enemy.defeated_ticks.saturating_sub(1);
            if enemy.defeated_ticks == 0 {
                lifecycle.retire();
            }
        }
    }

    motion.turn.tick(motion.facing, tuning.motion.turn_time, tuning.seconds_per_tick());
}

pub fn advance_enemies(
    map: Option<Res<TileMap>>,
    tuning: Res<Tuning>,
    mut rng: ResMut<LevelRng>,
    mut enemies: Query<(Entity, &mut Body, &mut Motion, &mut Enemy, &mut Lifecycle)>,
    mut writer: MessageWriter<GameplayEvent>,
) {
    let Some(map) = map else { return; };
    let resolver = CollisionResolver::new(&map, tuning.motion.clearance);
    let mut events = Vec::new();

    for (entity, mut body, mut motion, mut enemy, mut lifecycle) in enemies.iter_mut() {
        if !lifecycle.alive {
            continue;
        }
        advance_enemy(
            &mut body,
            &mut motion,
            &mut enemy,
            &mut lifecycle,
            &resolver,
            &tuning,
            &mut rng.0,
            &mut events,
        );
        flush_events(entity, &mut events, &mut writer);
    }
}
