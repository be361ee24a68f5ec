// Level start and teardown
// turns the spawn tiles of a map into actors and keeps track of who matters
// for the outcome (the player and any bosses)

use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::characters::behavior::BehaviorMachine;
use crate::characters::config::Tuning;
use crate::characters::health::{Collider, Health, Item, Lifecycle};
use crate::characters::movement::{Body, Facing, Intent, Motion};
use crate::characters::npc::{Enemy, EnemyKind};
use crate::combat::LevelOutcome;
use crate::error::CoreError;
use crate::map::tilemap::{TileIndex, TileMap, TileType};
use crate::player::Player;

/// Randomness for enemy fire timers. Seed it for reproducible runs.
#[derive(Resource)]
pub struct LevelRng(pub StdRng);

impl LevelRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for LevelRng {
    fn default() -> Self {
        Self(StdRng::from_os_rng())
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct LevelRoster {
    pub player: Entity,
    pub bosses: Vec<Entity>,
}

/// Everything `start_level` spawned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelSpawns {
    pub player: Option<Entity>,
    pub enemies: Vec<Entity>,
    pub items: Vec<Entity>,
}

const ENEMY_TILES: [(TileType, EnemyKind); 3] = [
    (TileType::WeakSpawn, EnemyKind::Weak),
    (TileType::ScarecrowSpawn, EnemyKind::Scarecrow),
    (TileType::BossSpawn, EnemyKind::Boss),
];

// actors start standing on the bottom edge of their spawn cell
fn standing_position(map: &TileMap, cell: TileIndex, half_height: f32, clearance: f32) -> Vec3 {
    let center = map.world_position_of(cell.col, cell.row);
    Vec3::new(center.x, center.y - map.tile_size() * 0.5 + clearance + half_height, 0.0)
}

/// Tear down any running level, then install `map` and spawn its actors.
/// The current `Tuning` resource (or the defaults) decides their stats.
pub fn start_level(world: &mut World, map: TileMap) -> Result<LevelSpawns, CoreError> {
    let tuning = world.get_resource::<Tuning>().cloned().unwrap_or_default();
    tuning.validate()?;
    let player_cell = map.spawn_points(TileType::PlayerSpawn).next().ok_or(CoreError::MissingPlayerSpawn)?;

    if world.contains_resource::<TileMap>() {
        end_level(world);
    }
    if !world.contains_resource::<LevelRng>() {
        world.insert_resource(LevelRng::default());
    }
    let clearance = tuning.motion.clearance;

    let player_half = tuning.player.half_extents();
    let player = world
        .spawn((
            Player::default(),
            Body::new(standing_position(&map, player_cell, player_half.y, clearance), player_half),
            Motion::facing(Facing::Right),
            BehaviorMachine::default(),
            Intent::default(),
            Health::new(tuning.player.max_hp),
            Collider::new(tuning.player.contact_radius),
            Lifecycle::default(),
        ))
        .id();

    let mut spawns = LevelSpawns { player: Some(player), ..default() };
    let mut bosses = Vec::new();
    for (tile, kind) in ENEMY_TILES {
        let kind_tuning = kind.tuning(&tuning.enemies);
        let half = kind_tuning.half_extents();
        for cell in map.spawn_points(tile) {
            let enemy = {
                let mut rng = world.resource_mut::<LevelRng>();
                Enemy::new(kind, &tuning.enemies, &mut rng.0)
            };
            let entity = world
                .spawn((
                    enemy,
                    Body::new(standing_position(&map, cell, half.y, clearance), half),
                    Motion::facing(Facing::Left),
                    Health::new(kind_tuning.hp),
                    Collider::new(kind_tuning.radius),
                    Lifecycle::default(),
                ))
                .id();
            if kind == EnemyKind::Boss {
                bosses.push(entity);
            }
            spawns.enemies.push(entity);
        }
    }

    let item_half = tuning.item.half_extent;
    for cell in map.spawn_points(TileType::Item) {
        let entity = world
            .spawn((
                Item,
                Body::new(map.world_position_of(cell.col, cell.row), Vec2::splat(item_half)),
                Collider::new(item_half),
                Lifecycle::default(),
            ))
            .id();
        spawns.items.push(entity);
    }

    info!(
        "Level started: {}x{} tiles, {} enemies ({} bosses), {} items",
        map.width(),
        map.height(),
        spawns.enemies.len(),
        bosses.len(),
        spawns.items.len()
    );
    world.insert_resource(map);
    world.insert_resource(LevelRoster { player, bosses });
    world.insert_resource(LevelOutcome::Playing);
    Ok(spawns)
}

/// Despawn every actor and drop the map. Safe to call with no level running.
pub fn end_level(world: &mut World) {
    let actors: Vec<Entity> = world.query_filtered::<Entity, With<Lifecycle>>().iter(world).collect();
    let count = actors.len();
    for entity in actors {
        world.despawn(entity);
    }
    world.remove_resource::<TileMap>();
    world.remove_resource::<LevelRoster>();
    world.insert_resource(LevelOutcome::Playing);
    info!("Level ended, {} actors removed", count);
}

// despawns whatever retired during the previous tick
pub fn collect_retired(mut commands: Commands, actors: Query<(Entity, &Lifecycle)>) {
    for (entity, lifecycle) in actors.iter() {
        if !lifecycle.alive {
            commands.entity(entity).despawn();
        }
    }
}
