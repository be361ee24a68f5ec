// Beams fired by the player's ranged attack and by bosses
// straight line, no gravity, gone on the first solid tile or when their life runs out

use bevy::prelude::*;

use crate::characters::config::Tuning;
use crate::characters::events::{ActorEvent, GameplayEvent};
use crate::characters::health::{Collider, Lifecycle};
use crate::characters::movement::{Body, Facing};
use crate::map::tilemap::TileMap;

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projectile {
    // hostile beams hit the player, friendly ones hit enemies
    pub hostile: bool,
    pub life_ticks: u32,
}

pub fn projectile_bundle(origin: Vec3, facing: Facing, hostile: bool, tuning: &Tuning) -> impl Bundle {
    let radius = tuning.projectile.radius;
    let mut body = Body::new(origin, Vec2::splat(radius));
    body.velocity = Vec3::new(facing.sign() * tuning.projectile.speed, 0.0, 0.0);
    (
        Projectile { hostile, life_ticks: tuning.projectile.life_ticks },
        body,
        Collider::new(radius),
        Lifecycle::default(),
    )
}

/// Beams do not go through the resolver; they simply stop existing inside walls.
pub fn advance_projectile(body: &mut Body, projectile: &mut Projectile, lifecycle: &mut Lifecycle, map: &TileMap) {
    body.position += body.velocity;
    projectile.life_ticks = projectile.life_ticks.saturating_sub(1);

    let cell = map.index_of(body.position);
    if projectile.life_ticks == 0 || map.is_solid(cell.col, cell.row) {
        lifecycle.retire();
    }
}

pub fn advance_projectiles(
    map: Option<Res<TileMap>>,
    mut projectiles: Query<(&mut Body, &mut Projectile, &mut Lifecycle)>,
) {
    let Some(map) = map else { return; };
    for (mut body, mut projectile, mut lifecycle) in projectiles.iter_mut() {
        if lifecycle.alive {
            advance_projectile(&mut body, &mut projectile, &mut lifecycle, &map);
        }
    }
}

// turns ShotFired messages from this tick into projectile entities
pub fn spawn_projectiles(
    mut commands: Commands,
    tuning: Res<Tuning>,
    mut shots: MessageReader<GameplayEvent>,
) {
    for message in shots.read() {
        if let ActorEvent::ShotFired { origin, facing, hostile } = message.event {
            commands.spawn(projectile_bundle(origin, facing, hostile, &tuning));
            debug!("Projectile spawned at {:?} (hostile: {})", origin, hostile);
        }
    }
}
