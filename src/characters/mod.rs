// actors: how they move, what they are doing, and what they can take
pub mod behavior;
pub mod config;
pub mod events;
pub mod movement;

// enemies, beams, hit points
pub mod npc;
pub mod health;
pub mod projectile;

use bevy::prelude::*;

use crate::TickSet;

pub struct CharactersPlugin;

impl Plugin for CharactersPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<config::Tuning>()
            .init_resource::<crate::level::LevelRng>()
            .add_message::<events::GameplayEvent>()
            // grace periods count down before anyone moves
            .add_systems(FixedUpdate, health::tick_colliders.in_set(TickSet::Collect))
            .add_systems(
                FixedUpdate,
                (
                    crate::player::advance_players,
                    npc::advance_enemies,
                    projectile::advance_projectiles,
                )
                    .chain()
                    .in_set(TickSet::Behavior),
            )
            .add_systems(FixedUpdate, projectile::spawn_projectiles.in_set(TickSet::Spawn));
    }
}
