// Collision and movement core of a tile platformer
// runs headless on Bevy's FixedUpdate; rendering, audio and input polling
// live in the game that adds this plugin

pub mod characters;
pub mod combat;
pub mod error;
pub mod geometry;
pub mod level;
pub mod map;
pub mod player;

use bevy::prelude::*;

use characters::CharactersPlugin;

pub use characters::config::{Tuning, TuningAssetPlugin};
pub use error::CoreError;
pub use level::{end_level, start_level};

/// Order of work inside one tick. Every actor finishes moving before the
/// contact pass looks at positions.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickSet {
    // despawn last tick's retirees, count down grace periods
    Collect,
    // player, enemies, projectiles
    Behavior,
    // projectiles requested this tick
    Spawn,
    Contacts,
    Outcome,
}

pub struct PlatformerCorePlugin;

impl Plugin for PlatformerCorePlugin {
    fn build(&self, app: &mut App) {
        // constants are authored per tick at 60 ticks per second
        app.insert_resource(Time::<Fixed>::from_hz(60.0))
            .init_resource::<combat::LevelOutcome>()
            .configure_sets(
                FixedUpdate,
                (TickSet::Collect, TickSet::Behavior, TickSet::Spawn, TickSet::Contacts, TickSet::Outcome).chain(),
            )
            .add_plugins(CharactersPlugin)
            .add_systems(FixedUpdate, level::collect_retired.in_set(TickSet::Collect))
            .add_systems(FixedUpdate, combat::resolve_contacts.in_set(TickSet::Contacts))
            .add_systems(FixedUpdate, combat::update_outcome.in_set(TickSet::Outcome));
    }
}
