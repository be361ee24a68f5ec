// characters/config.rs
// every gameplay constant in one place, loadable from a .tuning.ron asset
// the defaults are the values the game shipped with, authored for 60 ticks per second
use bevy::prelude::*;
use bevy_common_assets::ron::RonAssetPlugin;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Per-tick motion constants. Accelerations are already divided by the tick
/// rate, so they are added to the velocity once per tick as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionTuning {
    pub tick_rate: f32,
    pub acceleration: f32,
    pub attenuation: f32,
    pub run_limit: f32,
    pub jump_impulse: f32,
    pub gravity: f32,
    pub fall_limit: f32,
    pub landing_attenuation: f32,
    pub wall_attenuation: f32,
    pub air_acceleration: f32,
    pub air_limit: f32,
    pub air_attenuation: f32,
    pub hover_enabled: bool,
    pub hover_impulse: f32,
    pub hover_rise_limit: f32,
    pub hover_fall_limit: f32,
    pub snap_threshold: f32,
    // seconds
    pub turn_time: f32,
    pub clearance: f32,
    pub ground_probe: f32,
}

impl Default for MotionTuning {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            acceleration: 0.1 / 60.0,
            attenuation: 0.05,
            run_limit: 0.3,
            jump_impulse: 20.0 / 60.0,
            gravity: 0.98 / 60.0,
            fall_limit: 0.5,
            landing_attenuation: 0.0,
            wall_attenuation: 0.2,
            air_acceleration: 0.05 / 60.0,
            air_limit: 0.21,
            air_attenuation: 0.02,
            hover_enabled: true,
            hover_impulse: 25.0 / 60.0,
            hover_rise_limit: 20.0 / 60.0,
            hover_fall_limit: 0.1,
            snap_threshold: 1e-4,
            turn_time: 0.3,
            clearance: 0.04,
            ground_probe: 0.06,
        }
    }
}

/// Attack phase lengths are in ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackTuning {
    pub anticipation_ticks: u32,
    pub action_ticks: u32,
    pub recovery_ticks: u32,
    pub ranged_ticks: u32,
    pub lunge_speed: f32,
    pub melee_damage: i32,
}

impl Default for AttackTuning {
    fn default() -> Self {
        Self {
            anticipation_ticks: 8,
            action_ticks: 5,
            recovery_ticks: 12,
            ranged_ticks: 20,
            lunge_speed: 0.8,
            melee_damage: 3,
        }
    }
}

impl AttackTuning {
    pub fn melee_ticks(&self) -> u32 {
        self.anticipation_ticks + self.action_ticks + self.recovery_ticks
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub max_hp: i32,
    // ticks of collision immunity after taking a hit
    pub grace_ticks: u32,
    pub half_extents: (f32, f32),
    pub contact_radius: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self { max_hp: 3, grace_ticks: 60, half_extents: (0.4, 0.4), contact_radius: 0.4 }
    }
}

impl PlayerTuning {
    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.half_extents.0, self.half_extents.1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyKindTuning {
    pub hp: i32,
    pub walk_speed: f32,
    pub half_extents: (f32, f32),
    pub radius: f32,
    pub fires: bool,
}

impl Default for EnemyKindTuning {
    fn default() -> Self {
        Self { hp: 1, walk_speed: 0.02, half_extents: (0.4, 0.4), radius: 1.0, fires: false }
    }
}

impl EnemyKindTuning {
    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.half_extents.0, self.half_extents.1)
    }
}

/// Fire cadence is `base + random(0..spread)` ticks, with a longer spread
/// before the first shot so bosses placed together do not fire in unison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    pub weak: EnemyKindTuning,
    pub scarecrow: EnemyKindTuning,
    pub boss: EnemyKindTuning,
    pub contact_damage: i32,
    // seconds
    pub defeated_time: f32,
    pub first_fire_base: u32,
    pub first_fire_spread: u32,
    pub refire_base: u32,
    pub refire_spread: u32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            weak: EnemyKindTuning::default(),
            scarecrow: EnemyKindTuning {
                hp: 9999,
                walk_speed: 0.0,
                half_extents: (0.6, 0.6),
                ..default()
            },
            boss: EnemyKindTuning {
                hp: 10,
                walk_speed: 0.01,
                half_extents: (0.8, 0.8),
                radius: 1.6,
                fires: true,
            },
            contact_damage: 1,
            defeated_time: 0.6,
            first_fire_base: 120,
            first_fire_spread: 180,
            refire_base: 120,
            refire_spread: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    pub speed: f32,
    pub radius: f32,
    pub life_ticks: u32,
    pub damage: i32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self { speed: 0.5, radius: 0.5, life_ticks: 120, damage: 1 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemTuning {
    pub half_extent: f32,
    pub heal: i32,
    pub score: u32,
}

impl Default for ItemTuning {
    fn default() -> Self {
        Self { half_extent: 0.5, heal: 1, score: 100 }
    }
}

// Resource - what the systems read every tick
// Asset + TypePath - lets RonAssetPlugin load it from a .tuning.ron file
#[derive(Resource, Asset, TypePath, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub motion: MotionTuning,
    pub attack: AttackTuning,
    pub player: PlayerTuning,
    pub enemies: EnemyTuning,
    pub projectile: ProjectileTuning,
    pub item: ItemTuning,
}

impl Tuning {
    /// Parse and validate RON text. Missing fields keep their defaults.
    pub fn from_ron_str(text: &str) -> Result<Self, CoreError> {
        let tuning: Tuning = ron::from_str(text)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        let m = &self.motion;
        let positive = [
            ("motion.tick_rate", m.tick_rate),
            ("motion.run_limit", m.run_limit),
            ("motion.fall_limit", m.fall_limit),
            ("motion.air_limit", m.air_limit),
            ("motion.hover_fall_limit", m.hover_fall_limit),
            ("motion.turn_time", m.turn_time),
            ("player.half_extents.0", self.player.half_extents.0),
            ("player.half_extents.1", self.player.half_extents.1),
            ("player.contact_radius", self.player.contact_radius),
            ("projectile.radius", self.projectile.radius),
            ("item.half_extent", self.item.half_extent),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(CoreError::InvalidTuning(format!("{name} must be positive, got {value}")));
            }
        }

        let non_negative = [
            ("motion.acceleration", m.acceleration),
            ("motion.jump_impulse", m.jump_impulse),
            ("motion.gravity", m.gravity),
            ("motion.air_acceleration", m.air_acceleration),
            ("motion.hover_impulse", m.hover_impulse),
            ("motion.hover_rise_limit", m.hover_rise_limit),
            ("motion.snap_threshold", m.snap_threshold),
            ("motion.clearance", m.clearance),
            ("motion.ground_probe", m.ground_probe),
            ("attack.lunge_speed", self.attack.lunge_speed),
            ("enemies.defeated_time", self.enemies.defeated_time),
            ("projectile.speed", self.projectile.speed),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(CoreError::InvalidTuning(format!("{name} must not be negative, got {value}")));
            }
        }

        let fractions = [
            ("motion.attenuation", m.attenuation),
            ("motion.landing_attenuation", m.landing_attenuation),
            ("motion.wall_attenuation", m.wall_attenuation),
            ("motion.air_attenuation", m.air_attenuation),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(CoreError::InvalidTuning(format!("{name} must be within 0..=1, got {value}")));
            }
        }

        let phases = [
            ("attack.anticipation_ticks", self.attack.anticipation_ticks),
            ("attack.action_ticks", self.attack.action_ticks),
            ("attack.recovery_ticks", self.attack.recovery_ticks),
            ("attack.ranged_ticks", self.attack.ranged_ticks),
            ("projectile.life_ticks", self.projectile.life_ticks),
        ];
        for (name, ticks) in phases {
            if ticks == 0 {
                return Err(CoreError::InvalidTuning(format!("{name} must be at least one tick")));
            }
        }

        for (name, kind) in [
            ("weak", &self.enemies.weak),
            ("scarecrow", &self.enemies.scarecrow),
            ("boss", &self.enemies.boss),
        ] {
            if kind.hp <= 0 {
                return Err(CoreError::InvalidTuning(format!("enemies.{name}.hp must be positive")));
            }
            let (hw, hh) = kind.half_extents;
            if !(hw > 0.0 && hh > 0.0 && kind.radius > 0.0 && kind.walk_speed.is_finite()) {
                return Err(CoreError::InvalidTuning(format!("enemies.{name} has a degenerate footprint")));
            }
        }
        if self.player.max_hp <= 0 {
            return Err(CoreError::InvalidTuning("player.max_hp must be positive".into()));
        }
        Ok(())
    }

    /// Convert a duration in seconds to whole ticks, at least one.
    pub fn ticks(&self, seconds: f32) -> u32 {
        ((seconds * self.motion.tick_rate).round() as u32).max(1)
    }

    pub fn seconds_per_tick(&self) -> f32 {
        1.0 / self.motion.tick_rate
    }
}

/// Loads a `.tuning.ron` file through the asset server and swaps it into the
/// `Tuning` resource once it arrives. Headless setups skip this plugin and
/// keep the defaults (or insert their own `Tuning`).
pub struct TuningAssetPlugin {
    pub path: String,
}

impl Default for TuningAssetPlugin {
    fn default() -> Self {
        Self { path: "default.tuning.ron".into() }
    }
}

#[derive(Resource)]
struct TuningPath(String);

// keeps the handle alive until the asset has been applied
#[derive(Resource)]
pub struct TuningSource {
    pub handle: Handle<Tuning>,
    pub applied: bool,
}

impl Plugin for TuningAssetPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(RonAssetPlugin::<Tuning>::new(&["tuning.ron"]))
            .insert_resource(TuningPath(self.path.clone()))
            .add_systems(Startup, request_tuning)
            .add_systems(Update, apply_loaded_tuning);
    }
}

fn request_tuning(mut commands: Commands, asset_server: Res<AssetServer>, path: Res<TuningPath>) {
    let handle = asset_server.load(path.0.clone());
    commands.insert_resource(TuningSource { handle, applied: false });
}

pub fn apply_loaded_tuning(
    source: Option<ResMut<TuningSource>>,
    assets: Res<Assets<Tuning>>,
    mut tuning: ResMut<Tuning>,
) {
    let Some(mut source) = source else {
        return;
    };
    if source.applied {
        return;
    }
    let Some(loaded) = assets.get(&source.handle) else {
        return;
    };

    source.applied = true;
    match loaded.validate() {
        Ok(()) => {
            *tuning = loaded.clone();
            info!("Tuning asset applied");
        }
        Err(err) => warn!("Tuning asset rejected, keeping previous values: {err}"),
    }
}
