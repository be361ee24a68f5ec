// Movement System
// velocity from intent, then the swept resolver, then the ground/wall flags
// the step functions are plain functions over components so the player, the
// enemies and the tests all share them

use std::f32::consts::{FRAC_PI_2, PI};

use bevy::prelude::*;

use crate::characters::config::MotionTuning;
use crate::characters::events::ActorEvent;
use crate::geometry::{Aabb, ease_in_out_lerp};
use crate::map::collision::{CollisionResolver, MapContact};

/// Position, velocity and footprint of anything that moves through the map.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub position: Vec3,
    pub velocity: Vec3,
    pub half_extents: Vec2,
}

impl Body {
    pub fn new(position: Vec3, half_extents: Vec2) -> Self {
        Self { position, velocity: Vec3::ZERO, half_extents }
    }

    /// Depth uses the width so boxes stay cubes for the contact pass.
    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.position, self.half_extents.extend(self.half_extents.x))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    #[default]
    Right,
    Left,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Right => 1.0,
            Facing::Left => -1.0,
        }
    }

    // yaw the model is rotated to when facing this way
    pub fn target_angle(self) -> f32 {
        match self {
            Facing::Right => FRAC_PI_2,
            Facing::Left => PI * 1.5,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Facing::Right => Facing::Left,
            Facing::Left => Facing::Right,
        }
    }
}

/// Cosmetic eased rotation between facings. Never feeds back into physics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnAnimation {
    pub angle: f32,
    pub start_angle: f32,
    // seconds left
    pub timer: f32,
}

impl TurnAnimation {
    pub fn facing(facing: Facing) -> Self {
        let angle = facing.target_angle();
        Self { angle, start_angle: angle, timer: 0.0 }
    }

    pub fn begin(&mut self, turn_time: f32) {
        self.start_angle = self.angle;
        self.timer = turn_time;
    }

    pub fn tick(&mut self, facing: Facing, turn_time: f32, dt: f32) {
        if self.timer <= 0.0 {
            return;
        }
        self.timer = (self.timer - dt).max(0.0);
        // timer runs down, so the curve goes from the target back to the start
        self.angle = ease_in_out_lerp(facing.target_angle(), self.start_angle, self.timer / turn_time);
    }

    pub fn is_turning(&self) -> bool {
        self.timer > 0.0
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub grounded: bool,
    pub hovering: bool,
    pub on_wall: bool,
    pub facing: Facing,
    pub turn: TurnAnimation,
}

impl Default for Motion {
    fn default() -> Self {
        Self::facing(Facing::Right)
    }
}

impl Motion {
    pub fn facing(facing: Facing) -> Self {
        Self { grounded: true, hovering: false, on_wall: false, facing, turn: TurnAnimation::facing(facing) }
    }

    /// Change facing and start the turn animation. Returns true if it flipped.
    pub fn face(&mut self, facing: Facing, turn_time: f32) -> bool {
        if self.facing == facing {
            return false;
        }
        self.facing = facing;
        self.turn.begin(turn_time);
        true
    }
}

/// What the controller (keyboard, gamepad or AI) asks for this tick.
/// `jump` is held; `jump_pressed`, `attack` and `special` are edges and are
/// cleared once the tick has read them.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Intent {
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
    pub jump_pressed: bool,
    pub attack: bool,
    pub special: bool,
}

impl Intent {
    // right wins when both are held
    pub fn direction(&self) -> Option<Facing> {
        if self.move_right {
            Some(Facing::Right)
        } else if self.move_left {
            Some(Facing::Left)
        } else {
            None
        }
    }

    pub fn clear_edges(&mut self) {
        self.jump_pressed = false;
        self.attack = false;
        self.special = false;
    }
}

/// Turn intent into velocity for an actor in free control.
pub fn drive(body: &mut Body, motion: &mut Motion, intent: &Intent, tuning: &MotionTuning, events: &mut Vec<ActorEvent>) {
    if motion.grounded {
        drive_ground(body, motion, intent, tuning, events);
    } else {
        drive_air(body, motion, intent, tuning);
    }
}

fn drive_ground(body: &mut Body, motion: &mut Motion, intent: &Intent, tuning: &MotionTuning, events: &mut Vec<ActorEvent>) {
    motion.hovering = false;

    if let Some(direction) = intent.direction() {
        let flipped = motion.face(direction, tuning.turn_time);
        // skid: one burst of braking on the tick the stick reverses
        if flipped && body.velocity.x * direction.sign() < 0.0 {
            body.velocity.x *= 1.0 - tuning.attenuation;
        }
        body.velocity.x += direction.sign() * tuning.acceleration;
        body.velocity.x = body.velocity.x.clamp(-tuning.run_limit, tuning.run_limit);
    } else {
        body.velocity.x *= 1.0 - tuning.attenuation;
    }

    if body.velocity.x.abs() <= tuning.snap_threshold {
        body.velocity.x = 0.0;
    }

    if intent.jump {
        body.velocity.y += tuning.jump_impulse;
        events.push(ActorEvent::Jumped(body.position));
        debug!("Jump at {:?}", body.position);
    }
}

fn drive_air(body: &mut Body, motion: &mut Motion, intent: &Intent, tuning: &MotionTuning) {
    if tuning.hover_enabled && intent.jump_pressed {
        body.velocity.y = (body.velocity.y + tuning.hover_impulse).min(tuning.hover_rise_limit);
        motion.hovering = true;
    } else {
        let limit = if motion.hovering { tuning.hover_fall_limit } else { tuning.fall_limit };
        apply_gravity(body, tuning.gravity, limit);
    }

    if let Some(direction) = intent.direction() {
        motion.face(direction, tuning.turn_time);
        body.velocity.x += direction.sign() * tuning.air_acceleration;
    }
    body.velocity.x = body.velocity.x.clamp(-tuning.air_limit, tuning.air_limit);
    body.velocity.x *= 1.0 - tuning.air_attenuation;
}

pub fn apply_gravity(body: &mut Body, gravity: f32, fall_limit: f32) {
    body.velocity.y = (body.velocity.y - gravity).max(-fall_limit);
}

/// Move by the velocity through the resolver and react to what was hit.
pub fn integrate(
    body: &mut Body,
    motion: &mut Motion,
    resolver: &CollisionResolver,
    tuning: &MotionTuning,
    events: &mut Vec<ActorEvent>,
) -> MapContact {
    let resolved = resolver.resolve(body.position, body.half_extents, body.velocity);
    body.position += resolved.displacement;
    let contact = resolved.contact;

    if contact.ceiling && body.velocity.y > 0.0 {
        body.velocity.y = 0.0;
    }
    if contact.wall {
        body.velocity.x *= 1.0 - tuning.wall_attenuation;
        if !motion.on_wall {
            events.push(ActorEvent::WallHit(body.position));
        }
    }
    motion.on_wall = contact.wall;

    update_ground(body, motion, contact, resolver, tuning, events);
    contact
}

/// Grounded/airborne is derived, never requested: leaving needs upward
/// velocity or a failed probe, arriving needs the landing flag.
pub fn update_ground(
    body: &mut Body,
    motion: &mut Motion,
    contact: MapContact,
    resolver: &CollisionResolver,
    tuning: &MotionTuning,
    events: &mut Vec<ActorEvent>,
) {
    if motion.grounded {
        if body.velocity.y > 0.0 || !resolver.is_supported(body.position, body.half_extents, tuning.ground_probe) {
            motion.grounded = false;
        } else {
            body.velocity.y = 0.0;
        }
    } else if contact.landing {
        motion.grounded = true;
        motion.hovering = false;
        body.velocity.y = 0.0;
        body.velocity.x *= 1.0 - tuning.landing_attenuation;
        events.push(ActorEvent::Landed(body.position));
        debug!("Landed at {:?}", body.position);
    }
}
