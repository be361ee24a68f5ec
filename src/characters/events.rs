// Gameplay notifications for cosmetic systems (particles, sounds, camera shake)
// the core only writes them, nothing inside it reacts to its own messages
// except the projectile spawner

use bevy::prelude::*;

use crate::characters::movement::Facing;

/// Something worth showing happened to an actor. Positions are world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActorEvent {
    Jumped(Vec3),
    Landed(Vec3),
    WallHit(Vec3),
    ShotFired { origin: Vec3, facing: Facing, hostile: bool },
    EnemyDefeated(Vec3),
    ItemCollected(Vec3),
    Hurt { position: Vec3, hp: i32 },
    Died(Vec3),
}

#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct GameplayEvent {
    pub source: Entity,
    pub event: ActorEvent,
}

/// Actor step functions push into a plain buffer; the owning system drains
/// it into the message queue tagged with the actor's entity.
pub fn flush_events(source: Entity, buffer: &mut Vec<ActorEvent>, writer: &mut MessageWriter<GameplayEvent>) {
    for event in buffer.drain(..) {
        writer.write(GameplayEvent { source, event });
    }
}
