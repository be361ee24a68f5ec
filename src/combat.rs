// Combat: the entity-vs-entity contact pass and the level outcome
// detection runs on a snapshot taken after every actor has moved, then the
// callbacks apply one contact at a time, so a callback never starts another pass

use bevy::prelude::*;

use crate::characters::behavior::BehaviorMachine;
use crate::characters::config::Tuning;
use crate::characters::events::{ActorEvent, GameplayEvent};
use crate::characters::health::{Collider, Health, Item, Lifecycle};
use crate::characters::movement::Body;
use crate::characters::npc::Enemy;
use crate::characters::projectile::Projectile;
use crate::geometry::{Aabb, spheres_overlap};
use crate::level::LevelRoster;
use crate::player::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Player,
    Enemy,
    Item,
    Projectile { hostile: bool },
}

/// Snapshot of one actor for the contact pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Participant {
    pub entity: Entity,
    pub role: Role,
    pub aabb: Aabb,
    pub center: Vec3,
    pub radius: f32,
    pub enabled: bool,
    // player in the action phase of a melee attack
    pub striking: bool,
}

/// Indices into the participant slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    PlayerEnemy { player: usize, enemy: usize },
    PlayerItem { player: usize, item: usize },
    ProjectileHit { projectile: usize, target: usize },
}

/// Box tests for player/enemy and player/item, sphere tests for beams. A pair
/// is only reported when both colliders are enabled, and each beam reports
/// at most one target.
pub fn find_contacts(participants: &[Participant]) -> Vec<Contact> {
    let mut contacts = Vec::new();
    let mut item_taken = vec![false; participants.len()];

    let with_role = |role: Role| {
        participants
            .iter()
            .enumerate()
            .filter(move |(_, p)| p.enabled && p.role == role)
            .map(|(i, _)| i)
    };

    for player in with_role(Role::Player) {
        let aabb = participants[player].aabb;
        for enemy in with_role(Role::Enemy) {
            if aabb.intersects(&participants[enemy].aabb) {
                contacts.push(Contact::PlayerEnemy { player, enemy });
            }
        }
        for item in with_role(Role::Item) {
            if !item_taken[item] && aabb.intersects(&participants[item].aabb) {
                item_taken[item] = true;
                contacts.push(Contact::PlayerItem { player, item });
            }
        }
    }

    for (projectile, beam) in participants.iter().enumerate() {
        let Role::Projectile { hostile } = beam.role else { continue; };
        if !beam.enabled {
            continue;
        }
        let target_role = if hostile { Role::Player } else { Role::Enemy };
        let hit = with_role(target_role).find(|&target| {
            let other = &participants[target];
            spheres_overlap(beam.center, beam.radius, other.center, other.radius)
        });
        if let Some(target) = hit {
            contacts.push(Contact::ProjectileHit { projectile, target });
        }
    }

    contacts
}

type ActorQuery<'w, 's> = Query<
    'w,
    's,
    (
        Entity,
        &'static Body,
        &'static mut Collider,
        &'static mut Lifecycle,
        Option<&'static mut Health>,
        Option<&'static mut Player>,
        Option<&'static mut Enemy>,
        Option<&'static Projectile>,
        Option<&'static Item>,
        Option<&'static BehaviorMachine>,
    ),
>;

pub fn resolve_contacts(tuning: Res<Tuning>, mut actors: ActorQuery, mut writer: MessageWriter<GameplayEvent>) {
    let mut participants = Vec::new();
    for (entity, body, collider, lifecycle, _, player, enemy, projectile, item, machine) in actors.iter() {
        if !lifecycle.alive {
            continue;
        }
        let role = if player.is_some() {
            Role::Player
        } else if enemy.is_some() {
            Role::Enemy
        } else if let Some(projectile) = projectile {
            Role::Projectile { hostile: projectile.hostile }
        } else if item.is_some() {
            Role::Item
        } else {
            continue;
        };
        participants.push(Participant {
            entity,
            role,
            aabb: body.aabb(),
            center: body.position,
            radius: collider.radius,
            enabled: collider.is_enabled(),
            striking: machine.is_some_and(BehaviorMachine::is_striking),
        });
    }

    for contact in find_contacts(&participants) {
        match contact {
            Contact::PlayerEnemy { player, enemy } => {
                if participants[player].striking {
                    damage_enemy(&mut actors, participants[enemy].entity, tuning.attack.melee_damage, &mut writer);
                } else {
                    damage_player(&mut actors, participants[player].entity, tuning.enemies.contact_damage, &tuning, &mut writer);
                }
            }
            Contact::ProjectileHit { projectile, target } => {
                if let Ok((_, _, mut collider, mut lifecycle, ..)) = actors.get_mut(participants[projectile].entity) {
                    collider.disable();
                    lifecycle.retire();
                }
                let target = participants[target];
                let damage = tuning.projectile.damage;
                match target.role {
                    Role::Player => damage_player(&mut actors, target.entity, damage, &tuning, &mut writer),
                    _ => damage_enemy(&mut actors, target.entity, damage, &mut writer),
                }
            }
            Contact::PlayerItem { player, item } => {
                let item = participants[item];
                if let Ok((_, _, mut collider, mut lifecycle, ..)) = actors.get_mut(item.entity) {
                    collider.disable();
                    lifecycle.retire();
                }
                if let Ok((entity, body, _, _, health, player, ..)) = actors.get_mut(participants[player].entity) {
                    if let Some(mut health) = health {
                        health.heal(tuning.item.heal);
                    }
                    if let Some(mut player) = player {
                        player.score += tuning.item.score;
                    }
                    writer.write(GameplayEvent { source: entity, event: ActorEvent::ItemCollected(body.position) });
                }
            }
        }
    }
}

// a hit suspends the player's collider for the grace period; the last hit point
// retires the player for good
fn damage_player(
    actors: &mut ActorQuery,
    entity: Entity,
    amount: i32,
    tuning: &Tuning,
    writer: &mut MessageWriter<GameplayEvent>,
) {
    let Ok((entity, body, mut collider, mut lifecycle, health, ..)) = actors.get_mut(entity) else { return; };
    // an earlier contact this pass may already have started the grace period
    if !collider.is_enabled() {
        return;
    }
    let Some(mut health) = health else { return; };

    let killed = health.damage(amount);
    writer.write(GameplayEvent { source: entity, event: ActorEvent::Hurt { position: body.position, hp: health.hp } });
    info!("Player hit for {} (hp {})", amount, health.hp);

    if killed {
        collider.disable();
        lifecycle.retire();
        writer.write(GameplayEvent { source: entity, event: ActorEvent::Died(body.position) });
        info!("Player died at {:?}", body.position);
    } else {
        collider.suspend(tuning.player.grace_ticks);
    }
}

fn damage_enemy(actors: &mut ActorQuery, entity: Entity, amount: i32, writer: &mut MessageWriter<GameplayEvent>) {
    let Ok((entity, body, mut collider, _, health, _, enemy, ..)) = actors.get_mut(entity) else { return; };
    if !collider.is_enabled() {
        return;
    }
    let (Some(mut health), Some(mut enemy)) = (health, enemy) else { return; };

    let killed = health.damage(amount);
    writer.write(GameplayEvent { source: entity, event: ActorEvent::Hurt { position: body.position, hp: health.hp } });
    if killed {
        enemy.request_defeat();
        collider.disable();
    }
}

// Overall level outcome
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelOutcome {
    #[default]
    Playing,
    Cleared,
    Failed,
}

/// Failed once no living player is left; cleared once a level that had
/// bosses has none alive. Either result is final.
pub fn update_outcome(
    roster: Option<Res<LevelRoster>>,
    mut outcome: ResMut<LevelOutcome>,
    players: Query<&Lifecycle, With<Player>>,
    lifecycles: Query<&Lifecycle>,
) {
    if *outcome != LevelOutcome::Playing {
        return;
    }
    let Some(roster) = roster else { return; };

    let next = if !players.iter().any(|lifecycle| lifecycle.alive) {
        LevelOutcome::Failed
    } else if !roster.bosses.is_empty()
        && !roster.bosses.iter().any(|&boss| lifecycles.get(boss).is_ok_and(|lifecycle| lifecycle.alive))
    {
        LevelOutcome::Cleared
    } else {
        return;
    };

    *outcome = next;
    info!("Level outcome: {:?}", next);
}
