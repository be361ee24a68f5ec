// Hit points, contact colliders and the alive flag
// pickups (Item) heal the player; everything dies by flipping Lifecycle and
// waiting for the collect pass at the top of the next tick

use bevy::prelude::*;

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health {
    pub hp: i32,
    pub max_hp: i32,
}

impl Health {
    pub fn new(max_hp: i32) -> Self {
        Self { hp: max_hp, max_hp }
    }

    /// Returns true when this hit took the last point.
    pub fn damage(&mut self, amount: i32) -> bool {
        let was_alive = self.hp > 0;
        self.hp = (self.hp - amount.max(0)).max(0);
        was_alive && self.hp == 0
    }

    pub fn heal(&mut self, amount: i32) {
        self.hp = (self.hp + amount.max(0)).min(self.max_hp);
    }

    pub fn is_depleted(&self) -> bool {
        self.hp <= 0
    }
}

/// An actor with `alive == false` is despawned by the collect pass. Nothing
/// despawns mid-tick.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifecycle {
    pub alive: bool,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self { alive: true }
    }
}

impl Lifecycle {
    pub fn retire(&mut self) {
        self.alive = false;
    }
}

// Pickup that heals the player and adds to the score
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Item;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionGate {
    #[default]
    Enabled,
    // ticks left
    Suspended(u32),
    Disabled,
}

/// Contact shape for the entity pass. Boxes come from `Body`; the radius is
/// used by sphere tests against projectiles.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub radius: f32,
    pub gate: CollisionGate,
}

impl Collider {
    pub fn new(radius: f32) -> Self {
        Self { radius, gate: CollisionGate::Enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.gate == CollisionGate::Enabled
    }

    /// Grace period after a hit. Never re-enables a disabled collider.
    pub fn suspend(&mut self, ticks: u32) {
        if self.gate == CollisionGate::Disabled {
            return;
        }
        self.gate = if ticks == 0 { CollisionGate::Enabled } else { CollisionGate::Suspended(ticks) };
    }

    pub fn disable(&mut self) {
        self.gate = CollisionGate::Disabled;
    }

    pub fn tick(&mut self) {
        if let CollisionGate::Suspended(left) = self.gate {
            self.gate = if left <= 1 { CollisionGate::Enabled } else { CollisionGate::Suspended(left - 1) };
        }
    }
}

// counts down grace periods once per tick
pub fn tick_colliders(mut colliders: Query<&mut Collider>) {
    for mut collider in colliders.iter_mut() {
        collider.tick();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_reports_the_killing_blow_once() {
        let mut health = Health::new(3);
        assert!(!health.damage(2));
        assert!(health.damage(5));
        assert_eq!(health.hp, 0);
        assert!(!health.damage(1));
        assert!(health.is_depleted());
    }

    #[test]
    fn heal_is_capped() {
        let mut health = Health::new(3);
        health.damage(1);
        health.heal(10);
        assert_eq!(health.hp, 3);
    }

    #[test]
    fn suspension_counts_down_but_disable_sticks() {
        let mut collider = Collider::new(0.4);
        collider.suspend(2);
        assert!(!collider.is_enabled());
        collider.tick();
        assert!(!collider.is_enabled());
        collider.tick();
        assert!(collider.is_enabled());

        collider.disable();
        collider.suspend(3);
        collider.tick();
        assert_eq!(collider.gate, CollisionGate::Disabled);
    }
}
