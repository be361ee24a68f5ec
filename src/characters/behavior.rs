// Behavior state machine shared by the player's attacks
// input only ever *requests* a change; the request is applied at the top of
// the next tick, while timed phases roll over at the end of the tick they expire in

use bevy::prelude::*;

use crate::characters::config::AttackTuning;
use crate::geometry::{ease_in, ease_out};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttackPhase {
    Anticipation,
    Action,
    Recovery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Behavior {
    #[default]
    Normal,
    Melee(AttackPhase),
    Ranged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Attack,
    Special,
    PhaseElapsed,
}

/// The whole transition table. `None` means the trigger is ignored in that
/// state, which is how attack input during an attack gets dropped.
pub fn transition(state: Behavior, trigger: Trigger, grounded: bool) -> Option<Behavior> {
    use AttackPhase::*;
    match (state, trigger) {
        (Behavior::Normal, Trigger::Attack) if grounded => Some(Behavior::Melee(Anticipation)),
        (Behavior::Normal, Trigger::Special) => Some(Behavior::Ranged),
        (Behavior::Melee(Anticipation), Trigger::PhaseElapsed) => Some(Behavior::Melee(Action)),
        (Behavior::Melee(Action), Trigger::PhaseElapsed) => Some(Behavior::Melee(Recovery)),
        (Behavior::Melee(Recovery), Trigger::PhaseElapsed) => Some(Behavior::Normal),
        (Behavior::Ranged, Trigger::PhaseElapsed) => Some(Behavior::Normal),
        _ => None,
    }
}

fn phase_length(state: Behavior, timings: &AttackTuning) -> Option<u32> {
    match state {
        Behavior::Normal => None,
        Behavior::Melee(AttackPhase::Anticipation) => Some(timings.anticipation_ticks),
        Behavior::Melee(AttackPhase::Action) => Some(timings.action_ticks),
        Behavior::Melee(AttackPhase::Recovery) => Some(timings.recovery_ticks),
        Behavior::Ranged => Some(timings.ranged_ticks),
    }
}

#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BehaviorMachine {
    state: Behavior,
    request: Option<Behavior>,
    phase_ticks: u32,
}

impl BehaviorMachine {
    pub fn state(&self) -> Behavior {
        self.state
    }

    pub fn pending(&self) -> Option<Behavior> {
        self.request
    }

    pub fn phase_ticks(&self) -> u32 {
        self.phase_ticks
    }

    /// Queue a change for the next tick. The first request in a tick wins.
    pub fn request(&mut self, next: Behavior) {
        if self.request.is_none() {
            self.request = Some(next);
        }
    }

    /// Run `trigger` through the table and queue the result, if any.
    pub fn fire(&mut self, trigger: Trigger, grounded: bool) -> bool {
        match transition(self.state, trigger, grounded) {
            Some(next) if self.request.is_none() => {
                self.request = Some(next);
                true
            }
            _ => false,
        }
    }

    /// Top of tick. Returns the state just entered.
    pub fn apply_request(&mut self) -> Option<Behavior> {
        let next = self.request.take()?;
        self.state = next;
        self.phase_ticks = 0;
        Some(next)
    }

    /// End of tick. Counts the tick just spent in a timed state and rolls over
    /// to the next state once the phase has run its full length.
    pub fn advance(&mut self, timings: &AttackTuning) -> Option<Behavior> {
        let length = phase_length(self.state, timings)?;
        self.phase_ticks += 1;
        if self.phase_ticks < length {
            return None;
        }
        let next = transition(self.state, Trigger::PhaseElapsed, true)?;
        self.state = next;
        self.phase_ticks = 0;
        Some(next)
    }

    /// Only the lunge itself hurts enemies.
    pub fn is_striking(&self) -> bool {
        self.state == Behavior::Melee(AttackPhase::Action)
    }

    pub fn phase_progress(&self, timings: &AttackTuning) -> f32 {
        match phase_length(self.state, timings) {
            Some(length) => self.phase_ticks as f32 / length as f32,
            None => 0.0,
        }
    }

    /// Cosmetic squash and stretch for the renderer: y is height, z is depth.
    /// Crouch on anticipation, thrust on action, settle on recovery.
    pub fn stretch(&self, timings: &AttackTuning) -> Vec3 {
        let t = self.phase_progress(timings);
        match self.state {
            Behavior::Melee(AttackPhase::Anticipation) => {
                Vec3::new(1.0, ease_out(1.0, 1.6, t), ease_out(1.0, 0.3, t))
            }
            Behavior::Melee(AttackPhase::Action) => Vec3::new(1.0, ease_in(1.6, 0.7, t), ease_out(0.3, 1.3, t)),
            Behavior::Melee(AttackPhase::Recovery) => {
                Vec3::new(1.0, ease_out(0.7, 1.0, t), ease_out(1.3, 1.0, t))
            }
            Behavior::Normal | Behavior::Ranged => Vec3::ONE,
        }
    }
}
