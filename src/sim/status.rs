//! Status Effects
//!
//! Debuffs a special attack leaves on its target. A target holds at most one
//! effect per kind: re-application refreshes the duration to the longer of
//! the two and keeps the stronger magnitude.

use serde::{Deserialize, Serialize};

/// Seconds between burn damage ticks
pub const BURN_TICK_INTERVAL: f32 = 1.0;

/// Kinds of status effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusKind {
    /// Damage over time. Magnitude = damage per second
    Burn,
    /// Cannot move or attack
    Freeze,
    /// Movement speed multiplier. Magnitude = multiplier (0.6 = 40% slow)
    Slow,
    /// Attacks may miss
    Blind,
    /// Skills are locked out
    Silence,
    /// Cannot move
    Root,
    /// Damage taken multiplier. Magnitude = multiplier (1.25 = 25% more damage)
    DefenseDown,
    /// Cannot move or attack
    Stun,
}

impl StatusKind {
    pub fn name(&self) -> &'static str {
        match self {
            StatusKind::Burn => "Burn",
            StatusKind::Freeze => "Freeze",
            StatusKind::Slow => "Slow",
            StatusKind::Blind => "Blind",
            StatusKind::Silence => "Silence",
            StatusKind::Root => "Root",
            StatusKind::DefenseDown => "Defense Down",
            StatusKind::Stun => "Stun",
        }
    }

    pub fn is_immobilizing(&self) -> bool {
        matches!(self, StatusKind::Freeze | StatusKind::Root | StatusKind::Stun)
    }

    pub fn prevents_attacks(&self) -> bool {
        matches!(self, StatusKind::Freeze | StatusKind::Stun)
    }

    /// Slow is the only kind where a smaller magnitude is stronger
    fn stronger(&self, a: f32, b: f32) -> f32 {
        match self {
            StatusKind::Slow => a.min(b),
            _ => a.max(b),
        }
    }
}

/// One active effect
#[derive(Debug, Clone, PartialEq)]
pub struct StatusEffect {
    pub kind: StatusKind,
    /// Seconds left
    pub remaining: f32,
    pub magnitude: f32,
    /// Name of the attack that applied it
    pub source: String,
    tick_timer: f32,
}

impl StatusEffect {
    pub fn new(kind: StatusKind, duration: f32, magnitude: f32, source: impl Into<String>) -> Self {
        Self {
            kind,
            remaining: duration,
            magnitude,
            source: source.into(),
            tick_timer: BURN_TICK_INTERVAL,
        }
    }
}

/// All effects currently on a target
#[derive(Debug, Clone, Default)]
pub struct StatusEffects {
    effects: Vec<StatusEffect>,
}

impl StatusEffects {
    /// Apply or refresh an effect. Returns true if the kind was not active.
    pub fn apply(&mut self, effect: StatusEffect) -> bool {
        if effect.remaining <= 0.0 {
            return false;
        }
        if let Some(existing) = self.effects.iter_mut().find(|e| e.kind == effect.kind) {
            existing.remaining = existing.remaining.max(effect.remaining);
            existing.magnitude = effect.kind.stronger(existing.magnitude, effect.magnitude);
            existing.source = effect.source;
            return false;
        }
        self.effects.push(effect);
        true
    }

    /// Advance durations, returning burn damage due this step
    pub fn tick(&mut self, dt: f32) -> f32 {
        let mut burn_damage = 0.0;
        for effect in self.effects.iter_mut() {
            effect.remaining -= dt;
            if effect.kind == StatusKind::Burn {
                effect.tick_timer -= dt;
                while effect.tick_timer <= 0.0 {
                    burn_damage += effect.magnitude * BURN_TICK_INTERVAL;
                    effect.tick_timer += BURN_TICK_INTERVAL;
                }
            }
        }
        self.effects.retain(|e| e.remaining > 0.0);
        burn_damage
    }

    pub fn has(&self, kind: StatusKind) -> bool {
        self.effects.iter().any(|e| e.kind == kind)
    }

    pub fn get(&self, kind: StatusKind) -> Option<&StatusEffect> {
        self.effects.iter().find(|e| e.kind == kind)
    }

    pub fn is_immobilized(&self) -> bool {
        self.effects.iter().any(|e| e.kind.is_immobilizing())
    }

    pub fn can_attack(&self) -> bool {
        !self.effects.iter().any(|e| e.kind.prevents_attacks())
    }

    pub fn is_blinded(&self) -> bool {
        self.has(StatusKind::Blind)
    }

    pub fn is_silenced(&self) -> bool {
        self.has(StatusKind::Silence)
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.get(StatusKind::Slow)
            .map(|e| e.magnitude.clamp(0.0, 1.0))
            .unwrap_or(1.0)
    }

    pub fn damage_taken_multiplier(&self) -> f32 {
        self.get(StatusKind::DefenseDown)
            .map(|e| e.magnitude.max(1.0))
            .unwrap_or(1.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reapply_refreshes_instead_of_stacking() {
        let mut effects = StatusEffects::default();
        assert!(effects.apply(StatusEffect::new(StatusKind::Slow, 2.0, 0.7, "Frost Wave")));
        assert!(!effects.apply(StatusEffect::new(StatusKind::Slow, 4.0, 0.5, "Frost Wave")));

        assert_eq!(effects.len(), 1);
        let slow = effects.get(StatusKind::Slow).unwrap();
        assert_eq!(slow.remaining, 4.0);
        assert_eq!(slow.magnitude, 0.5, "stronger slow is the smaller multiplier");
    }

    #[test]
    fn test_shorter_reapplication_keeps_longer_duration() {
        let mut effects = StatusEffects::default();
        effects.apply(StatusEffect::new(StatusKind::Stun, 3.0, 0.0, "a"));
        effects.apply(StatusEffect::new(StatusKind::Stun, 1.0, 0.0, "b"));
        assert_eq!(effects.get(StatusKind::Stun).unwrap().remaining, 3.0);
    }

    #[test]
    fn test_burn_ticks_once_per_second() {
        let mut effects = StatusEffects::default();
        effects.apply(StatusEffect::new(StatusKind::Burn, 3.0, 4.0, "Fireball"));

        assert_eq!(effects.tick(0.5), 0.0);
        assert_eq!(effects.tick(0.5), 4.0);
        assert_eq!(effects.tick(1.0), 4.0);
        assert_eq!(effects.tick(1.0), 4.0);
        assert!(effects.is_empty(), "burn should expire after its duration");
    }

    #[test]
    fn test_control_queries() {
        let mut effects = StatusEffects::default();
        assert!(!effects.is_immobilized());
        assert!(effects.can_attack());

        effects.apply(StatusEffect::new(StatusKind::Root, 2.0, 0.0, "Earthen Grasp"));
        assert!(effects.is_immobilized());
        assert!(effects.can_attack(), "rooted targets can still swing");

        effects.apply(StatusEffect::new(StatusKind::Freeze, 1.0, 0.0, "Frost Wave"));
        assert!(!effects.can_attack());

        effects.tick(1.5);
        assert!(effects.can_attack(), "freeze expired");
        assert!(effects.is_immobilized(), "root still active");
    }

    #[test]
    fn test_multipliers_default_to_neutral() {
        let mut effects = StatusEffects::default();
        assert_eq!(effects.speed_multiplier(), 1.0);
        assert_eq!(effects.damage_taken_multiplier(), 1.0);

        effects.apply(StatusEffect::new(StatusKind::Slow, 2.0, 0.6, "x"));
        effects.apply(StatusEffect::new(StatusKind::DefenseDown, 2.0, 1.25, "y"));
        assert_eq!(effects.speed_multiplier(), 0.6);
        assert_eq!(effects.damage_taken_multiplier(), 1.25);
    }

    #[test]
    fn test_zero_duration_is_ignored() {
        let mut effects = StatusEffects::default();
        assert!(!effects.apply(StatusEffect::new(StatusKind::Blind, 0.0, 0.0, "x")));
        assert!(effects.is_empty());
    }
}
