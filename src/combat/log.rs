//! Combat logging
//!
//! Records simulation events for display and post-run analysis.

use std::fs;
use std::path::Path;

use bevy::prelude::*;

/// A single entry in the combat log
#[derive(Debug, Clone)]
pub struct CombatLogEntry {
    /// Timestamp in simulation time (seconds since start)
    pub timestamp: f32,
    /// The type of event
    pub event_type: CombatLogEventType,
    /// Human-readable description of the event
    pub message: String,
}

/// Types of combat log events for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatLogEventType {
    /// Damage dealt, special-attack hits included
    Damage,
    /// Special attack cast by an elite
    SpecialAttack,
    /// Debuff applied to a hero
    StatusApplied,
    /// Group aggro raised or cleared
    Aggro,
    /// Enemy state machine transition
    StateChange,
    /// Actor died
    Death,
    /// Experience, currency or level gained
    Reward,
    /// Loot dropped or picked up
    Loot,
    /// Group spawned or activated
    Spawn,
    /// Simulation event (start, end, etc.)
    SimEvent,
}

impl CombatLogEventType {
    pub fn label(&self) -> &'static str {
        match self {
            CombatLogEventType::Damage => "DAMAGE",
            CombatLogEventType::SpecialAttack => "SPECIAL",
            CombatLogEventType::StatusApplied => "STATUS",
            CombatLogEventType::Aggro => "AGGRO",
            CombatLogEventType::StateChange => "STATE",
            CombatLogEventType::Death => "DEATH",
            CombatLogEventType::Reward => "REWARD",
            CombatLogEventType::Loot => "LOOT",
            CombatLogEventType::Spawn => "SPAWN",
            CombatLogEventType::SimEvent => "SIM",
        }
    }
}

/// The combat log resource storing all events
#[derive(Resource, Default)]
pub struct CombatLog {
    /// All log entries in chronological order
    pub entries: Vec<CombatLogEntry>,
    /// Current simulation time
    pub sim_time: f32,
}

impl CombatLog {
    /// Clear the log for a new run
    pub fn clear(&mut self) {
        self.entries.clear();
        self.sim_time = 0.0;
    }

    /// Add a new entry to the log
    pub fn log(&mut self, event_type: CombatLogEventType, message: String) {
        self.entries.push(CombatLogEntry {
            timestamp: self.sim_time,
            event_type,
            message,
        });
    }

    /// Get entries filtered by event type
    pub fn filter_by_type(&self, event_type: CombatLogEventType) -> Vec<&CombatLogEntry> {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Number of entries of a given type
    pub fn count(&self, event_type: CombatLogEventType) -> usize {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .count()
    }

    /// Get the last N entries
    pub fn recent(&self, count: usize) -> Vec<&CombatLogEntry> {
        self.entries.iter().rev().take(count).rev().collect()
    }

    /// Render one entry as a log line
    pub fn format_entry(entry: &CombatLogEntry) -> String {
        format!(
            "[{:>8.2}] {:<7} {}",
            entry.timestamp,
            entry.event_type.label(),
            entry.message
        )
    }

    /// Write the log as plain text. Returns the path written.
    pub fn save_to_file(&self, path: &Path) -> Result<String, String> {
        let mut contents = String::new();
        for entry in &self.entries {
            contents.push_str(&Self::format_entry(entry));
            contents.push('\n');
        }

        fs::write(path, contents)
            .map_err(|e| format!("Failed to write combat log {}: {}", path.display(), e))?;

        Ok(path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_uses_current_sim_time() {
        let mut log = CombatLog::default();
        log.sim_time = 2.5;
        log.log(CombatLogEventType::Damage, "Goblin hits Hero for 8".to_string());

        assert_eq!(log.entries.len(), 1);
        assert_eq!(log.entries[0].timestamp, 2.5);
    }

    #[test]
    fn test_filter_and_count() {
        let mut log = CombatLog::default();
        log.log(CombatLogEventType::Damage, "a".to_string());
        log.log(CombatLogEventType::Death, "b".to_string());
        log.log(CombatLogEventType::Damage, "c".to_string());

        assert_eq!(log.count(CombatLogEventType::Damage), 2);
        assert_eq!(log.filter_by_type(CombatLogEventType::Death)[0].message, "b");
        assert_eq!(log.count(CombatLogEventType::Loot), 0);
    }

    #[test]
    fn test_recent_keeps_chronological_order() {
        let mut log = CombatLog::default();
        for i in 0..5 {
            log.log(CombatLogEventType::SimEvent, format!("event {}", i));
        }

        let recent = log.recent(2);
        assert_eq!(recent[0].message, "event 3");
        assert_eq!(recent[1].message, "event 4");
    }

    #[test]
    fn test_clear_resets_time() {
        let mut log = CombatLog::default();
        log.sim_time = 10.0;
        log.log(CombatLogEventType::SimEvent, "x".to_string());
        log.clear();

        assert!(log.entries.is_empty());
        assert_eq!(log.sim_time, 0.0);
    }
}
