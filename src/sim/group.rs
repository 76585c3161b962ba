//! Enemy Groups
//!
//! A group shares one aggro flag between its members. The first member to
//! spot a target claims aggro and pulls every patrolling member into the
//! chase; later reports are ignored while the flag is set.
//!
//! The flag is level-triggered: every tick it is recomputed from member
//! states and cleared once no live member is chasing or attacking. A missed
//! transition therefore never leaves a group stuck engaged.

use bevy::prelude::*;

use crate::combat::events::AggroShared;
use crate::combat::log::{CombatLog, CombatLogEventType};

use super::damage::Damageable;
use super::enemy::{Enemy, EnemyState};

#[derive(Component, Debug, Clone, Default)]
pub struct EnemyGroup {
    pub name: String,
    /// Insertion ordered
    members: Vec<Entity>,
    has_aggro: bool,
    active: bool,
}

impl EnemyGroup {
    pub fn new(name: impl Into<String>, members: Vec<Entity>) -> Self {
        Self {
            name: name.into(),
            members,
            has_aggro: false,
            active: false,
        }
    }

    pub fn members(&self) -> &[Entity] {
        &self.members
    }

    pub fn has_aggro(&self) -> bool {
        self.has_aggro
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Latched: true only the first time
    pub fn activate(&mut self) -> bool {
        if self.active {
            return false;
        }
        self.active = true;
        true
    }

    /// Take aggro. False when the group is already engaged.
    pub fn claim_aggro(&mut self) -> bool {
        if self.has_aggro {
            return false;
        }
        self.has_aggro = true;
        true
    }

    /// Recompute the flag from member states. Returns true if the group
    /// stood down.
    pub fn reevaluate(&mut self, states: impl IntoIterator<Item = EnemyState>) -> bool {
        if !self.has_aggro || group_is_engaged(states) {
            return false;
        }
        self.has_aggro = false;
        true
    }
}

/// At least one live member is chasing or attacking
pub fn group_is_engaged(states: impl IntoIterator<Item = EnemyState>) -> bool {
    states.into_iter().any(|state| state.is_engaged())
}

/// Apply aggro reports: the first report per engagement pulls in every
/// patrolling member
pub fn share_group_aggro(
    mut reports: EventReader<AggroShared>,
    mut groups: Query<&mut EnemyGroup>,
    mut enemies: Query<&mut Enemy>,
    mut combat_log: ResMut<CombatLog>,
) {
    for report in reports.read() {
        let Ok(mut group) = groups.get_mut(report.group) else {
            continue;
        };
        if !group.claim_aggro() {
            continue;
        }

        let mut joined = 0;
        for &member in group.members() {
            let Ok(mut enemy) = enemies.get_mut(member) else {
                continue;
            };
            if enemy.adopt_shared_target(report.target) {
                joined += 1;
                combat_log.log(
                    CombatLogEventType::StateChange,
                    format!("{}: Patrol -> Chase (group aggro)", enemy.label()),
                );
            }
        }

        combat_log.log(
            CombatLogEventType::Aggro,
            format!(
                "{} engages, {} more member(s) join the chase",
                group.name, joined
            ),
        );
    }
}

/// Level-triggered stand-down check
pub fn reevaluate_group_aggro(
    mut groups: Query<&mut EnemyGroup>,
    enemies: Query<&Enemy>,
    mut combat_log: ResMut<CombatLog>,
) {
    for mut group in groups.iter_mut() {
        if !group.has_aggro() {
            continue;
        }
        let states: Vec<EnemyState> = group
            .members()
            .iter()
            .filter_map(|&member| enemies.get(member).ok())
            .map(|enemy| enemy.state())
            .collect();
        if group.reevaluate(states) {
            combat_log.log(
                CombatLogEventType::Aggro,
                format!("{} stands down", group.name),
            );
        }
    }
}
