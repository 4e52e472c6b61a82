//! Tunable parameters for a simulation run.

use serde::Deserialize;
use tilecrawl_core::CombatRules;

/// Parameters that shape a run; every field falls back to its default when
/// omitted from a configuration file.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for spawn placement and patrol choices.
    pub seed: u64,
    /// Distance, in cells, the player can see.
    pub sight_radius: u32,
    /// Number of rays cast when computing visibility.
    pub ray_count: u32,
    /// Euclidean distance below which enemies start pursuing the player.
    pub aggro_radius: f64,
    /// Maximum distance of a wandering enemy's patrol target.
    pub patrol_radius: u32,
    /// Starting health of the player.
    pub player_health: i32,
    /// Starting health of each enemy.
    pub enemy_health: i32,
    /// Melee damage multipliers.
    pub combat: CombatRules,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            sight_radius: 8,
            ray_count: 360,
            aggro_radius: 5.0,
            patrol_radius: 10,
            player_health: 100,
            enemy_health: 30,
            combat: CombatRules::default(),
        }
    }
}
