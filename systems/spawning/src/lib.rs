#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system that chooses starting cells for actors.
//!
//! Random placements are drawn from a seeded generator so a level started
//! twice with the same seed puts every actor on the same cell.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tilecrawl_core::{ActorProfile, Cell, Command, Position, Role};
use tilecrawl_world::{query, World};

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Where a requested actor should appear.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Placement {
    /// Exactly this cell; the world rejects it if it cannot be entered.
    Fixed(Position),
    /// Any enterable, non-blank cell not already taken.
    #[default]
    Random,
}

/// A single actor the caller wants on the level.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnRequest {
    /// Side the actor fights for.
    pub role: Role,
    /// Display name and level.
    pub profile: ActorProfile,
    /// Starting health.
    pub health: i32,
    /// Cell selection strategy.
    pub placement: Placement,
}

/// Pure system that turns spawn requests into spawn commands.
#[derive(Debug)]
pub struct Spawning {
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Emits one spawn command per request, in request order.
    ///
    /// Random placements never reuse a cell that is occupied or already
    /// handed out in this batch. Returns the number of requests that could
    /// not be placed because no free cell remained.
    #[must_use]
    pub fn handle(
        &mut self,
        world: &World,
        requests: &[SpawnRequest],
        out: &mut Vec<Command>,
    ) -> usize {
        let fixed: Vec<Position> = requests
            .iter()
            .filter_map(|request| match request.placement {
                Placement::Fixed(at) => Some(at),
                Placement::Random => None,
            })
            .collect();
        let mut candidates: Vec<Position> = query::grid(world)
            .positions()
            .filter(|position| is_spawnable(world, *position) && !fixed.contains(position))
            .collect();

        let mut unplaced = 0;
        for request in requests {
            let at = match request.placement {
                Placement::Fixed(at) => at,
                Placement::Random => {
                    if candidates.is_empty() {
                        tracing::warn!(
                            role = ?request.role,
                            name = %request.profile.name,
                            "no free cell left to spawn on"
                        );
                        unplaced += 1;
                        continue;
                    }
                    let index = self.rng.gen_range(0..candidates.len());
                    candidates.swap_remove(index)
                }
            };

            out.push(Command::SpawnActor {
                role: request.role,
                profile: request.profile.clone(),
                health: request.health,
                at,
            });
        }
        unplaced
    }
}

/// Cells actors may start on: enterable right now and part of the level.
fn is_spawnable(world: &World, position: Position) -> bool {
    query::can_enter(world, position) && query::cell_at(world, position) != Cell::Blank
}

#[cfg(test)]
mod tests {
    use tilecrawl_core::CombatRules;
    use tilecrawl_world::Grid;

    use super::*;

    #[test]
    fn blank_and_blocked_cells_are_not_spawnable() {
        let grid = Grid::from_rows([" .#+O".chars().map(Cell::from_glyph)]).expect("grid builds");
        let world = World::new(grid, CombatRules::default());
        let spawnable: Vec<_> = query::grid(&world)
            .positions()
            .filter(|position| is_spawnable(&world, *position))
            .collect();
        assert_eq!(spawnable, vec![Position::new(1, 0), Position::new(4, 0)]);
    }
}
