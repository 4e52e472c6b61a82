#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy decision system that turns world state into movement commands.
//!
//! Each enemy is either wandering between random patrol points or
//! aggressively pursuing the player. The system only proposes commands; the
//! world resolves every step through its traversal rules, so a planned step
//! may still turn into an attack, a door opening or a blocked move.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tilecrawl_core::{ActorId, ActorSnapshot, Behavior, Command, Position, Role};
use tilecrawl_system_pathfinding::{reachable_from, shortest_path};
use tilecrawl_world::{query, World};

/// Tuning for enemy perception and patrols.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    aggro_radius: f64,
    patrol_radius: u32,
}

impl Config {
    /// Creates a new configuration.
    #[must_use]
    pub const fn new(aggro_radius: f64, patrol_radius: u32) -> Self {
        Self {
            aggro_radius,
            patrol_radius,
        }
    }

    /// Euclidean distance below which a wandering enemy turns aggressive.
    #[must_use]
    pub const fn aggro_radius(&self) -> f64 {
        self.aggro_radius
    }

    /// Maximum Euclidean distance of a patrol target from the enemy.
    #[must_use]
    pub const fn patrol_radius(&self) -> u32 {
        self.patrol_radius
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(5.0, 10)
    }
}

/// Deterministic enemy controller driven by a seeded random source.
#[derive(Clone, Debug)]
pub struct EnemyAi {
    config: Config,
    rng: ChaCha8Rng,
}

impl EnemyAi {
    /// Creates a controller whose patrol choices derive from `seed`.
    #[must_use]
    pub fn new(config: Config, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Configuration the controller was built with.
    #[must_use]
    pub const fn config(&self) -> Config {
        self.config
    }

    /// Emits this tick's commands for a single enemy.
    ///
    /// The commands must be applied before the next enemy is handled so each
    /// decision sees the positions left by the previous one.
    pub fn handle(&mut self, world: &World, enemy: ActorId, out: &mut Vec<Command>) {
        let Some(actor) = query::actor(world, enemy)
            .filter(|actor| actor.alive && actor.role == Role::Enemy)
        else {
            return;
        };
        let player = query::player(world).filter(|player| player.alive);
        let mut behavior = actor.behavior.unwrap_or_default();

        if let Some(player) = &player {
            let distance = actor.position.euclidean_distance(player.position);
            if behavior == Behavior::Wandering && distance < self.config.aggro_radius {
                tracing::debug!(enemy = enemy.get(), distance, "enemy spotted the player");
                behavior = Behavior::Aggressive;
                out.push(Command::SetBehavior {
                    actor: enemy,
                    behavior,
                });
            }

            if actor.position.manhattan_distance(player.position) == 1 {
                out.push(Command::MoveActor {
                    actor: enemy,
                    to: player.position,
                });
                return;
            }
        }

        let (route, planned) = match behavior {
            Behavior::Aggressive => match pursue(world, &actor, player.as_ref()) {
                Some(route) => (route, true),
                None => {
                    tracing::debug!(enemy = enemy.get(), "player unreachable, resuming patrol");
                    out.push(Command::SetBehavior {
                        actor: enemy,
                        behavior: Behavior::Wandering,
                    });
                    out.push(Command::ClearPath { actor: enemy });
                    return;
                }
            },
            Behavior::Wandering if actor.path.is_empty() => {
                match self.patrol_route(world, actor.position) {
                    Some(route) => (route, true),
                    None => return,
                }
            }
            Behavior::Wandering => (actor.path, false),
        };

        let Some(&step) = route.first() else {
            return;
        };
        if planned {
            out.push(Command::AssignPath {
                actor: enemy,
                path: route,
            });
        }
        out.push(Command::MoveActor {
            actor: enemy,
            to: step,
        });
    }

    fn patrol_route(&mut self, world: &World, origin: Position) -> Option<Vec<Position>> {
        let radius = f64::from(self.config.patrol_radius);
        let reach = reachable_from(origin, |cell| query::can_enter(world, cell));
        let candidates: Vec<Position> = reach
            .cells()
            .iter()
            .copied()
            .skip(1)
            .filter(|cell| origin.euclidean_distance(*cell) <= radius)
            .collect();
        if candidates.is_empty() {
            return None;
        }

        let target = candidates[self.rng.gen_range(0..candidates.len())];
        let route = shortest_path(origin, target, |cell| query::can_enter(world, cell))?;
        tracing::trace!(?origin, ?target, steps = route.len(), "picked patrol target");
        Some(route)
    }
}

/// Fresh route to the player's current cell, recomputed from scratch.
///
/// The player's cell is the only occupied cell the route may end on; the
/// final step then resolves as an attack.
fn pursue(
    world: &World,
    actor: &ActorSnapshot,
    player: Option<&ActorSnapshot>,
) -> Option<Vec<Position>> {
    let player = player?;
    shortest_path(actor.position, player.position, |cell| {
        cell == player.position || query::can_enter(world, cell)
    })
    .filter(|route| !route.is_empty())
}
