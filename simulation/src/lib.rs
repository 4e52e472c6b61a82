#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick-by-tick orchestration of a tilecrawl level.
//!
//! [`Simulation::advance_tick`] resolves the player's command, then prunes
//! defeated enemies, lets every living enemy act in roster order and finally
//! recomputes the visibility overlay from the player's position. All state
//! changes flow through the world's `apply` entry point.

mod config;

use thiserror::Error;
use tilecrawl_core::{
    ActorId, ActorProfile, Command, Event, PlayerCommand, Position, Role, SpawnError,
};
use tilecrawl_system_enemy_ai::{self as enemy_ai, EnemyAi};
use tilecrawl_system_spawning::{self as spawning, SpawnRequest, Spawning};
use tilecrawl_system_visibility::{self as visibility, Visibility};
use tilecrawl_world::{self as world, query, query::LevelView, Grid, World};

pub use crate::config::SimulationConfig;
pub use tilecrawl_system_spawning::Placement;

/// Errors raised while populating a level.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SetupError {
    /// Random placement ran out of free cells.
    #[error("no free cell left for {unplaced} actor(s)")]
    NoRoom {
        /// Number of actors that could not be placed.
        unplaced: usize,
    },
    /// The world refused a spawn, typically a fixed cell that is blocked.
    #[error("cannot spawn {role:?} at {at:?}: {reason:?}")]
    SpawnRejected {
        /// Side of the rejected actor.
        role: Role,
        /// Requested cell.
        at: Position,
        /// Reason reported by the world.
        reason: SpawnError,
    },
}

/// Result of advancing the simulation by one tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickOutcome {
    /// `false` once the player quit or died.
    pub should_continue: bool,
    /// Events produced while the tick ran, in order.
    pub events: Vec<Event>,
}

/// A populated level plus the systems that drive it.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    enemy_ai: EnemyAi,
    visibility: Visibility,
    player: ActorId,
}

impl Simulation {
    /// Spawns the player and enemies on `grid` and computes the first
    /// visibility overlay.
    pub fn new(
        grid: Grid,
        player: ActorProfile,
        enemies: Vec<ActorProfile>,
        placement: Placement,
        config: SimulationConfig,
    ) -> Result<Self, SetupError> {
        let mut world = World::new(grid, config.combat);

        let requests: Vec<SpawnRequest> = std::iter::once(SpawnRequest {
            role: Role::Player,
            profile: player,
            health: config.player_health,
            placement,
        })
        .chain(enemies.into_iter().map(|profile| SpawnRequest {
            role: Role::Enemy,
            profile,
            health: config.enemy_health,
            placement: Placement::Random,
        }))
        .collect();

        let mut spawner = Spawning::new(spawning::Config::new(config.seed));
        let mut commands = Vec::new();
        let unplaced = spawner.handle(&world, &requests, &mut commands);
        if unplaced > 0 {
            return Err(SetupError::NoRoom { unplaced });
        }

        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }
        if let Some((role, at, reason)) = events.iter().find_map(|event| match event {
            Event::SpawnRejected { role, at, reason } => Some((*role, *at, *reason)),
            _ => None,
        }) {
            return Err(SetupError::SpawnRejected { role, at, reason });
        }

        let player = query::player(&world)
            .map(|snapshot| snapshot.id)
            .ok_or(SetupError::NoRoom { unplaced: 1 })?;

        let mut simulation = Self {
            world,
            enemy_ai: EnemyAi::new(
                enemy_ai::Config::new(config.aggro_radius, config.patrol_radius),
                config.seed,
            ),
            visibility: Visibility::new(visibility::Config::new(
                config.sight_radius,
                config.ray_count,
            )),
            player,
        };
        events.clear();
        simulation.refresh_visibility(&mut events);

        tracing::info!(
            enemies = requests.len() - 1,
            seed = config.seed,
            "level populated"
        );
        Ok(simulation)
    }

    /// Runs one tick with the player's command and reports what happened.
    ///
    /// `Quit` and ticks after the player's death leave the level untouched.
    pub fn advance_tick(&mut self, command: PlayerCommand) -> TickOutcome {
        if command == PlayerCommand::Quit || !self.player_alive() {
            return TickOutcome {
                should_continue: false,
                events: Vec::new(),
            };
        }

        let mut events = Vec::new();
        self.resolve_player(command, &mut events);

        self.apply(Command::BeginTick, &mut events);

        let mut commands = Vec::new();
        for enemy in query::living_enemy_ids(&self.world) {
            self.enemy_ai.handle(&self.world, enemy, &mut commands);
            for command in commands.drain(..) {
                self.apply(command, &mut events);
            }
        }

        self.refresh_visibility(&mut events);

        let should_continue = self.player_alive();
        tracing::trace!(
            tick = query::tick_index(&self.world),
            events = events.len(),
            should_continue,
            "tick finished"
        );
        if !should_continue {
            tracing::info!("player died");
        }

        TickOutcome {
            should_continue,
            events,
        }
    }

    /// Read-only view of the level for presentation.
    #[must_use]
    pub fn level(&self) -> LevelView<'_> {
        query::level_view(&self.world)
    }

    /// Provides read-only access to the underlying world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Identifier of the player actor.
    #[must_use]
    pub const fn player(&self) -> ActorId {
        self.player
    }

    fn player_alive(&self) -> bool {
        query::actor(&self.world, self.player).is_some_and(|player| player.alive)
    }

    fn resolve_player(&mut self, command: PlayerCommand, events: &mut Vec<Event>) {
        let Some(position) = query::actor(&self.world, self.player).map(|player| player.position)
        else {
            return;
        };

        if let Some(direction) = command.direction() {
            self.apply(
                Command::MoveActor {
                    actor: self.player,
                    to: position.step(direction),
                },
                events,
            );
        } else if command == PlayerCommand::Interact {
            self.apply(Command::Interact { actor: self.player }, events);
        }
    }

    fn refresh_visibility(&mut self, events: &mut Vec<Event>) {
        let Some(viewer) = query::actor(&self.world, self.player).map(|player| player.position)
        else {
            return;
        };
        let world = &self.world;
        let dimensions = query::grid(world).dimensions();
        let mask = self.visibility.compute(viewer, dimensions, |cell| {
            query::cell_at(world, cell).is_opaque()
        });
        self.apply(Command::ReplaceVisibility { mask }, events);
    }

    fn apply(&mut self, command: Command, events: &mut Vec<Event>) {
        world::apply(&mut self.world, command, events);
    }
}
