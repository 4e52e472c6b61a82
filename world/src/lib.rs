#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for tilecrawl.
//!
//! The world owns the grid, the actor roster and the per-tick overlays. It is
//! only ever mutated through [`apply`], which routes every position change
//! and every door or chest toggle through the traversal rules.

mod actors;
mod grid;
mod orientation;
mod traversal;

use std::collections::BTreeSet;

use tilecrawl_core::{
    ActorId, ActorProfile, Behavior, Cell, CombatRules, Command, Event, Position, Role,
    SpawnError, VisibilityMask,
};

use crate::actors::Roster;

pub use crate::grid::{Grid, GridError};

/// Represents the authoritative dungeon level.
#[derive(Debug)]
pub struct World {
    grid: Grid,
    roster: Roster,
    combat: CombatRules,
    visibility: VisibilityMask,
    debug_overlay: BTreeSet<Position>,
    tick_index: u64,
}

impl World {
    /// Creates a world around a loaded grid with no actors spawned yet.
    #[must_use]
    pub fn new(grid: Grid, combat: CombatRules) -> Self {
        let (width, height) = grid.dimensions();
        Self {
            grid,
            roster: Roster::default(),
            combat,
            visibility: VisibilityMask::new(width, height),
            debug_overlay: BTreeSet::new(),
            tick_index: 0,
        }
    }

    fn begin_tick(&mut self, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TickStarted {
            tick: self.tick_index,
        });

        for actor in self.roster.prune_dead_enemies() {
            tracing::debug!(actor = actor.get(), "pruned defeated enemy");
            out_events.push(Event::ActorRemoved { actor });
        }

        self.debug_overlay.clear();
        for enemy in self.roster.enemies() {
            self.debug_overlay.extend(enemy.path.iter().copied());
        }
    }

    fn spawn(
        &mut self,
        role: Role,
        profile: ActorProfile,
        health: i32,
        at: Position,
        out_events: &mut Vec<Event>,
    ) {
        let rejection = if role == Role::Player && self.roster.player().is_some() {
            Some(SpawnError::PlayerExists)
        } else if !traversal::terrain_allows(&self.grid, at) {
            Some(SpawnError::Impassable)
        } else if self.grid.cell_at(at) == Cell::Blank {
            Some(SpawnError::Blank)
        } else if self.roster.occupant_at(at).is_some() {
            Some(SpawnError::Occupied)
        } else {
            None
        };

        if let Some(reason) = rejection {
            tracing::warn!(?role, ?at, ?reason, "spawn rejected");
            out_events.push(Event::SpawnRejected { role, at, reason });
            return;
        }

        let name = profile.name.clone();
        let actor = self.roster.insert(role, profile, health, at);
        tracing::info!(actor = actor.get(), %name, ?role, ?at, "actor spawned");
        out_events.push(Event::ActorSpawned { actor, role, at });
    }

    fn attempt_move(&mut self, actor_id: ActorId, to: Position, out_events: &mut Vec<Event>) {
        let Some(actor) = self.roster.get(actor_id).filter(|actor| actor.alive) else {
            return;
        };
        let from = actor.position;
        let role = actor.role;
        let level = actor.level;
        let follows_path = actor.next_step() == Some(to);

        if from.direction_to(to).is_none() {
            out_events.push(Event::MoveBlocked {
                actor: actor_id,
                at: to,
            });
            return;
        }

        if traversal::can_enter(&self.grid, &self.roster, to) {
            self.relocate(actor_id, from, to, follows_path, out_events);
            return;
        }

        if let Some(defender) = self.roster.occupant_at(to) {
            if role.is_hostile_to(defender.role) {
                let defender = defender.id;
                self.strike(actor_id, role, level, defender, out_events);
                return;
            }
        } else if let Some((before, after)) = self.open_closed_interactable(to) {
            tracing::debug!(actor = actor_id.get(), ?to, "opened interactable instead of moving");
            out_events.push(Event::InteractableToggled {
                at: to,
                from: before,
                to: after,
            });
            if follows_path {
                self.clear_path(actor_id, out_events);
            }
            return;
        }

        out_events.push(Event::MoveBlocked {
            actor: actor_id,
            at: to,
        });
        if follows_path {
            self.clear_path(actor_id, out_events);
        }
    }

    fn open_closed_interactable(&mut self, position: Position) -> Option<(Cell, Cell)> {
        let cell = self.grid.cell_at(position);
        if !cell.blocks_movement() || cell.toggled().is_none() {
            return None;
        }
        traversal::toggle_interactable(&mut self.grid, position)
    }

    fn relocate(
        &mut self,
        actor_id: ActorId,
        from: Position,
        to: Position,
        follows_path: bool,
        out_events: &mut Vec<Event>,
    ) {
        let Some(actor) = self.roster.get_mut(actor_id) else {
            return;
        };
        actor.position = to;
        out_events.push(Event::ActorMoved {
            actor: actor_id,
            from,
            to,
        });
        tracing::debug!(actor = actor_id.get(), ?from, ?to, "actor moved");

        if follows_path {
            let _ = actor.path.pop_front();
            if actor.path.is_empty() {
                out_events.push(Event::PathCompleted { actor: actor_id });
            }
        } else if !actor.path.is_empty() {
            actor.path.clear();
            out_events.push(Event::PathCleared { actor: actor_id });
        }

        debug_assert!(
            self.roster.living_count_at(to) <= 1,
            "two living actors share {to:?}"
        );
    }

    fn strike(
        &mut self,
        attacker: ActorId,
        role: Role,
        level: f64,
        defender: ActorId,
        out_events: &mut Vec<Event>,
    ) {
        let damage = self.combat.damage(role, level);
        let Some(target) = self.roster.get_mut(defender) else {
            return;
        };
        let died = target.take_damage(damage);
        let remaining_health = target.health;
        tracing::debug!(
            attacker = attacker.get(),
            defender = defender.get(),
            damage,
            remaining_health,
            "melee hit"
        );
        out_events.push(Event::ActorAttacked {
            attacker,
            defender,
            damage,
            remaining_health,
        });

        if died {
            tracing::info!(actor = defender.get(), name = %target.name, "actor died");
            out_events.push(Event::ActorDied { actor: defender });
        }
    }

    fn interact(&mut self, actor_id: ActorId, out_events: &mut Vec<Event>) {
        let Some(actor) = self.roster.get(actor_id).filter(|actor| actor.alive) else {
            return;
        };

        for neighbor in actor.position.neighbors4() {
            if self.roster.occupant_at(neighbor).is_some() {
                continue;
            }
            if let Some((before, after)) = traversal::toggle_interactable(&mut self.grid, neighbor)
            {
                out_events.push(Event::InteractableToggled {
                    at: neighbor,
                    from: before,
                    to: after,
                });
            }
        }
    }

    fn assign_path(&mut self, actor_id: ActorId, path: Vec<Position>, out_events: &mut Vec<Event>) {
        let Some(actor) = self
            .roster
            .get_mut(actor_id)
            .filter(|actor| actor.alive)
        else {
            return;
        };

        let connected = match path.first() {
            Some(first) => actor.position.direction_to(*first).is_some(),
            None => false,
        };
        if !connected {
            tracing::debug!(actor = actor_id.get(), "ignored disconnected path");
            if !actor.path.is_empty() {
                actor.path.clear();
                out_events.push(Event::PathCleared { actor: actor_id });
            }
            return;
        }

        let steps = path.len();
        self.debug_overlay.extend(path.iter().copied());
        actor.path = path.into();
        out_events.push(Event::PathAssigned {
            actor: actor_id,
            steps,
        });
    }

    fn clear_path(&mut self, actor_id: ActorId, out_events: &mut Vec<Event>) {
        if let Some(actor) = self.roster.get_mut(actor_id) {
            if !actor.path.is_empty() {
                actor.path.clear();
                out_events.push(Event::PathCleared { actor: actor_id });
            }
        }
    }

    fn set_behavior(&mut self, actor_id: ActorId, behavior: Behavior, out_events: &mut Vec<Event>) {
        let Some(actor) = self.roster.get_mut(actor_id) else {
            return;
        };
        if actor.role != Role::Enemy || actor.behavior == behavior {
            return;
        }
        actor.behavior = behavior;
        tracing::debug!(actor = actor_id.get(), ?behavior, "behavior changed");
        out_events.push(Event::BehaviorChanged {
            actor: actor_id,
            behavior,
        });
    }

    fn replace_visibility(&mut self, mask: VisibilityMask, out_events: &mut Vec<Event>) {
        if mask.dimensions() != self.grid.dimensions() {
            tracing::warn!(
                expected = ?self.grid.dimensions(),
                actual = ?mask.dimensions(),
                "ignored visibility mask with mismatched dimensions"
            );
            return;
        }
        let visible = mask.visible_count();
        self.visibility = mask;
        out_events.push(Event::VisibilityRefreshed { visible });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::BeginTick => world.begin_tick(out_events),
        Command::SpawnActor {
            role,
            profile,
            health,
            at,
        } => world.spawn(role, profile, health, at, out_events),
        Command::MoveActor { actor, to } => world.attempt_move(actor, to, out_events),
        Command::Interact { actor } => world.interact(actor, out_events),
        Command::AssignPath { actor, path } => world.assign_path(actor, path, out_events),
        Command::ClearPath { actor } => world.clear_path(actor, out_events),
        Command::SetBehavior { actor, behavior } => world.set_behavior(actor, behavior, out_events),
        Command::ReplaceVisibility { mask } => world.replace_visibility(mask, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::collections::BTreeSet;

    use tilecrawl_core::{
        ActorId, ActorSnapshot, Cell, CombatRules, DirectionMask, Position, VisibilityMask,
    };

    use super::{traversal, Grid, World};

    /// Provides read-only access to the level grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Cell at the position; out-of-bounds reads as solid wall.
    #[must_use]
    pub fn cell_at(world: &World, position: Position) -> Cell {
        world.grid.cell_at(position)
    }

    /// Reports whether an actor may currently enter the position.
    ///
    /// This is the single entry predicate used by movement, neighbour
    /// expansion and pathfinding.
    #[must_use]
    pub fn can_enter(world: &World, position: Position) -> bool {
        traversal::can_enter(&world.grid, &world.roster, position)
    }

    /// Enterable cardinal neighbours (north, east, south, west order) and the
    /// mask of directions they lie in.
    #[must_use]
    pub fn neighbors4(world: &World, position: Position) -> (Vec<Position>, DirectionMask) {
        traversal::neighbors4(&world.grid, &world.roster, position)
    }

    /// Living actor standing on the position, if any.
    #[must_use]
    pub fn occupant_at(world: &World, position: Position) -> Option<ActorSnapshot> {
        world.roster.occupant_at(position).map(|actor| actor.snapshot())
    }

    /// Snapshot of the player, if one has spawned.
    #[must_use]
    pub fn player(world: &World) -> Option<ActorSnapshot> {
        world.roster.player().map(|actor| actor.snapshot())
    }

    /// Snapshots of every enemy in roster order, including defeated enemies
    /// that have not been pruned yet.
    #[must_use]
    pub fn enemies(world: &World) -> Vec<ActorSnapshot> {
        world
            .roster
            .enemies()
            .iter()
            .map(|actor| actor.snapshot())
            .collect()
    }

    /// Identifiers of enemies that are still alive, in roster order.
    #[must_use]
    pub fn living_enemy_ids(world: &World) -> Vec<ActorId> {
        world
            .roster
            .enemies()
            .iter()
            .filter(|actor| actor.alive)
            .map(|actor| actor.id)
            .collect()
    }

    /// Snapshot of a single actor.
    #[must_use]
    pub fn actor(world: &World, id: ActorId) -> Option<ActorSnapshot> {
        world.roster.get(id).map(|actor| actor.snapshot())
    }

    /// Visibility overlay computed for the current tick.
    #[must_use]
    pub fn visibility(world: &World) -> &VisibilityMask {
        &world.visibility
    }

    /// Cells covered by enemy paths held or planned during the current tick.
    #[must_use]
    pub fn debug_overlay(world: &World) -> &BTreeSet<Position> {
        &world.debug_overlay
    }

    /// Number of ticks started so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Damage multipliers in force.
    #[must_use]
    pub fn combat_rules(world: &World) -> CombatRules {
        world.combat
    }

    /// Captures everything a presentation layer needs to draw a frame.
    #[must_use]
    pub fn level_view(world: &World) -> LevelView<'_> {
        LevelView {
            grid: &world.grid,
            player: player(world),
            enemies: enemies(world),
            visibility: &world.visibility,
            debug_overlay: &world.debug_overlay,
            tick: world.tick_index,
        }
    }

    /// Read-only view of the level handed to the presentation layer.
    #[derive(Clone, Debug)]
    pub struct LevelView<'a> {
        /// Level grid with current door and chest states.
        pub grid: &'a Grid,
        /// Player snapshot, if one has spawned.
        pub player: Option<ActorSnapshot>,
        /// Enemy snapshots in roster order.
        pub enemies: Vec<ActorSnapshot>,
        /// Visibility overlay for the current tick.
        pub visibility: &'a VisibilityMask,
        /// Debug overlay of planned enemy paths.
        pub debug_overlay: &'a BTreeSet<Position>,
        /// Index of the current tick.
        pub tick: u64,
    }
}
