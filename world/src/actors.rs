//! Player and enemy state owned by the world.

use std::collections::VecDeque;

use tilecrawl_core::{ActorId, ActorProfile, ActorSnapshot, Behavior, Position, Role};

#[derive(Clone, Debug)]
pub(crate) struct Actor {
    pub(crate) id: ActorId,
    pub(crate) role: Role,
    pub(crate) name: String,
    pub(crate) level: f64,
    pub(crate) position: Position,
    pub(crate) health: i32,
    pub(crate) alive: bool,
    pub(crate) behavior: Behavior,
    pub(crate) path: VecDeque<Position>,
}

impl Actor {
    fn new(id: ActorId, role: Role, profile: ActorProfile, health: i32, at: Position) -> Self {
        Self {
            id,
            role,
            name: profile.name,
            level: profile.level,
            position: at,
            health,
            alive: health > 0,
            behavior: Behavior::default(),
            path: VecDeque::new(),
        }
    }

    /// Applies damage and reports whether this blow killed the actor.
    pub(crate) fn take_damage(&mut self, damage: i32) -> bool {
        self.health = self.health.saturating_sub(damage);
        if self.alive && self.health <= 0 {
            self.alive = false;
            self.path.clear();
            return true;
        }
        false
    }

    pub(crate) fn next_step(&self) -> Option<Position> {
        self.path.front().copied()
    }

    pub(crate) fn snapshot(&self) -> ActorSnapshot {
        ActorSnapshot {
            id: self.id,
            role: self.role,
            name: self.name.clone(),
            level: self.level,
            position: self.position,
            health: self.health,
            alive: self.alive,
            behavior: match self.role {
                Role::Enemy => Some(self.behavior),
                Role::Player => None,
            },
            path: self.path.iter().copied().collect(),
        }
    }
}

/// The single player plus the ordered enemy list.
///
/// Enemies keep spawn order; defeated enemies stay in place until the next
/// prune so iteration over the roster is never invalidated mid-tick.
#[derive(Clone, Debug, Default)]
pub(crate) struct Roster {
    player: Option<Actor>,
    enemies: Vec<Actor>,
    next_id: u32,
}

impl Roster {
    pub(crate) fn player(&self) -> Option<&Actor> {
        self.player.as_ref()
    }

    pub(crate) fn enemies(&self) -> &[Actor] {
        &self.enemies
    }

    /// Player first, then enemies in roster order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.player.iter().chain(self.enemies.iter())
    }

    pub(crate) fn get(&self, id: ActorId) -> Option<&Actor> {
        self.iter().find(|actor| actor.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.player
            .iter_mut()
            .chain(self.enemies.iter_mut())
            .find(|actor| actor.id == id)
    }

    /// Living actor standing on the position, found by linear scan.
    pub(crate) fn occupant_at(&self, position: Position) -> Option<&Actor> {
        self.iter()
            .find(|actor| actor.alive && actor.position == position)
    }

    pub(crate) fn living_count_at(&self, position: Position) -> usize {
        self.iter()
            .filter(|actor| actor.alive && actor.position == position)
            .count()
    }

    pub(crate) fn insert(
        &mut self,
        role: Role,
        profile: ActorProfile,
        health: i32,
        at: Position,
    ) -> ActorId {
        let id = ActorId::new(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        let actor = Actor::new(id, role, profile, health, at);
        match role {
            Role::Player => self.player = Some(actor),
            Role::Enemy => self.enemies.push(actor),
        }
        id
    }

    /// Removes defeated enemies, returning their identifiers in roster order.
    pub(crate) fn prune_dead_enemies(&mut self) -> Vec<ActorId> {
        let removed: Vec<ActorId> = self
            .enemies
            .iter()
            .filter(|enemy| !enemy.alive)
            .map(|enemy| enemy.id)
            .collect();
        self.enemies.retain(|enemy| enemy.alive);
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str) -> ActorProfile {
        ActorProfile::new(name, 1.0)
    }

    #[test]
    fn identifiers_are_allocated_in_spawn_order() {
        let mut roster = Roster::default();
        let player = roster.insert(Role::Player, profile("hero"), 10, Position::new(0, 0));
        let first = roster.insert(Role::Enemy, profile("rat"), 10, Position::new(1, 0));
        let second = roster.insert(Role::Enemy, profile("bat"), 10, Position::new(2, 0));

        assert_eq!(player, ActorId::new(0));
        assert_eq!(first, ActorId::new(1));
        assert_eq!(second, ActorId::new(2));
        let order: Vec<_> = roster.iter().map(|actor| actor.id).collect();
        assert_eq!(order, vec![player, first, second]);
    }

    #[test]
    fn dead_actors_do_not_occupy_cells() {
        let mut roster = Roster::default();
        let rat = roster.insert(Role::Enemy, profile("rat"), 10, Position::new(1, 0));
        assert!(roster.occupant_at(Position::new(1, 0)).is_some());

        let died = roster.get_mut(rat).expect("rat exists").take_damage(10);
        assert!(died);
        assert!(roster.occupant_at(Position::new(1, 0)).is_none());
        assert!(roster.get(rat).is_some(), "dead enemies linger until pruned");

        assert_eq!(roster.prune_dead_enemies(), vec![rat]);
        assert!(roster.get(rat).is_none());
    }

    #[test]
    fn damage_only_reports_the_killing_blow() {
        let mut roster = Roster::default();
        let rat = roster.insert(Role::Enemy, profile("rat"), 5, Position::new(0, 0));
        let actor = roster.get_mut(rat).expect("rat exists");
        assert!(!actor.take_damage(3));
        assert!(actor.take_damage(3));
        assert!(!actor.take_damage(3));
        assert_eq!(actor.health, -4);
    }
}
