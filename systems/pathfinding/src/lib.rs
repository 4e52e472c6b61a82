#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Grid search used by enemy planning: a breadth-first reachability sweep and
//! a Manhattan-guided shortest path search.
//!
//! Both searches walk the 4-connected grid with unit step cost and consult a
//! caller-supplied entry predicate, normally the world's `can_enter`. The
//! predicate must reject every cell outside the grid so the searches stay
//! finite.

use std::{
    cmp::Reverse,
    collections::{hash_map::Entry, BinaryHeap, HashMap, HashSet, VecDeque},
};

use tilecrawl_core::Position;

/// Cells reached by a breadth-first sweep together with their step distance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reachability {
    order: Vec<Position>,
    distances: HashMap<Position, u32>,
}

impl Reachability {
    /// Reached cells in discovery order, starting with the origin.
    #[must_use]
    pub fn cells(&self) -> &[Position] {
        &self.order
    }

    /// Number of steps from the origin, if the cell was reached.
    #[must_use]
    pub fn distance_to(&self, position: Position) -> Option<u32> {
        self.distances.get(&position).copied()
    }

    /// Reports whether the sweep reached the cell.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        self.distances.contains_key(&position)
    }
}

/// Visits every cell reachable from `start` exactly once.
///
/// Neighbours are expanded in north, east, south, west order, so the
/// discovery order is stable for a given grid. The start cell is always part
/// of the result even when the predicate rejects it, since actors stand on
/// their own cell.
pub fn reachable_from<F>(start: Position, mut is_enterable: F) -> Reachability
where
    F: FnMut(Position) -> bool,
{
    let mut reach = Reachability::default();
    let mut queue = VecDeque::new();

    let _ = reach.distances.insert(start, 0);
    reach.order.push(start);
    queue.push_back((start, 0_u32));

    while let Some((current, distance)) = queue.pop_front() {
        for neighbor in current.neighbors4() {
            if reach.distances.contains_key(&neighbor) || !is_enterable(neighbor) {
                continue;
            }
            let next = distance.saturating_add(1);
            let _ = reach.distances.insert(neighbor, next);
            reach.order.push(neighbor);
            queue.push_back((neighbor, next));
        }
    }

    reach
}

/// Finds a shortest route from `start` to `goal`.
///
/// The returned steps exclude `start` and end at `goal`; a start equal to the
/// goal yields an empty route. Every step, the goal included, must satisfy the
/// predicate; a pursuer that wants to end on an occupied cell has to admit
/// that cell in its own predicate. `None` means the goal is currently
/// unreachable.
///
/// Frontier entries are ordered by estimated total cost and then by the order
/// they were pushed, so equal-cost candidates expand first-discovered first.
pub fn shortest_path<F>(start: Position, goal: Position, mut is_enterable: F) -> Option<Vec<Position>>
where
    F: FnMut(Position) -> bool,
{
    if start == goal {
        return Some(Vec::new());
    }
    if !is_enterable(goal) {
        return None;
    }

    let mut frontier = BinaryHeap::new();
    let mut came_from: HashMap<Position, Position> = HashMap::new();
    let mut cost_so_far: HashMap<Position, u32> = HashMap::new();
    let mut expanded: HashSet<Position> = HashSet::new();
    let mut sequence: u64 = 0;

    let _ = cost_so_far.insert(start, 0);
    frontier.push(Reverse((start.manhattan_distance(goal), sequence, start)));

    while let Some(Reverse((_, _, current))) = frontier.pop() {
        if current == goal {
            return Some(reconstruct(&came_from, start, goal));
        }
        if !expanded.insert(current) {
            continue;
        }

        let current_cost = cost_so_far.get(&current).copied().unwrap_or(0);
        for neighbor in current.neighbors4() {
            if expanded.contains(&neighbor) {
                continue;
            }
            if !is_enterable(neighbor) {
                continue;
            }

            let cost = current_cost.saturating_add(1);
            match cost_so_far.entry(neighbor) {
                Entry::Occupied(mut known) if cost < *known.get() => {
                    let _ = known.insert(cost);
                }
                Entry::Occupied(_) => continue,
                Entry::Vacant(slot) => {
                    let _ = slot.insert(cost);
                }
            }
            let _ = came_from.insert(neighbor, current);

            sequence += 1;
            let priority = cost.saturating_add(neighbor.manhattan_distance(goal));
            frontier.push(Reverse((priority, sequence, neighbor)));
        }
    }

    None
}

fn reconstruct(
    came_from: &HashMap<Position, Position>,
    start: Position,
    goal: Position,
) -> Vec<Position> {
    let mut path = vec![goal];
    let mut current = goal;

    while let Some(&previous) = came_from.get(&current) {
        if previous == start {
            break;
        }
        path.push(previous);
        current = previous;
    }

    path.reverse();
    path
}
