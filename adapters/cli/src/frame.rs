use std::fmt::Write as _;

use tilecrawl_core::{ActorSnapshot, Behavior, Cell, Position};
use tilecrawl_world::query::LevelView;

/// Draws the level as text, one character per cell.
///
/// Cells outside the player's sight are dimmed to `:` when they are floor
/// and enemies standing there are hidden. With `show_paths` set, planned
/// enemy routes are drawn as `*`.
pub(crate) fn render(view: &LevelView<'_>, show_paths: bool) -> String {
    let (width, height) = view.grid.dimensions();
    let capacity = (width as usize + 1) * height as usize + 64;
    let mut frame = String::with_capacity(capacity);

    for (y, row) in view.grid.rows().enumerate() {
        for (x, cell) in row.iter().enumerate() {
            let position = Position::new(x as i32, y as i32);
            frame.push(glyph_at(view, position, *cell, show_paths));
        }
        frame.push('\n');
    }

    let _ = write!(frame, "tick {}", view.tick);
    if let Some(player) = &view.player {
        let _ = write!(frame, " | {} hp {}", player.name, player.health.max(0));
    }
    let living = view.enemies.iter().filter(|enemy| enemy.alive).count();
    let _ = writeln!(frame, " | enemies {living}");
    frame
}

fn glyph_at(view: &LevelView<'_>, position: Position, cell: Cell, show_paths: bool) -> char {
    let visible = view.visibility.is_visible(position);

    if let Some(player) = view.player.as_ref().filter(|player| player.position == position) {
        return if player.alive { '@' } else { '%' };
    }
    if visible {
        if let Some(enemy) = living_enemy_at(&view.enemies, position) {
            return match enemy.behavior {
                Some(Behavior::Aggressive) => 'E',
                _ => 'e',
            };
        }
    }
    if show_paths && view.debug_overlay.contains(&position) {
        return '*';
    }
    match cell {
        Cell::Floor if !visible => ':',
        other => other.glyph(),
    }
}

fn living_enemy_at(enemies: &[ActorSnapshot], position: Position) -> Option<&ActorSnapshot> {
    enemies
        .iter()
        .find(|enemy| enemy.alive && enemy.position == position)
}

#[cfg(test)]
mod tests {
    use tilecrawl_core::{ActorProfile, CombatRules, Command, Role, VisibilityMask};
    use tilecrawl_world::{self as world, query, Grid, World};

    use super::*;

    fn world_with_actors() -> World {
        let grid = Grid::from_rows([
            "#....#".chars().map(Cell::from_glyph),
        ])
        .expect("grid builds");
        let mut world = World::new(grid, CombatRules::default());
        let mut events = Vec::new();
        for (role, x) in [(Role::Player, 1), (Role::Enemy, 4)] {
            world::apply(
                &mut world,
                Command::SpawnActor {
                    role,
                    profile: ActorProfile::new("ada", 1.0),
                    health: 10,
                    at: Position::new(x, 0),
                },
                &mut events,
            );
        }
        world
    }

    #[test]
    fn hidden_cells_are_dimmed_and_hide_enemies() {
        let world = world_with_actors();
        let frame = render(&query::level_view(&world), false);
        assert_eq!(frame, "#@:::#\ntick 0 | ada hp 10 | enemies 1\n");
    }

    #[test]
    fn visible_enemies_and_paths_are_drawn() {
        let mut world = world_with_actors();
        let mut mask = VisibilityMask::new(6, 1);
        for x in 0..6 {
            let _ = mask.mark(Position::new(x, 0));
        }
        let enemy = query::enemies(&world)[0].id;
        let mut events = Vec::new();
        world::apply(&mut world, Command::ReplaceVisibility { mask }, &mut events);
        world::apply(
            &mut world,
            Command::AssignPath {
                actor: enemy,
                path: vec![Position::new(3, 0), Position::new(2, 0)],
            },
            &mut events,
        );

        let frame = render(&query::level_view(&world), true);
        assert_eq!(frame.lines().next(), Some("#@**e#"));
    }
}
