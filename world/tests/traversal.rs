use proptest::prelude::*;
use tilecrawl_core::{ActorProfile, Cell, CombatRules, Command, Event, Position, Role};
use tilecrawl_world::{self as world, query, Grid, World};

const LEVEL: [&str; 6] = [
    "  #######",
    "  #..$..#",
    "###.#O..#",
    "#...+...#",
    "#_..#...#",
    "#########",
];

fn level() -> World {
    let grid = Grid::from_rows(LEVEL.iter().map(|row| row.chars().map(Cell::from_glyph)))
        .expect("level builds");
    World::new(grid, CombatRules::default())
}

fn spawn(world: &mut World, role: Role, at: Position) {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::SpawnActor {
            role,
            profile: ActorProfile::new("walker", 1.0),
            health: 10,
            at,
        },
        &mut events,
    );
    assert!(
        matches!(events.as_slice(), [Event::ActorSpawned { .. }]),
        "spawn failed: {events:?}"
    );
}

#[test]
fn neighbours_agree_with_entry_predicate() {
    let mut world = level();
    spawn(&mut world, Role::Enemy, Position::new(6, 3));

    for position in query::grid(&world).positions().collect::<Vec<_>>() {
        let (neighbors, mask) = query::neighbors4(&world, position);
        let expected: Vec<_> = position
            .neighbors4()
            .into_iter()
            .filter(|neighbor| query::can_enter(&world, *neighbor))
            .collect();
        assert_eq!(neighbors, expected, "neighbour mismatch at {position:?}");
        assert_eq!(mask.bits().count_ones() as usize, neighbors.len());
    }
}

#[test]
fn player_walks_through_door_after_opening_it() {
    let mut world = level();
    spawn(&mut world, Role::Player, Position::new(3, 3));
    let player = query::player(&world).expect("player spawned").id;

    let mut events = Vec::new();
    for _ in 0..2 {
        world::apply(
            &mut world,
            Command::MoveActor {
                actor: player,
                to: Position::new(4, 3),
            },
            &mut events,
        );
    }

    assert!(matches!(
        events.as_slice(),
        [
            Event::InteractableToggled { .. },
            Event::ActorMoved { .. }
        ]
    ));
    assert_eq!(
        query::player(&world).map(|snapshot| snapshot.position),
        Some(Position::new(4, 3))
    );
}

#[test]
fn level_view_reports_current_state() {
    let mut world = level();
    spawn(&mut world, Role::Player, Position::new(1, 3));
    spawn(&mut world, Role::Enemy, Position::new(7, 1));

    let view = query::level_view(&world);
    assert_eq!(view.grid.dimensions(), (9, 6));
    assert_eq!(view.enemies.len(), 1);
    assert_eq!(
        view.player.map(|snapshot| snapshot.position),
        Some(Position::new(1, 3))
    );
    assert_eq!(view.tick, 0);
    assert_eq!(view.visibility.visible_count(), 0);
}

proptest! {
    #[test]
    fn out_of_bounds_is_never_enterable(x in -50i32..50, y in -50i32..50) {
        let world = level();
        let grid = query::grid(&world);
        let position = Position::new(x, y);
        if !grid.contains(position) {
            prop_assert!(!query::can_enter(&world, position));
            prop_assert_eq!(query::cell_at(&world, position), Cell::OUT_OF_BOUNDS);
        }
    }

    #[test]
    fn living_actors_never_share_a_cell(moves in prop::collection::vec(0usize..4, 0..40)) {
        let mut world = level();
        spawn(&mut world, Role::Player, Position::new(1, 3));
        spawn(&mut world, Role::Enemy, Position::new(2, 3));
        spawn(&mut world, Role::Enemy, Position::new(6, 2));

        let mut actors: Vec<_> = query::enemies(&world).iter().map(|enemy| enemy.id).collect();
        actors.extend(query::player(&world).map(|player| player.id));

        let mut events = Vec::new();
        for (step, direction) in moves.into_iter().enumerate() {
            let actor = actors[step % actors.len()];
            let Some(snapshot) = query::actor(&world, actor) else {
                continue;
            };
            let to = snapshot.position.neighbors4()[direction];
            world::apply(&mut world, Command::MoveActor { actor, to }, &mut events);

            let mut occupied: Vec<_> = query::enemies(&world)
                .into_iter()
                .chain(query::player(&world))
                .filter(|snapshot| snapshot.alive)
                .map(|snapshot| snapshot.position)
                .collect();
            let living = occupied.len();
            occupied.sort();
            occupied.dedup();
            prop_assert_eq!(occupied.len(), living);
        }
    }
}
