use tilecrawl_core::{ActorId, ActorProfile, Behavior, Cell, CombatRules, Command, Event, Position, Role};
use tilecrawl_system_enemy_ai::{Config, EnemyAi};
use tilecrawl_world::{self as world, Grid, World};

fn spawn(world: &mut World, role: Role, at: Position) -> ActorId {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::SpawnActor {
            role,
            profile: ActorProfile::new("actor", 2.0),
            health: 30,
            at,
        },
        &mut events,
    );
    match events.as_slice() {
        [Event::ActorSpawned { actor, .. }] => *actor,
        other => panic!("unexpected spawn events: {other:?}"),
    }
}

fn open_world(player: Position, enemy: Position) -> (World, ActorId) {
    let grid = Grid::filled(30, 5, Cell::Floor).expect("grid builds");
    let mut world = World::new(grid, CombatRules::default());
    let _ = spawn(&mut world, Role::Player, player);
    let enemy = spawn(&mut world, Role::Enemy, enemy);
    (world, enemy)
}

fn assigned_path(commands: &[Command]) -> Option<&[Position]> {
    commands.iter().find_map(|command| match command {
        Command::AssignPath { path, .. } => Some(path.as_slice()),
        _ => None,
    })
}

#[test]
fn distant_enemy_patrols_within_its_radius() {
    let enemy_at = Position::new(5, 2);
    let (world, enemy) = open_world(Position::new(15, 2), enemy_at);
    let mut ai = EnemyAi::new(Config::new(5.0, 10), 7);

    let mut commands = Vec::new();
    ai.handle(&world, enemy, &mut commands);

    assert!(!commands
        .iter()
        .any(|command| matches!(command, Command::SetBehavior { .. })));
    let path = assigned_path(&commands).expect("patrol route planned");
    let target = *path.last().expect("route is not empty");
    assert!(enemy_at.euclidean_distance(target) <= 10.0);
    assert_ne!(target, enemy_at);
    assert_eq!(
        commands.last(),
        Some(&Command::MoveActor {
            actor: enemy,
            to: path[0],
        })
    );
}

#[test]
fn nearby_player_triggers_pursuit() {
    let player_at = Position::new(9, 2);
    let (world, enemy) = open_world(player_at, Position::new(5, 2));
    let mut ai = EnemyAi::new(Config::new(5.0, 10), 7);

    let mut commands = Vec::new();
    ai.handle(&world, enemy, &mut commands);

    assert_eq!(
        commands.first(),
        Some(&Command::SetBehavior {
            actor: enemy,
            behavior: Behavior::Aggressive,
        })
    );
    let path = assigned_path(&commands).expect("pursuit route planned");
    assert_eq!(path.last(), Some(&player_at));
    assert_eq!(path.len(), 4);
}

#[test]
fn adjacent_enemy_attacks_instead_of_planning() {
    let player_at = Position::new(6, 2);
    let (world, enemy) = open_world(player_at, Position::new(5, 2));
    let mut ai = EnemyAi::new(Config::default(), 1);

    let mut commands = Vec::new();
    ai.handle(&world, enemy, &mut commands);

    assert_eq!(
        commands,
        vec![
            Command::SetBehavior {
                actor: enemy,
                behavior: Behavior::Aggressive,
            },
            Command::MoveActor {
                actor: enemy,
                to: player_at,
            },
        ]
    );
}

#[test]
fn unreachable_player_returns_enemy_to_patrol() {
    let rows = ["..#..", "..#..", "..#.."];
    let grid = Grid::from_rows(rows.iter().map(|row| row.chars().map(Cell::from_glyph)))
        .expect("grid builds");
    let mut world = World::new(grid, CombatRules::default());
    let _ = spawn(&mut world, Role::Player, Position::new(3, 1));
    let enemy = spawn(&mut world, Role::Enemy, Position::new(1, 1));
    let mut ai = EnemyAi::new(Config::default(), 3);

    let mut commands = Vec::new();
    ai.handle(&world, enemy, &mut commands);

    assert_eq!(
        commands,
        vec![
            Command::SetBehavior {
                actor: enemy,
                behavior: Behavior::Aggressive,
            },
            Command::SetBehavior {
                actor: enemy,
                behavior: Behavior::Wandering,
            },
            Command::ClearPath { actor: enemy },
        ]
    );
}

#[test]
fn wandering_enemy_follows_its_held_route() {
    let (mut world, enemy) = open_world(Position::new(25, 2), Position::new(5, 2));
    let mut ai = EnemyAi::new(Config::default(), 11);

    let mut commands = Vec::new();
    ai.handle(&world, enemy, &mut commands);
    let planned = assigned_path(&commands).expect("patrol planned").to_vec();

    let mut events = Vec::new();
    for command in commands.drain(..) {
        world::apply(&mut world, command, &mut events);
    }
    if planned.len() < 2 {
        return;
    }

    ai.handle(&world, enemy, &mut commands);
    assert_eq!(
        commands,
        vec![Command::MoveActor {
            actor: enemy,
            to: planned[1],
        }]
    );
}

#[test]
fn same_seed_makes_same_patrol_choices() {
    let (world, enemy) = open_world(Position::new(25, 2), Position::new(5, 2));

    let choices = |seed| {
        let mut ai = EnemyAi::new(Config::default(), seed);
        let mut commands = Vec::new();
        ai.handle(&world, enemy, &mut commands);
        commands
    };

    assert_eq!(choices(42), choices(42));
}
