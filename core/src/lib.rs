#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the tilecrawl simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Systems inspect the world through
//! read-only queries and respond with [`Command`] values describing desired
//! mutations. The world executes those commands via its `apply` entry point
//! and reports what actually happened as [`Event`] values, so every outcome of
//! a tick can be replayed and asserted on deterministically.

use serde::{Deserialize, Serialize};

/// Location of a single grid cell expressed as signed column and row values.
///
/// Coordinates are signed so that neighbours of edge cells remain
/// representable; the world treats anything outside the grid as solid wall.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    /// Creates a new position from column and row coordinates.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Zero-based column of the position.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Zero-based row of the position.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Position reached by taking a single step in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }

    /// Cardinal neighbours in north, east, south, west order.
    #[must_use]
    pub const fn neighbors4(self) -> [Position; 4] {
        [
            self.step(Direction::North),
            self.step(Direction::East),
            self.step(Direction::South),
            self.step(Direction::West),
        ]
    }

    /// Computes the Manhattan distance between two positions.
    #[must_use]
    pub fn manhattan_distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Computes the straight-line distance between two positions.
    #[must_use]
    pub fn euclidean_distance(self, other: Position) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        dx.hypot(dy)
    }

    /// Direction of a single cardinal step from `self` to `other`, if any.
    #[must_use]
    pub fn direction_to(self, other: Position) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|direction| self.step(*direction) == other)
    }
}

/// Cardinal directions available to actors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every cardinal direction in the canonical expansion order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Column and row delta produced by a single step.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// Bit recorded for the direction inside a [`DirectionMask`].
    ///
    /// West occupies bit 0, east bit 1, north bit 2 and south bit 3. The wall
    /// and door orientation tables are keyed by this layout.
    #[must_use]
    pub const fn bit(self) -> u8 {
        match self {
            Self::West => 1 << 0,
            Self::East => 1 << 1,
            Self::North => 1 << 2,
            Self::South => 1 << 3,
        }
    }
}

/// Four-bit set recording which cardinal directions satisfied a predicate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DirectionMask(u8);

impl DirectionMask {
    /// Mask with no directions recorded.
    pub const EMPTY: Self = Self(0);

    /// Builds a mask from raw bits, discarding anything above the low nibble.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x0f)
    }

    /// Raw bit pattern of the mask.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Records the provided direction.
    pub fn insert(&mut self, direction: Direction) {
        self.0 |= direction.bit();
    }

    /// Reports whether the provided direction is recorded.
    #[must_use]
    pub const fn contains(self, direction: Direction) -> bool {
        self.0 & direction.bit() != 0
    }
}

/// Orientation variant of a wall cell, derived from adjacent walls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallShape {
    /// Generic wall with no orientation applied.
    Solid,
    /// Wall end connected to the north.
    North,
    /// Wall end connected to the south.
    South,
    /// Wall end connected to the east.
    East,
    /// Wall end connected to the west.
    West,
    /// Corner joining north and east.
    NorthEast,
    /// Corner joining north and west.
    NorthWest,
    /// Corner joining south and east.
    SouthEast,
    /// Corner joining south and west.
    SouthWest,
    /// Straight vertical run.
    NorthSouth,
    /// Junction opening north, south and east.
    NorthSouthEast,
    /// Junction opening north, south and west.
    NorthSouthWest,
    /// Junction opening south, west and east.
    SouthWestEast,
    /// Junction opening north, west and east.
    NorthWestEast,
}

/// Axis along which a door panel spans.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DoorAxis {
    /// Door set into a vertical wall run; traffic crosses east to west.
    Vertical,
    /// Door set into a horizontal wall run; traffic crosses north to south.
    Horizontal,
}

/// Terrain or feature classification of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Empty space outside the playable area.
    Blank,
    /// Open floor.
    Floor,
    /// Solid wall with its derived orientation.
    Wall(WallShape),
    /// Hole in the floor.
    Hole,
    /// Door that can be opened and closed.
    Door {
        /// Axis the door spans.
        axis: DoorAxis,
        /// Whether the door currently lets actors through.
        open: bool,
    },
    /// Chest that can be opened exactly once.
    Chest {
        /// Whether the chest has been opened.
        open: bool,
    },
}

impl Cell {
    /// Cell reported for every coordinate outside the grid.
    pub const OUT_OF_BOUNDS: Cell = Cell::Wall(WallShape::Solid);

    /// Reports whether the cell is a wall of any orientation.
    #[must_use]
    pub const fn is_wall(self) -> bool {
        matches!(self, Self::Wall(_))
    }

    /// Reports whether the cell is a door in either state.
    #[must_use]
    pub const fn is_door(self) -> bool {
        matches!(self, Self::Door { .. })
    }

    /// Reports whether the cell blocks line of sight.
    #[must_use]
    pub const fn is_opaque(self) -> bool {
        self.is_wall()
    }

    /// Reports whether the terrain alone forbids entering the cell.
    #[must_use]
    pub const fn blocks_movement(self) -> bool {
        matches!(
            self,
            Self::Wall(_) | Self::Door { open: false, .. } | Self::Chest { open: false }
        )
    }

    /// Cell produced by interacting with this cell, if it is interactable.
    ///
    /// Doors flip between open and closed while keeping their axis. Chests
    /// only ever open; an open chest no longer reacts.
    #[must_use]
    pub const fn toggled(self) -> Option<Cell> {
        match self {
            Self::Door { axis, open } => Some(Self::Door { axis, open: !open }),
            Self::Chest { open: false } => Some(Self::Chest { open: true }),
            _ => None,
        }
    }

    /// Maps a character from a text level onto a cell.
    ///
    /// Unknown glyphs are treated as blank space.
    #[must_use]
    pub const fn from_glyph(glyph: char) -> Cell {
        match glyph {
            '.' => Self::Floor,
            '#' => Self::Wall(WallShape::Solid),
            'O' => Self::Hole,
            '+' => Self::Door {
                axis: DoorAxis::Vertical,
                open: false,
            },
            '/' => Self::Door {
                axis: DoorAxis::Vertical,
                open: true,
            },
            '$' => Self::Chest { open: false },
            '_' => Self::Chest { open: true },
            _ => Self::Blank,
        }
    }

    /// Character used to draw the cell in a text frame.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Blank => ' ',
            Self::Floor => '.',
            Self::Wall(_) => '#',
            Self::Hole => 'O',
            Self::Door { open: false, .. } => '+',
            Self::Door { open: true, .. } => '/',
            Self::Chest { open: false } => '$',
            Self::Chest { open: true } => '_',
        }
    }

    /// Maps a numeric tile code from a delimited level onto a cell.
    ///
    /// Codes follow the tile atlas numbering; unknown codes are blank.
    #[must_use]
    pub const fn from_tile_code(code: i32) -> Cell {
        match code {
            -1 => Self::Floor,
            8 => Self::Hole,
            42 => Self::Wall(WallShape::South),
            65 | 129 => Self::Wall(WallShape::Solid),
            64 | 67 => Self::Wall(WallShape::SouthWest),
            66 => Self::Wall(WallShape::SouthEast),
            68 => Self::Wall(WallShape::NorthWestEast),
            69 => Self::Wall(WallShape::NorthSouthEast),
            73 => Self::Wall(WallShape::East),
            74 => Self::Wall(WallShape::SouthWestEast),
            75 => Self::Wall(WallShape::West),
            96 | 98 => Self::Wall(WallShape::NorthSouth),
            106 => Self::Wall(WallShape::North),
            128 => Self::Wall(WallShape::NorthWest),
            130 => Self::Wall(WallShape::NorthEast),
            71 => Self::Door {
                axis: DoorAxis::Horizontal,
                open: false,
            },
            102 => Self::Door {
                axis: DoorAxis::Vertical,
                open: false,
            },
            224 => Self::Chest { open: false },
            226 => Self::Chest { open: true },
            _ => Self::Blank,
        }
    }
}

/// Unique identifier assigned to an actor by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(u32);

impl ActorId {
    /// Creates a new actor identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Side an actor fights for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// The single player-controlled character.
    Player,
    /// A computer-controlled opponent.
    Enemy,
}

impl Role {
    /// Reports whether actors of the two roles fight each other.
    #[must_use]
    pub const fn is_hostile_to(self, other: Role) -> bool {
        !matches!(
            (self, other),
            (Self::Player, Self::Player) | (Self::Enemy, Self::Enemy)
        )
    }
}

/// Decision state of an enemy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Behavior {
    /// Patrols random reachable points near its position.
    #[default]
    Wandering,
    /// Pursues the player every tick.
    Aggressive,
}

/// Display name and strength supplied by the external profile source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActorProfile {
    /// Name shown next to the actor.
    pub name: String,
    /// Numeric level driving melee damage.
    pub level: f64,
}

impl ActorProfile {
    /// Creates a new profile.
    #[must_use]
    pub fn new(name: impl Into<String>, level: f64) -> Self {
        Self {
            name: name.into(),
            level,
        }
    }
}

/// Damage multipliers applied per attacking role.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatRules {
    /// Multiplier applied to the player's level when it attacks.
    pub player_multiplier: f64,
    /// Multiplier applied to an enemy's level when it attacks.
    pub enemy_multiplier: f64,
}

impl CombatRules {
    /// Multiplier used by attackers of the provided role.
    #[must_use]
    pub const fn multiplier_for(&self, role: Role) -> f64 {
        match role {
            Role::Player => self.player_multiplier,
            Role::Enemy => self.enemy_multiplier,
        }
    }

    /// Damage dealt by an attacker: `floor(level * multiplier)`, never negative.
    #[must_use]
    pub fn damage(&self, role: Role, level: f64) -> i32 {
        let raw = (level * self.multiplier_for(role)).floor();
        if raw.is_nan() || raw <= 0.0 {
            0
        } else if raw >= f64::from(i32::MAX) {
            i32::MAX
        } else {
            raw as i32
        }
    }
}

impl Default for CombatRules {
    fn default() -> Self {
        Self {
            player_multiplier: 5.0,
            enemy_multiplier: 2.0,
        }
    }
}

/// Dense per-cell visibility flags shaped like the grid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisibilityMask {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl VisibilityMask {
    /// Creates a mask with every cell hidden.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let mut mask = Self::default();
        mask.reset(width, height);
        mask
    }

    /// Resizes the mask if needed and hides every cell.
    pub fn reset(&mut self, width: u32, height: u32) {
        let capacity = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        self.width = width;
        self.height = height;
        if self.cells.len() == capacity {
            self.cells.fill(false);
        } else {
            self.cells = vec![false; capacity];
        }
    }

    /// Marks the provided position visible. Returns `false` when out of bounds.
    pub fn mark(&mut self, position: Position) -> bool {
        match self.index(position) {
            Some(index) => {
                self.cells[index] = true;
                true
            }
            None => false,
        }
    }

    /// Reports whether the provided position is visible.
    #[must_use]
    pub fn is_visible(&self, position: Position) -> bool {
        self.index(position)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(false)
    }

    /// Number of visible cells.
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.cells.iter().filter(|visible| **visible).count()
    }

    /// Iterator over every visible position in row-major order.
    pub fn iter_visible(&self) -> impl Iterator<Item = Position> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, visible)| **visible)
            .filter_map(move |(index, _)| {
                let width = usize::try_from(width).ok().filter(|width| *width > 0)?;
                let x = i32::try_from(index % width).ok()?;
                let y = i32::try_from(index / width).ok()?;
                Some(Position::new(x, y))
            })
    }

    /// Provides the dimensions of the mask.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn index(&self, position: Position) -> Option<usize> {
        let x = u32::try_from(position.x()).ok()?;
        let y = u32::try_from(position.y()).ok()?;
        if x >= self.width || y >= self.height {
            return None;
        }
        let row = usize::try_from(y).ok()?;
        let column = usize::try_from(x).ok()?;
        let width = usize::try_from(self.width).ok()?;
        Some(row * width + column)
    }
}

/// Immutable representation of a single actor's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct ActorSnapshot {
    /// Identifier allocated to the actor by the world.
    pub id: ActorId,
    /// Side the actor fights for.
    pub role: Role,
    /// Display name supplied by the profile source.
    pub name: String,
    /// Numeric level supplied by the profile source.
    pub level: f64,
    /// Cell currently occupied by the actor.
    pub position: Position,
    /// Remaining health.
    pub health: i32,
    /// Whether the actor is still alive.
    pub alive: bool,
    /// Decision state; only enemies carry one.
    pub behavior: Option<Behavior>,
    /// Remaining steps of the held path, next step first.
    pub path: Vec<Position>,
}

/// Input the presentation layer forwards to the simulation each tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerCommand {
    /// Step or attack toward decreasing rows.
    Up,
    /// Step or attack toward increasing rows.
    Down,
    /// Step or attack toward decreasing columns.
    Left,
    /// Step or attack toward increasing columns.
    Right,
    /// Open or close adjacent doors and chests.
    Interact,
    /// Stop the simulation.
    Quit,
    /// No input this tick.
    Idle,
}

impl PlayerCommand {
    /// Direction of travel encoded by the command, if it is a movement.
    #[must_use]
    pub const fn direction(self) -> Option<Direction> {
        match self {
            Self::Up => Some(Direction::North),
            Self::Down => Some(Direction::South),
            Self::Left => Some(Direction::West),
            Self::Right => Some(Direction::East),
            Self::Interact | Self::Quit | Self::Idle => None,
        }
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Opens a new tick: prunes defeated enemies and rebuilds the debug overlay
    /// from the paths enemies still hold.
    BeginTick,
    /// Places a new actor on the grid.
    SpawnActor {
        /// Side the new actor fights for.
        role: Role,
        /// Name and level supplied by the profile source.
        profile: ActorProfile,
        /// Starting health.
        health: i32,
        /// Cell the actor should occupy.
        at: Position,
    },
    /// Attempts to move an actor onto an adjacent cell, attacking or
    /// interacting when the cell cannot be entered.
    MoveActor {
        /// Actor attempting the move.
        actor: ActorId,
        /// Cardinal neighbour the actor wants to enter.
        to: Position,
    },
    /// Toggles every door or chest adjacent to the actor.
    Interact {
        /// Actor performing the interaction.
        actor: ActorId,
    },
    /// Replaces the path held by an actor.
    AssignPath {
        /// Actor receiving the path.
        actor: ActorId,
        /// Steps to follow, first step first, start excluded.
        path: Vec<Position>,
    },
    /// Drops the path held by an actor.
    ClearPath {
        /// Actor whose path is dropped.
        actor: ActorId,
    },
    /// Changes an enemy's decision state.
    SetBehavior {
        /// Enemy whose state changes.
        actor: ActorId,
        /// New decision state.
        behavior: Behavior,
    },
    /// Replaces the visibility overlay with a freshly computed mask.
    ReplaceVisibility {
        /// Mask computed for the current tick.
        mask: VisibilityMask,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that a new tick began.
    TickStarted {
        /// Index of the tick that began.
        tick: u64,
    },
    /// Confirms that an actor was placed on the grid.
    ActorSpawned {
        /// Identifier assigned to the actor.
        actor: ActorId,
        /// Side the actor fights for.
        role: Role,
        /// Cell the actor occupies.
        at: Position,
    },
    /// Reports that a spawn request was rejected.
    SpawnRejected {
        /// Side of the rejected actor.
        role: Role,
        /// Cell requested for the spawn.
        at: Position,
        /// Specific reason the spawn failed.
        reason: SpawnError,
    },
    /// Confirms that an actor moved between two cells.
    ActorMoved {
        /// Actor that moved.
        actor: ActorId,
        /// Cell occupied before the move.
        from: Position,
        /// Cell occupied after the move.
        to: Position,
    },
    /// Reports that a move could neither proceed nor resolve into an action.
    MoveBlocked {
        /// Actor whose move was blocked.
        actor: ActorId,
        /// Cell the actor tried to enter.
        at: Position,
    },
    /// Confirms that an actor struck a hostile actor.
    ActorAttacked {
        /// Actor delivering the blow.
        attacker: ActorId,
        /// Actor receiving the blow.
        defender: ActorId,
        /// Damage dealt.
        damage: i32,
        /// Defender health after the blow.
        remaining_health: i32,
    },
    /// Announces that an actor's health reached zero.
    ActorDied {
        /// Actor that died.
        actor: ActorId,
    },
    /// Confirms that a defeated actor was pruned from the roster.
    ActorRemoved {
        /// Actor that was removed.
        actor: ActorId,
    },
    /// Confirms that a door or chest changed state.
    InteractableToggled {
        /// Cell that changed.
        at: Position,
        /// Cell before the interaction.
        from: Cell,
        /// Cell after the interaction.
        to: Cell,
    },
    /// Confirms that an actor received a new path.
    PathAssigned {
        /// Actor holding the path.
        actor: ActorId,
        /// Number of steps in the path.
        steps: usize,
    },
    /// Announces that an actor consumed the final step of its path.
    PathCompleted {
        /// Actor that arrived.
        actor: ActorId,
    },
    /// Confirms that an actor's path was dropped before arrival.
    PathCleared {
        /// Actor whose path was dropped.
        actor: ActorId,
    },
    /// Announces that an enemy changed decision state.
    BehaviorChanged {
        /// Enemy whose state changed.
        actor: ActorId,
        /// New decision state.
        behavior: Behavior,
    },
    /// Confirms that the visibility overlay was rebuilt.
    VisibilityRefreshed {
        /// Number of cells marked visible.
        visible: usize,
    },
}

/// Reasons a spawn request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnError {
    /// The requested cell cannot be entered.
    Impassable,
    /// The requested cell is blank space rather than part of the level.
    Blank,
    /// The requested cell already holds a living actor.
    Occupied,
    /// A player already exists.
    PlayerExists,
}
