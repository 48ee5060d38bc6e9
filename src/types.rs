// Battlesnake API Types
// See https://docs.battlesnake.com/api

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::ops::{Index, IndexMut};

/// Game metadata including ID, ruleset, and timeout
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Game {
    pub id: String,
    #[serde(default)]
    pub ruleset: HashMap<String, Value>,
    #[serde(default)]
    pub timeout: u32,
    #[serde(default)]
    pub source: String,
}

impl Game {
    /// Creates game metadata with only an ID, as used by tests and replays
    pub fn with_id(id: &str) -> Self {
        Game {
            id: id.to_string(),
            ..Default::default()
        }
    }
}

/// Board state including dimensions, food, snakes, and hazards
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Board {
    pub height: i32,
    pub width: i32,
    #[serde(default)]
    pub food: Vec<Coord>,
    #[serde(default)]
    pub snakes: Vec<Battlesnake>,
    #[serde(default)]
    pub hazards: Vec<Coord>,
}

impl Board {
    /// Creates an empty board of the given size
    pub fn new(width: i32, height: i32) -> Self {
        Board {
            width,
            height,
            ..Default::default()
        }
    }

    /// True when the coordinate lies inside `[0,width) x [0,height)`
    pub fn contains(&self, coord: &Coord) -> bool {
        coord.x >= 0 && coord.x < self.width && coord.y >= 0 && coord.y < self.height
    }

    /// True when any snake body segment (head inclusive) sits on the coordinate
    pub fn is_occupied(&self, coord: &Coord) -> bool {
        self.snakes.iter().any(|s| s.body.contains(coord))
    }
}

/// Snake representation with all state information
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Battlesnake {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub health: i32,
    pub body: Vec<Coord>,
    #[serde(default)]
    pub head: Coord,
    #[serde(default)]
    pub length: i32,
    #[serde(default)]
    pub latency: String,
    #[serde(default)]
    pub shout: Option<String>,
}

impl Battlesnake {
    /// Builds a snake from its body, deriving head and length
    pub fn new(id: &str, health: i32, body: Vec<Coord>) -> Self {
        Battlesnake {
            id: id.to_string(),
            name: id.to_string(),
            health,
            head: body.first().copied().unwrap_or_default(),
            length: body.len() as i32,
            body,
            latency: "0".to_string(),
            shout: None,
        }
    }

    pub fn head(&self) -> Option<Coord> {
        self.body.first().copied()
    }

    pub fn tail(&self) -> Option<Coord> {
        self.body.last().copied()
    }

    /// Body length; the `length` field from the wire is not trusted
    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Direction of the last move, taken from the head and the segment behind it
    pub fn heading(&self) -> Option<Direction> {
        match self.body.as_slice() {
            [head, neck, ..] => Direction::between(neck, head),
            _ => None,
        }
    }
}

/// 2D coordinate on the board
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash, Default)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Coord { x, y }
    }

    /// Calculates Manhattan distance between two coordinates
    pub fn manhattan(&self, other: &Coord) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// The four orthogonal neighbours in up, down, left, right order
    pub fn neighbors(&self) -> [Coord; 4] {
        Direction::all().map(|dir| dir.apply(self))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Represents the four possible movement directions for a Battlesnake
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Returns all possible directions in the fixed evaluation order
    pub const fn all() -> [Direction; 4] {
        [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
    }

    /// Converts direction to string representation for API response
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Parses an API direction string
    pub fn parse(s: &str) -> Result<Direction, String> {
        match s.trim().to_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            _ => Err(format!("Invalid direction: {}", s)),
        }
    }

    /// Unit delta of this direction; up increases y
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Calculates the next coordinate when moving in this direction
    pub fn apply(&self, coord: &Coord) -> Coord {
        let (dx, dy) = self.delta();
        Coord {
            x: coord.x + dx,
            y: coord.y + dy,
        }
    }

    pub fn is_horizontal(&self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// Direction of a single step from `from` to `to`, if they differ
    pub fn between(from: &Coord, to: &Coord) -> Option<Direction> {
        if to.x > from.x {
            Some(Direction::Right)
        } else if to.x < from.x {
            Some(Direction::Left)
        } else if to.y > from.y {
            Some(Direction::Up)
        } else if to.y < from.y {
            Some(Direction::Down)
        } else {
            None
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value per direction, indexable by `Direction`
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirectionMap<T> {
    pub up: T,
    pub down: T,
    pub left: T,
    pub right: T,
}

impl<T: Copy> DirectionMap<T> {
    /// Same value in every direction
    pub fn splat(value: T) -> Self {
        DirectionMap {
            up: value,
            down: value,
            left: value,
            right: value,
        }
    }

    /// Builds a map by evaluating `f` for each direction in the fixed order
    pub fn from_fn(mut f: impl FnMut(Direction) -> T) -> Self {
        DirectionMap {
            up: f(Direction::Up),
            down: f(Direction::Down),
            left: f(Direction::Left),
            right: f(Direction::Right),
        }
    }

    /// Iterates `(direction, value)` pairs in up, down, left, right order
    pub fn iter(&self) -> impl Iterator<Item = (Direction, T)> + '_ {
        Direction::all().into_iter().map(move |dir| (dir, self[dir]))
    }
}

impl DirectionMap<bool> {
    /// Directions whose value is true, in the fixed order
    pub fn allowed(&self) -> Vec<Direction> {
        self.iter().filter(|&(_, ok)| ok).map(|(dir, _)| dir).collect()
    }

    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }
}

impl<T> Index<Direction> for DirectionMap<T> {
    type Output = T;

    fn index(&self, dir: Direction) -> &T {
        match dir {
            Direction::Up => &self.up,
            Direction::Down => &self.down,
            Direction::Left => &self.left,
            Direction::Right => &self.right,
        }
    }
}

impl<T> IndexMut<Direction> for DirectionMap<T> {
    fn index_mut(&mut self, dir: Direction) -> &mut T {
        match dir {
            Direction::Up => &mut self.up,
            Direction::Down => &mut self.down,
            Direction::Left => &mut self.left,
            Direction::Right => &mut self.right,
        }
    }
}

/// Per-direction legality, true when the move is immediately legal
pub type LegalMoves = DirectionMap<bool>;

/// Per-direction open space estimate from the flood fill
pub type SpaceProfile = DirectionMap<u32>;

/// Malformed input the engine refuses to reason about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    InvalidDimensions { width: i32, height: i32 },
    EmptyBody(String),
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::InvalidDimensions { width, height } => {
                write!(f, "invalid board dimensions {}x{}", width, height)
            }
            BoardError::EmptyBody(id) => write!(f, "snake '{}' has an empty body", id),
        }
    }
}

impl std::error::Error for BoardError {}

/// Complete game state received from the API
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GameState {
    pub game: Game,
    pub turn: i32,
    pub board: Board,
    pub you: Battlesnake,
}

impl GameState {
    pub fn view(&self) -> TurnState<'_> {
        TurnState::new(self.turn, &self.board, &self.you)
    }
}

/// Borrowed view of one turn, the only input the decision engine reads
#[derive(Debug, Clone, Copy)]
pub struct TurnState<'a> {
    pub turn: i32,
    pub board: &'a Board,
    pub you: &'a Battlesnake,
}

impl<'a> TurnState<'a> {
    pub fn new(turn: i32, board: &'a Board, you: &'a Battlesnake) -> Self {
        TurnState { turn, board, you }
    }

    /// Every snake on the board except our own, matched by ID
    pub fn opponents(&self) -> impl Iterator<Item = &'a Battlesnake> + 'a {
        let own_id = self.you.id.as_str();
        self.board
            .snakes
            .iter()
            .filter(move |s| s.id != own_id && !s.body.is_empty())
    }

    /// True when any food lies one step from the given head
    pub fn food_adjacent_to(&self, head: &Coord) -> bool {
        self.board.food.iter().any(|f| f.manhattan(head) == 1)
    }

    /// Checks the fields every engine component relies on and returns our head
    pub fn checked_head(&self) -> Result<Coord, BoardError> {
        if self.board.width <= 0 || self.board.height <= 0 {
            return Err(BoardError::InvalidDimensions {
                width: self.board.width,
                height: self.board.height,
            });
        }
        self.you.head().ok_or_else(|| BoardError::EmptyBody(self.you.id.clone()))
    }

    /// Nearest food to a position, first listed wins ties
    pub fn nearest_food(&self, from: &Coord) -> Option<Coord> {
        self.board
            .food
            .iter()
            .copied()
            .min_by_key(|f| f.manhattan(from))
    }
}
