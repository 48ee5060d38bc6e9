// Anti-self-trapping: zigzag across our last heading, and for long snakes
// escape towards the move that leaves the most exits open

use log::debug;
use std::collections::HashSet;

use crate::config::AntiTrapConfig;
use crate::floodfill::blocked_cells;
use crate::types::{Coord, Direction, LegalMoves, SpaceProfile, TurnState};

const VERTICAL: [Direction; 2] = [Direction::Up, Direction::Down];
const HORIZONTAL: [Direction; 2] = [Direction::Left, Direction::Right];

/// Suggests a move that keeps us from boxing ourselves in
pub fn avoid_trap(
    state: &TurnState,
    legal: &LegalMoves,
    space: &SpaceProfile,
    config: &AntiTrapConfig,
) -> Option<Direction> {
    let head = state.you.head()?;
    let length = state.you.len();

    if length >= config.escape_min_length {
        if let Some(dir) = escape_move(state, head, legal, space, config) {
            debug!("Anti-trap: escape {}", dir);
            return Some(dir);
        }
    }

    let (primary, secondary) = axis_preference(state);

    let mut best: Option<(Direction, u32)> = None;
    for dir in primary.into_iter().chain(secondary) {
        if legal[dir] && space[dir] > best.map_or(0, |(_, s)| s) {
            best = Some((dir, space[dir]));
        }
    }

    let min_space = config
        .min_space_cap
        .min(length as u32 / config.min_space_divisor);
    match best {
        Some((dir, open)) if open > min_space => {
            debug!("Anti-trap: zigzag {} ({} open)", dir, open);
            Some(dir)
        }
        _ => None,
    }
}

/// Perpendicular to our last heading first; without a heading the axis flips every two turns
fn axis_preference(state: &TurnState) -> ([Direction; 2], [Direction; 2]) {
    match state.you.heading() {
        Some(last) if last.is_horizontal() => (VERTICAL, HORIZONTAL),
        Some(_) => (HORIZONTAL, VERTICAL),
        None if (state.turn / 2) % 2 == 0 => (HORIZONTAL, VERTICAL),
        None => (VERTICAL, HORIZONTAL),
    }
}

/// Best escape-scored legal move, returned only when the options differ sharply
fn escape_move(
    state: &TurnState,
    head: Coord,
    legal: &LegalMoves,
    space: &SpaceProfile,
    config: &AntiTrapConfig,
) -> Option<Direction> {
    let blocked = blocked_cells(state);
    let scores: Vec<(Direction, u32)> = legal
        .allowed()
        .into_iter()
        .map(|dir| {
            let exits = exits_from(state, &dir.apply(&head), &blocked);
            (dir, exits * config.escape_route_weight + space[dir])
        })
        .collect();

    let worst = scores.iter().map(|&(_, s)| s).min()?;
    let mut best = scores[0];
    for &(dir, score) in &scores[1..] {
        if score > best.1 {
            best = (dir, score);
        }
    }

    if best.1 - worst > config.escape_spread {
        Some(best.0)
    } else {
        None
    }
}

/// Orthogonal neighbours of `cell` that are on the board and unoccupied
fn exits_from(state: &TurnState, cell: &Coord, blocked: &HashSet<Coord>) -> u32 {
    cell.neighbors()
        .into_iter()
        .filter(|n| state.board.contains(n) && !blocked.contains(n))
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::types::{Battlesnake, Board};

    fn snake(id: &str, body: &[(i32, i32)]) -> Battlesnake {
        Battlesnake::new(id, 100, body.iter().map(|&(x, y)| Coord::new(x, y)).collect())
    }

    fn config() -> AntiTrapConfig {
        Config::default_hardcoded().anti_trap
    }

    #[test]
    fn test_zigzags_perpendicular_to_vertical_heading() {
        let mut board = Board::new(11, 11);
        let you = snake("me", &[(5, 5), (5, 4), (5, 3), (5, 2), (5, 1)]);
        board.snakes.push(you.clone());
        let state = TurnState::new(7, &board, &you);

        let space = SpaceProfile {
            up: 60,
            down: 0,
            left: 40,
            right: 45,
        };
        let mut legal = LegalMoves::splat(true);
        legal.down = false;
        // Horizontal is primary, but up still wins on raw space
        assert_eq!(avoid_trap(&state, &legal, &space, &config()), Some(Direction::Up));

        let space = SpaceProfile {
            up: 45,
            down: 0,
            left: 45,
            right: 40,
        };
        // Ties go to the primary axis
        assert_eq!(avoid_trap(&state, &legal, &space, &config()), Some(Direction::Left));
    }

    #[test]
    fn test_axis_alternates_with_turn_without_heading() {
        let board = Board::new(11, 11);
        let you = snake("me", &[(5, 5)]);

        let (primary, _) = axis_preference(&TurnState::new(0, &board, &you));
        assert_eq!(primary, HORIZONTAL);
        let (primary, _) = axis_preference(&TurnState::new(1, &board, &you));
        assert_eq!(primary, HORIZONTAL);
        let (primary, _) = axis_preference(&TurnState::new(2, &board, &you));
        assert_eq!(primary, VERTICAL);
        let (primary, _) = axis_preference(&TurnState::new(4, &board, &you));
        assert_eq!(primary, HORIZONTAL);
    }

    #[test]
    fn test_requires_minimum_space() {
        let board = Board::new(11, 11);
        let you = snake("me", &[(5, 5), (5, 4), (5, 3), (5, 2), (5, 1), (5, 0)]);
        let state = TurnState::new(7, &board, &you);
        // Length 6 needs more than 2 open cells
        let space = SpaceProfile::splat(2);
        assert_eq!(avoid_trap(&state, &LegalMoves::splat(true), &space, &config()), None);
        let space = SpaceProfile::splat(3);
        assert_eq!(
            avoid_trap(&state, &LegalMoves::splat(true), &space, &config()),
            Some(Direction::Left)
        );
    }

    #[test]
    fn test_long_snake_escapes_toward_open_side() {
        let mut board = Board::new(11, 11);
        // Length 8, heading up along x=1 next to the left wall
        let you = snake(
            "me",
            &[(1, 8), (1, 7), (1, 6), (1, 5), (1, 4), (1, 3), (1, 2), (1, 1)],
        );
        board.snakes.push(you.clone());
        let state = TurnState::new(7, &board, &you);

        let mut legal = LegalMoves::splat(true);
        legal.down = false;
        let space = SpaceProfile {
            up: 20,
            down: 0,
            left: 9,
            right: 100,
        };
        assert_eq!(avoid_trap(&state, &legal, &space, &config()), Some(Direction::Right));
    }

    #[test]
    fn test_escape_needs_a_clear_spread() {
        let mut board = Board::new(11, 11);
        let you = snake(
            "me",
            &[(5, 8), (5, 7), (5, 6), (5, 5), (5, 4), (5, 3), (5, 2), (5, 1)],
        );
        board.snakes.push(you.clone());
        let state = TurnState::new(7, &board, &you);

        let mut legal = LegalMoves::splat(true);
        legal.down = false;
        let space = SpaceProfile::splat(50);
        // Every exit count is 3, so there is no escape preference; zigzag picks left
        assert_eq!(escape_move(&state, Coord::new(5, 8), &legal, &space, &config()), None);
        assert_eq!(avoid_trap(&state, &legal, &space, &config()), Some(Direction::Left));
    }
}
