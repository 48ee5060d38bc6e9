// Flood fill reachability and the per-direction space profile
//
// The flood fill never predicts tails vacating: every body segment of every
// snake on the current turn is a wall. The legality filter does vacate tails,
// so the two disagree about a tail cell on purpose.

use log::warn;
use std::collections::{HashSet, VecDeque};

use crate::types::{Board, BoardError, Coord, Direction, SpaceProfile, TurnState};

/// Every body segment (head inclusive) of every snake in the turn
pub fn blocked_cells(state: &TurnState) -> HashSet<Coord> {
    state
        .board
        .snakes
        .iter()
        .flat_map(|s| s.body.iter().copied())
        .chain(state.you.body.iter().copied())
        .collect()
}

/// Counts cells reachable from `start` by 4-directional steps without
/// leaving the board or entering a blocked cell. The start cell is counted.
/// Returns 0 when `start` is out of bounds or blocked.
pub fn count(board: &Board, start: Coord, blocked: &HashSet<Coord>) -> u32 {
    if !board.contains(&start) || blocked.contains(&start) {
        return 0;
    }

    let width = board.width as usize;
    let index = |c: &Coord| c.y as usize * width + c.x as usize;
    let mut visited = vec![false; width * board.height as usize];
    let mut queue = VecDeque::new();

    visited[index(&start)] = true;
    queue.push_back(start);
    let mut reached = 0;

    while let Some(cell) = queue.pop_front() {
        reached += 1;
        for next in cell.neighbors() {
            if !board.contains(&next) || blocked.contains(&next) {
                continue;
            }
            let i = index(&next);
            if !visited[i] {
                visited[i] = true;
                queue.push_back(next);
            }
        }
    }

    reached
}

/// Open space behind each of the four moves from our head.
/// Falls back to `fallback` in every direction when the board is malformed.
pub fn profile(state: &TurnState, fallback: u32) -> SpaceProfile {
    match try_profile(state) {
        Ok(space) => space,
        Err(e) => {
            warn!("Space profile unavailable ({}), assuming {} everywhere", e, fallback);
            SpaceProfile::splat(fallback)
        }
    }
}

fn try_profile(state: &TurnState) -> Result<SpaceProfile, BoardError> {
    let head = state.checked_head()?;
    let blocked = blocked_cells(state);

    Ok(SpaceProfile::from_fn(|dir: Direction| {
        let candidate = dir.apply(&head);
        if state.board.contains(&candidate) {
            count(state.board, candidate, &blocked)
        } else {
            0
        }
    }))
}
