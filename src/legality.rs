// Legality filter: which of the four moves do not immediately lose
//
// Checks applied to every direction, none short-circuits another:
// 1. the new head stays on the board
// 2. it does not hit our own body; our tail vacates unless we are about to eat
// 3. it does not hit an opponent's body; opponent tails vacate
// 4. no opponent of equal or greater length can reach the same cell

use log::warn;

use crate::config::LegalityConfig;
use crate::types::{Battlesnake, BoardError, Coord, Direction, LegalMoves, TurnState};

/// Computes the legality map for our snake. A malformed board yields no legal moves.
pub fn legal_moves(state: &TurnState, config: &LegalityConfig) -> LegalMoves {
    match try_legal_moves(state, config) {
        Ok(legal) => legal,
        Err(e) => {
            warn!("Legality unresolvable ({}), marking every move illegal", e);
            LegalMoves::splat(false)
        }
    }
}

fn try_legal_moves(state: &TurnState, config: &LegalityConfig) -> Result<LegalMoves, BoardError> {
    let head = state.checked_head()?;
    let own_length = state.you.len();
    let about_to_eat = state.food_adjacent_to(&head);

    Ok(LegalMoves::from_fn(|dir: Direction| {
        let candidate = dir.apply(&head);

        let mut legal = state.board.contains(&candidate);

        if hits_body(state.you, &candidate, !about_to_eat) {
            legal = false;
        }

        for opponent in state.opponents() {
            let tail_vacates = !config.respect_opponent_feeding
                || !opponent_about_to_eat(state, opponent);
            if hits_body(opponent, &candidate, tail_vacates) {
                legal = false;
            }
            if opponent.len() >= own_length && reachable_by_head(opponent, &candidate) {
                legal = false;
            }
        }

        legal
    }))
}

/// True when `cell` is one of the snake's segments. The last segment is ignored
/// when `tail_vacates`; the head (index 0) is never ignored.
fn hits_body(snake: &Battlesnake, cell: &Coord, tail_vacates: bool) -> bool {
    let last = snake.body.len().saturating_sub(1);
    snake
        .body
        .iter()
        .enumerate()
        .any(|(i, segment)| segment == cell && !(tail_vacates && i == last && i > 0))
}

fn opponent_about_to_eat(state: &TurnState, opponent: &Battlesnake) -> bool {
    opponent
        .head()
        .map(|h| state.food_adjacent_to(&h))
        .unwrap_or(false)
}

/// True when the snake's head is exactly one step from `cell`
fn reachable_by_head(snake: &Battlesnake, cell: &Coord) -> bool {
    snake.head().map(|h| h.manhattan(cell) == 1).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Board;

    fn snake(id: &str, body: &[(i32, i32)]) -> Battlesnake {
        Battlesnake::new(id, 100, body.iter().map(|&(x, y)| Coord::new(x, y)).collect())
    }

    fn default_config() -> LegalityConfig {
        LegalityConfig {
            respect_opponent_feeding: false,
        }
    }

    fn legal_for(board: &Board, you: &Battlesnake) -> LegalMoves {
        legal_moves(&TurnState::new(1, board, you), &default_config())
    }

    #[test]
    fn test_interior_cells_never_blocked_by_bounds() {
        let board = Board::new(5, 5);
        let you = snake("me", &[(2, 2)]);
        assert_eq!(legal_for(&board, &you), LegalMoves::splat(true));
    }

    #[test]
    fn test_corner_blocks_two_walls() {
        let board = Board::new(5, 5);
        let you = snake("me", &[(0, 0)]);
        let legal = legal_for(&board, &you);
        assert!(!legal.left);
        assert!(!legal.down);
        assert!(legal.up);
        assert!(legal.right);
    }

    #[test]
    fn test_own_neck_is_illegal_and_tail_vacates() {
        let mut board = Board::new(5, 5);
        // Head (1,1), neck (1,2), curling round so the tail sits left of the head
        let you = snake("me", &[(1, 1), (1, 2), (0, 2), (0, 1)]);
        board.snakes.push(you.clone());

        let legal = legal_for(&board, &you);
        assert!(!legal.up, "neck blocks up");
        assert!(legal.left, "tail vacates when not eating");
    }

    #[test]
    fn test_own_tail_blocks_when_food_adjacent() {
        let mut board = Board::new(5, 5);
        let you = snake("me", &[(1, 1), (1, 2), (0, 2), (0, 1)]);
        board.snakes.push(you.clone());
        board.food.push(Coord::new(2, 1));

        let legal = legal_for(&board, &you);
        assert!(!legal.left, "tail stays when about to grow");
    }

    #[test]
    fn test_opponent_tail_vacates() {
        let mut board = Board::new(7, 7);
        let you = snake("me", &[(3, 3), (3, 2)]);
        let opponent = snake("them", &[(5, 4), (4, 4), (4, 3)]);
        board.snakes.push(you.clone());
        board.snakes.push(opponent);

        let legal = legal_for(&board, &you);
        assert!(legal.right, "opponent tail at (4,3) vacates");
        // (3,4) is two steps from the opponent head
        assert!(legal.up);
    }

    #[test]
    fn test_opponent_tail_can_be_kept_when_it_feeds() {
        let mut board = Board::new(7, 7);
        let you = snake("me", &[(3, 3), (3, 2)]);
        let opponent = snake("them", &[(5, 4), (4, 4), (4, 3)]);
        board.snakes.push(you.clone());
        board.snakes.push(opponent);
        board.food.push(Coord::new(6, 4));

        let config = LegalityConfig {
            respect_opponent_feeding: true,
        };
        let legal = legal_moves(&TurnState::new(1, &board, &you), &config);
        assert!(!legal.right);
    }

    #[test]
    fn test_head_to_head_with_equal_length_is_illegal() {
        let mut board = Board::new(7, 7);
        let you = snake("me", &[(3, 3), (3, 2), (3, 1)]);
        let opponent = snake("them", &[(5, 3), (5, 2), (5, 1)]);
        board.snakes.push(you.clone());
        board.snakes.push(opponent);

        let legal = legal_for(&board, &you);
        assert!(!legal.right, "(4,3) is contested by an equal snake");
        assert!(legal.up);
        assert!(legal.left);
    }

    #[test]
    fn test_head_to_head_against_shorter_is_legal() {
        let mut board = Board::new(7, 7);
        let you = snake("me", &[(3, 3), (3, 2), (3, 1), (2, 1)]);
        let opponent = snake("them", &[(5, 3), (5, 2)]);
        board.snakes.push(you.clone());
        board.snakes.push(opponent);

        assert!(legal_for(&board, &you).right);
    }

    #[test]
    fn test_length_one_opponent_head_never_vacates() {
        let mut board = Board::new(5, 5);
        let you = snake("me", &[(2, 2), (2, 1), (2, 0)]);
        let opponent = snake("them", &[(3, 2)]);
        board.snakes.push(you.clone());
        board.snakes.push(opponent);

        assert!(!legal_for(&board, &you).right);
    }

    #[test]
    fn test_malformed_board_has_no_legal_moves() {
        let board = Board::new(-1, 5);
        let you = snake("me", &[(0, 0)]);
        assert!(!legal_for(&board, &you).any());
    }
}
