// Plain-text board rendering for verbose diagnostics
//
// Legend: Y/y our head/body, E/e opponent head/body, * food, . empty.
// The top row is y = height - 1.

use std::collections::HashMap;

use crate::types::{Board, Coord};

pub fn render_board(board: &Board, own_id: &str) -> String {
    let mut cells: HashMap<Coord, char> = HashMap::new();

    for food in &board.food {
        cells.insert(*food, '*');
    }
    for snake in &board.snakes {
        let own = snake.id == own_id;
        // Tail first so a stacked head overwrites the segments beneath it
        for (i, segment) in snake.body.iter().enumerate().rev() {
            let glyph = match (own, i == 0) {
                (true, true) => 'Y',
                (true, false) => 'y',
                (false, true) => 'E',
                (false, false) => 'e',
            };
            cells.insert(*segment, glyph);
        }
    }

    let mut out = String::new();
    for y in (0..board.height).rev() {
        let row: Vec<String> = (0..board.width)
            .map(|x| cells.get(&Coord::new(x, y)).copied().unwrap_or('.').to_string())
            .collect();
        out.push_str(&row.join(" "));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Battlesnake;

    #[test]
    fn test_render_small_board() {
        let mut board = Board::new(3, 2);
        board.food.push(Coord::new(2, 1));
        board.snakes.push(Battlesnake::new(
            "me",
            100,
            vec![Coord::new(0, 1), Coord::new(0, 0)],
        ));
        board
            .snakes
            .push(Battlesnake::new("them", 100, vec![Coord::new(2, 0)]));

        assert_eq!(render_board(&board, "me"), "Y . *\ny . E\n");
    }
}
