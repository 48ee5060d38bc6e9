// Predation: hunt opponents that are shorter or starving
//
// Order of attempts:
// 1. head-to-head opening against a diagonally adjacent shorter snake when we
//    clearly outgrow the whole field
// 2. ambush at the food a hungry target is heading for
// 3. direct pursuit of the target's predicted next head

use log::debug;

use crate::config::PredationConfig;
use crate::types::{Battlesnake, Coord, Direction, LegalMoves, SpaceProfile, TurnState};

/// An opponent selected for hunting
#[derive(Debug, Clone, Copy)]
struct Target<'a> {
    snake: &'a Battlesnake,
    head: Coord,
    distance: i32,
    score: f64,
}

/// Suggests a hunting move, or `None` when hunting is off or nothing is worth chasing
pub fn hunt(
    state: &TurnState,
    legal: &LegalMoves,
    space: &SpaceProfile,
    config: &PredationConfig,
) -> Option<Direction> {
    let head = state.you.head()?;
    let own_length = state.you.len();

    if state.you.health < config.min_health || own_length < config.min_length {
        return None;
    }

    if let Some(dir) = head_to_head_opening(state, head, legal, space, config) {
        debug!("Predation: head-to-head opening {}", dir);
        return Some(dir);
    }

    let target = select_target(state, head, config)?;
    debug!(
        "Predation: target {} (distance {}, score {:.1})",
        target.snake.id, target.distance, target.score
    );

    if target.snake.health < config.ambush_health {
        if let Some(dir) = ambush(state, head, &target, legal, space, config) {
            debug!("Predation: ambush {}", dir);
            return Some(dir);
        }
    }

    pursue(state, head, &target, legal, space, config)
}

/// Highest scoring vulnerable opponent within pursuit range, nearer wins ties
fn select_target<'a>(
    state: &TurnState<'a>,
    head: Coord,
    config: &PredationConfig,
) -> Option<Target<'a>> {
    let own_length = state.you.len();
    let mut best: Option<Target<'a>> = None;

    for snake in state.opponents() {
        let Some(their_head) = snake.head() else {
            continue;
        };
        let vulnerable = snake.len() < own_length || snake.health < config.vulnerable_health;
        let distance = head.manhattan(&their_head);
        if !vulnerable || distance > config.max_pursuit_distance {
            continue;
        }

        let size_diff = own_length as f64 - snake.len() as f64;
        let score = config.size_weight * size_diff
            + f64::from(100 - snake.health) / config.health_divisor;
        let candidate = Target {
            snake,
            head: their_head,
            distance,
            score,
        };

        let better = match &best {
            None => true,
            Some(b) => score > b.score || (score == b.score && distance < b.distance),
        };
        if better {
            best = Some(candidate);
        }
    }

    best
}

/// Move next to the food a hungry target is about to reach, if we get there in time
fn ambush(
    state: &TurnState,
    head: Coord,
    target: &Target,
    legal: &LegalMoves,
    space: &SpaceProfile,
    config: &PredationConfig,
) -> Option<Direction> {
    let food = state.nearest_food(&target.head)?;
    let target_to_food = target.head.manhattan(&food);
    let own_to_food = head.manhattan(&food);

    // We need to stand beside the food no later than the target reaches it
    if target_to_food > config.ambush_food_distance || own_to_food > target_to_food + 1 {
        return None;
    }

    let mut best: Option<(Direction, f64)> = None;
    for dir in legal.allowed() {
        let intercept = dir.apply(&head).manhattan(&food);
        if intercept > 1 {
            continue;
        }
        // Stepping onto the food itself divides by zero and always wins
        let score = f64::from(space[dir]) + config.ambush_bonus / f64::from(intercept);
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((dir, score));
        }
    }

    best.map(|(dir, _)| dir)
}

/// Close the distance to where the target's head will be next turn
fn pursue(
    state: &TurnState,
    head: Coord,
    target: &Target,
    legal: &LegalMoves,
    space: &SpaceProfile,
    config: &PredationConfig,
) -> Option<Direction> {
    let predicted = predict_next_head(state, target, config);
    let min_space = if target.distance <= config.close_range_distance {
        config.close_range_min_space
    } else {
        config.default_min_space
    };

    legal
        .allowed()
        .into_iter()
        .filter(|&dir| space[dir] > min_space)
        .min_by_key(|dir| dir.apply(&head).manhattan(&predicted))
}

/// Hungry targets head for their nearest food (or stay put when there is none);
/// others keep their heading
fn predict_next_head(state: &TurnState, target: &Target, config: &PredationConfig) -> Coord {
    if target.snake.health < config.hungry_prediction_health {
        let Some(food) = state.nearest_food(&target.head) else {
            return target.head;
        };
        let dx = food.x - target.head.x;
        let dy = food.y - target.head.y;
        let dir = if dx.abs() > dy.abs() {
            if dx > 0 {
                Direction::Right
            } else {
                Direction::Left
            }
        } else if dy > 0 {
            Direction::Up
        } else {
            Direction::Down
        };
        return dir.apply(&target.head);
    }

    match target.snake.heading() {
        Some(dir) => dir.apply(&target.head),
        None => target.head,
    }
}

/// When we are much longer than every opponent, step into the cell shared with
/// a diagonally adjacent shorter snake to force a head-to-head we win
fn head_to_head_opening(
    state: &TurnState,
    head: Coord,
    legal: &LegalMoves,
    space: &SpaceProfile,
    config: &PredationConfig,
) -> Option<Direction> {
    let own_length = state.you.len();
    let largest = state.opponents().map(|s| s.len()).max().unwrap_or(0);
    if own_length <= largest + config.head_to_head_length_margin {
        return None;
    }

    for snake in state.opponents().filter(|s| s.len() < own_length) {
        let Some(their_head) = snake.head() else {
            continue;
        };
        let dx = their_head.x - head.x;
        let dy = their_head.y - head.y;
        if dx == 0 || dy == 0 || dx.abs() + dy.abs() != 2 {
            continue;
        }

        let options = [
            (dx > 0, Direction::Right),
            (dx < 0, Direction::Left),
            (dy > 0, Direction::Up),
            (dy < 0, Direction::Down),
        ];
        for (applies, dir) in options {
            if applies && legal[dir] && space[dir] > config.head_to_head_min_space {
                return Some(dir);
            }
        }
    }

    None
}
