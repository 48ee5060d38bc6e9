// Foraging: pick the food that is cheapest to reach and hardest for opponents to take

use log::debug;

use crate::config::ForagingConfig;
use crate::types::{Coord, Direction, LegalMoves, SpaceProfile, TurnState};

/// A reachable food item and the move that starts towards it
#[derive(Debug, Clone, Copy)]
struct FoodOption {
    food: Coord,
    direction: Direction,
    distance: i32,
    space: u32,
    score: f64,
}

/// Suggests a move towards the best food, or `None` when no food is worth the risk
pub fn forage(
    state: &TurnState,
    legal: &LegalMoves,
    space: &SpaceProfile,
    config: &ForagingConfig,
) -> Option<Direction> {
    let head = state.you.head()?;
    if state.board.food.is_empty() {
        return None;
    }

    let health = state.you.health;
    let emergency = health < config.emergency_health;
    let min_safe_space = ((state.you.len() / 2) as u32).min(config.safe_space_cap);

    let mut best: Option<FoodOption> = None;
    for &food in &state.board.food {
        let distance = head.manhattan(&food);
        if emergency && distance > health - config.emergency_margin {
            continue;
        }
        let Some(direction) = primary_direction(&head, &food, legal) else {
            continue;
        };

        let available = space[direction];
        let advantage = competitive_advantage(state, &head, &food);
        let score = food_score(distance, advantage, available, min_safe_space, health, config);

        if best.map_or(true, |b| score < b.score) {
            best = Some(FoodOption {
                food,
                direction,
                distance,
                space: available,
                score,
            });
        }
    }

    let best = best?;
    if best.space >= min_safe_space || emergency {
        debug!(
            "Foraging: {} toward food at {} (score {:.1}, distance {})",
            best.direction, best.food, best.score, best.distance
        );
        Some(best.direction)
    } else {
        debug!(
            "Foraging: food at {} needs {} but only {} open, skipping",
            best.food, min_safe_space, best.space
        );
        None
    }
}

/// Lower is better. A cramped approach is penalised and hunger lowers every score.
fn food_score(
    distance: i32,
    advantage: i32,
    available: u32,
    min_safe_space: u32,
    health: i32,
    config: &ForagingConfig,
) -> f64 {
    let space_penalty = if available < min_safe_space {
        f64::from(min_safe_space - available) * config.space_penalty_weight
    } else {
        0.0
    };
    let health_bonus = if health < config.health_bonus_threshold {
        f64::from(config.health_bonus_threshold - health) * config.health_bonus_factor
    } else {
        0.0
    };

    f64::from(distance) - f64::from(advantage) * config.advantage_weight + space_penalty
        - health_bonus
}

/// First legal move that closes the gap: left/right before down/up
fn primary_direction(head: &Coord, food: &Coord, legal: &LegalMoves) -> Option<Direction> {
    let candidates = [
        (food.x < head.x, Direction::Left),
        (food.x > head.x, Direction::Right),
        (food.y < head.y, Direction::Down),
        (food.y > head.y, Direction::Up),
    ];
    candidates
        .into_iter()
        .find(|&(closer, dir)| closer && legal[dir])
        .map(|(_, dir)| dir)
}

/// Summed over opponents: +3 when we are closer (+2 more if they are longer),
/// +1/-1 on a tie depending on who is longer, -2 when they are closer
fn competitive_advantage(state: &TurnState, head: &Coord, food: &Coord) -> i32 {
    let own_distance = head.manhattan(food);
    let own_length = state.you.len();

    state
        .opponents()
        .filter_map(|opponent| opponent.head().map(|h| (opponent.len(), h.manhattan(food))))
        .map(|(their_length, their_distance)| {
            if own_distance < their_distance {
                if own_length < their_length {
                    5
                } else {
                    3
                }
            } else if own_distance == their_distance {
                if own_length > their_length {
                    1
                } else {
                    -1
                }
            } else {
                -2
            }
        })
        .sum()
}
