// Decision policy: a short-circuiting cascade over immutable per-turn maps
//
// 1. predation            (length > 5)
// 2. anti-self-trapping   (length > 4)
// 3. foraging             (health < 70 or length < 15)
// 4. movement pattern     (space > 5, advances the session cursor)
// 5. chase our own tail
// 6. keep going straight  (space > 3)
// 7. most open space
// 8. any legal move at random
// 9. down
//
// Strategy suggestions are only accepted when legal.

use log::{debug, error};
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};

use crate::anti_trap::avoid_trap;
use crate::config::Config;
use crate::floodfill;
use crate::foraging::forage;
use crate::legality::legal_moves;
use crate::predation::hunt;
use crate::types::{Direction, LegalMoves, SpaceProfile, TurnState};

/// Returned when nothing else applies
pub const FALLBACK_DIRECTION: Direction = Direction::Down;

/// Memory carried from one turn to the next within a single game
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub last_direction: Option<Direction>,
    pub pattern_cursor: usize,
}

/// Which stage of the cascade produced the move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStep {
    Predation,
    AntiTrap,
    Foraging,
    Pattern,
    TailChase,
    Continue,
    MaxSpace,
    Random,
    Default,
    /// An internal fault was caught and the fallback returned
    Fault,
}

impl DecisionStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionStep::Predation => "predation",
            DecisionStep::AntiTrap => "anti_trap",
            DecisionStep::Foraging => "foraging",
            DecisionStep::Pattern => "pattern",
            DecisionStep::TailChase => "tail_chase",
            DecisionStep::Continue => "continue",
            DecisionStep::MaxSpace => "max_space",
            DecisionStep::Random => "random",
            DecisionStep::Default => "default",
            DecisionStep::Fault => "fault",
        }
    }
}

/// The chosen move plus the maps it was derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub direction: Direction,
    pub step: DecisionStep,
    pub legal: LegalMoves,
    pub space: SpaceProfile,
}

impl Decision {
    fn fault() -> Self {
        Decision {
            direction: FALLBACK_DIRECTION,
            step: DecisionStep::Fault,
            legal: LegalMoves::splat(false),
            space: SpaceProfile::splat(0),
        }
    }
}

/// Runs the full cascade for one turn and returns the decision with the updated session
pub fn decide<R: Rng + ?Sized>(
    state: &TurnState,
    session: Session,
    config: &Config,
    rng: &mut R,
) -> (Decision, Session) {
    let legal = legal_moves(state, &config.legality);
    let space = floodfill::profile(state, config.space.fallback_space);

    let (direction, step, cursor) = cascade(state, &session, &legal, &space, config, rng);

    let decision = Decision {
        direction,
        step,
        legal,
        space,
    };
    let next = Session {
        last_direction: Some(direction),
        pattern_cursor: cursor.unwrap_or(session.pattern_cursor),
    };
    (decision, next)
}

/// Same as `decide`, but a panic anywhere in the cascade yields the fallback
/// direction and leaves the session untouched
pub fn decide_safely<R: Rng + ?Sized>(
    state: &TurnState,
    session: Session,
    config: &Config,
    rng: &mut R,
) -> (Decision, Session) {
    match panic::catch_unwind(AssertUnwindSafe(|| decide(state, session, config, rng))) {
        Ok(result) => result,
        Err(cause) => {
            let reason = cause
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| cause.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!(
                "Turn {}: decision fault ({}), falling back to {}",
                state.turn, reason, FALLBACK_DIRECTION
            );
            (Decision::fault(), session)
        }
    }
}

fn cascade<R: Rng + ?Sized>(
    state: &TurnState,
    session: &Session,
    legal: &LegalMoves,
    space: &SpaceProfile,
    config: &Config,
    rng: &mut R,
) -> (Direction, DecisionStep, Option<usize>) {
    let policy = &config.policy;
    let length = state.you.len();
    let accept = |dir: Option<Direction>| accept_legal(dir, legal);

    if length > policy.predation_min_length {
        if let Some(dir) = accept(hunt(state, legal, space, &config.predation)) {
            return (dir, DecisionStep::Predation, None);
        }
    }

    if length > policy.anti_trap_min_length {
        if let Some(dir) = accept(avoid_trap(state, legal, space, &config.anti_trap)) {
            return (dir, DecisionStep::AntiTrap, None);
        }
    }

    if state.you.health < policy.forage_health_below || length < policy.forage_length_below {
        if let Some(dir) = accept(forage(state, legal, space, &config.foraging)) {
            return (dir, DecisionStep::Foraging, None);
        }
    }

    let pattern = policy.pattern_for(length);
    if let Some((dir, cursor)) = follow_pattern(
        pattern,
        session.pattern_cursor,
        legal,
        space,
        policy.pattern_min_space,
    ) {
        return (dir, DecisionStep::Pattern, Some(cursor));
    }

    if let Some(dir) = chase_tail(state, legal, space) {
        return (dir, DecisionStep::TailChase, None);
    }

    if let Some(dir) = continue_straight(session, legal, space, policy.continue_min_space) {
        return (dir, DecisionStep::Continue, None);
    }

    if let Some(dir) = most_open(legal, space) {
        return (dir, DecisionStep::MaxSpace, None);
    }

    if let Some(dir) = any_legal(legal, rng) {
        return (dir, DecisionStep::Random, None);
    }

    debug!("Turn {}: no legal move, defaulting to {}", state.turn, FALLBACK_DIRECTION);
    (FALLBACK_DIRECTION, DecisionStep::Default, None)
}

/// A strategy's suggestion only stands when it is legal
fn accept_legal(suggestion: Option<Direction>, legal: &LegalMoves) -> Option<Direction> {
    suggestion.filter(|&dir| legal[dir])
}

/// First legal pattern step with enough room, starting at `cursor`.
/// Returns the step and the cursor just past it.
fn follow_pattern(
    pattern: &[Direction],
    cursor: usize,
    legal: &LegalMoves,
    space: &SpaceProfile,
    min_space: u32,
) -> Option<(Direction, usize)> {
    let n = pattern.len();
    (0..n)
        .map(|i| (cursor + i) % n)
        .find(|&idx| legal[pattern[idx]] && space[pattern[idx]] > min_space)
        .map(|idx| (pattern[idx], (idx + 1) % n))
}

/// Legal move that closes in on our tail, most open space first
fn chase_tail(state: &TurnState, legal: &LegalMoves, space: &SpaceProfile) -> Option<Direction> {
    let head = state.you.head()?;
    let tail = state.you.tail()?;

    let toward = [
        (tail.x < head.x, Direction::Left),
        (tail.x > head.x, Direction::Right),
        (tail.y < head.y, Direction::Down),
        (tail.y > head.y, Direction::Up),
    ];

    let mut best: Option<Direction> = None;
    for (closer, dir) in toward {
        if closer && legal[dir] && best.map_or(true, |b| space[dir] > space[b]) {
            best = Some(dir);
        }
    }
    best
}

fn continue_straight(
    session: &Session,
    legal: &LegalMoves,
    space: &SpaceProfile,
    min_space: u32,
) -> Option<Direction> {
    session
        .last_direction
        .filter(|&dir| legal[dir] && space[dir] > min_space)
}

/// Legal move with the most space, earliest in up, down, left, right order on ties
fn most_open(legal: &LegalMoves, space: &SpaceProfile) -> Option<Direction> {
    let mut best: Option<Direction> = None;
    for dir in legal.allowed() {
        if best.map_or(true, |b| space[dir] > space[b]) {
            best = Some(dir);
        }
    }
    best
}

fn any_legal<R: Rng + ?Sized>(legal: &LegalMoves, rng: &mut R) -> Option<Direction> {
    legal.allowed().choose(rng).copied()
}
