// Welcome to
// __________         __    __  .__                               __
// \______   \_____ _/  |__/  |_|  |   ____   ______ ____ _____  |  | __ ____
//  |    |  _/\__  \\   __\   __\  | _/ __ \ /  ___//    \\__  \ |  |/ // __ \
//  |    |   \ / __ \|  |  |  | |  |_\  ___/ \___ \|   |  \/ __ \|    <\  ___/
//  |________/(______/__|  |__| |____/\_____>______>___|__(______/__|__\\_____>
//
// The Bot owns one Session per snake it plays in each running game and wraps
// every decision in the policy's fault boundary, so a move is always returned.

use log::{debug, info, log_enabled, Level};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::debug_logger::{DebugLogEntry, DebugLogger};
use crate::policy::{self, Decision, Session};
use crate::render::render_board;
use crate::types::{Battlesnake, Board, Game, TurnState};

/// Games whose snake has not moved for this long are forgotten
const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(15 * 60);
/// Upper bound on concurrently tracked sessions; the least recently used goes first
const MAX_SESSIONS: usize = 1024;

/// One session per (game id, snake id): a server may play several snakes in one game
type SessionKey = (String, String);

#[derive(Debug, Clone, Copy)]
struct SessionSlot {
    session: Session,
    last_seen: Instant,
    /// Store counter value at the last touch, orders least recently used
    stamp: u64,
}

/// Battlesnake Bot with OOP-style API
/// Takes static configuration dependencies and exposes methods corresponding to API endpoints
pub struct Bot {
    config: Config,
    sessions: Mutex<HashMap<SessionKey, SessionSlot>>,
    max_sessions: usize,
    stamps: AtomicU64,
    debug_logger: DebugLogger,
}

impl Bot {
    /// Creates a new Bot instance with the given configuration
    ///
    /// # Arguments
    /// * `config` - Static configuration that does not change during the bot's lifetime
    pub fn new(config: Config) -> Self {
        Self::with_logger(config, DebugLogger::disabled())
    }

    /// Creates a Bot that also writes every decision to the given turn log
    pub fn with_logger(config: Config, debug_logger: DebugLogger) -> Self {
        Bot {
            config,
            sessions: Mutex::new(HashMap::new()),
            max_sessions: MAX_SESSIONS,
            stamps: AtomicU64::new(0),
            debug_logger,
        }
    }

    /// Caps the number of tracked sessions
    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions.max(1);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns bot metadata and appearance
    /// Corresponds to GET / endpoint
    pub fn info(&self) -> Value {
        info!("INFO");

        let appearance = &self.config.appearance;
        json!({
            "apiversion": "1",
            "author": appearance.author,
            "color": appearance.color,
            "head": appearance.head,
            "tail": appearance.tail,
            "version": appearance.version,
        })
    }

    /// Called when a game starts
    /// Corresponds to POST /start endpoint
    pub fn start(&self, game: &Game, _turn: &i32, _board: &Board, you: &Battlesnake) {
        info!("GAME START {} as {}", game.id, you.id);
        self.store(&game.id, &you.id, Session::default());
    }

    /// Called when a game ends
    /// Corresponds to POST /end endpoint
    pub fn end(&self, game: &Game, turn: &i32, _board: &Board, you: &Battlesnake) {
        info!("GAME OVER {} after {} turns ({} health)", game.id, turn, you.health);
        self.sessions
            .lock()
            .remove(&(game.id.clone(), you.id.clone()));
    }

    /// Number of (game, snake) sessions currently tracked
    pub fn active_sessions(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Session stored for one of our snakes in a game, if any
    pub fn session(&self, game_id: &str, snake_id: &str) -> Option<Session> {
        self.sessions
            .lock()
            .get(&(game_id.to_string(), snake_id.to_string()))
            .map(|slot| slot.session)
    }

    /// Inserts or refreshes a session, evicting idle and least recently used ones
    fn store(&self, game_id: &str, snake_id: &str, session: Session) {
        let now = Instant::now();
        let key = (game_id.to_string(), snake_id.to_string());
        let mut sessions = self.sessions.lock();
        let stamp = self.stamps.fetch_add(1, Ordering::Relaxed);

        if !sessions.contains_key(&key) {
            sessions.retain(|_, slot| {
                now.duration_since(slot.last_seen) < SESSION_IDLE_TIMEOUT
            });
            while sessions.len() >= self.max_sessions {
                let oldest = sessions
                    .iter()
                    .min_by_key(|(_, slot)| slot.stamp)
                    .map(|(k, _)| k.clone());
                match oldest {
                    Some(oldest) => {
                        debug!("Evicting session {} / {}", oldest.0, oldest.1);
                        sessions.remove(&oldest);
                    }
                    None => break,
                }
            }
        }

        sessions.insert(
            key,
            SessionSlot {
                session,
                last_seen: now,
                stamp,
            },
        );
    }

    /// Computes and returns the next move
    /// Corresponds to POST /move endpoint
    ///
    /// # Returns
    /// * `Value` - JSON response containing the chosen move direction
    pub async fn get_move(
        &self,
        game: &Game,
        turn: &i32,
        board: &Board,
        you: &Battlesnake,
    ) -> Value {
        let decision = self.decide(game, *turn, board, you);

        if self.debug_logger.is_enabled() {
            let entry = DebugLogEntry::new(&game.id, *turn, &you.id, board.clone(), &decision);
            self.debug_logger.log_move(entry);
        }

        json!({ "move": decision.direction.as_str() })
    }

    /// Runs the decision cascade for one turn and stores the advanced session
    pub fn decide(&self, game: &Game, turn: i32, board: &Board, you: &Battlesnake) -> Decision {
        let start_time = Instant::now();
        let state = TurnState::new(turn, board, you);

        // Unknown games (no /start seen) begin with a fresh session
        let session = self.session(&game.id, &you.id).unwrap_or_default();

        let (decision, next) =
            policy::decide_safely(&state, session, &self.config, &mut rand::rng());
        self.store(&game.id, &you.id, next);

        self.log_diagnostics(&state, &decision);
        info!(
            "Turn {}: Chose {} via {} (game: {}, time: {}us)",
            turn,
            decision.direction,
            decision.step.as_str(),
            game.id,
            start_time.elapsed().as_micros()
        );

        decision
    }

    /// Legality and space maps plus the board; never influences the decision
    fn log_diagnostics(&self, state: &TurnState, decision: &Decision) {
        let verbose = self.config.debug.verbose_enabled();
        if !verbose && !log_enabled!(Level::Debug) {
            return;
        }

        let summary = format!(
            "Turn {} | health {} | length {}\nlegal: {:?}\nspace: {:?}\n{}",
            state.turn,
            state.you.health,
            state.you.len(),
            decision.legal,
            decision.space,
            render_board(state.board, &state.you.id)
        );
        if verbose {
            info!("{}", summary);
        } else {
            debug!("{}", summary);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::DecisionStep;
    use crate::types::{Coord, Direction};

    fn lone_board(head: Coord) -> (Board, Battlesnake) {
        let you = Battlesnake::new("me", 100, vec![head]);
        let mut board = Board::new(5, 5);
        board.snakes.push(you.clone());
        (board, you)
    }

    #[test]
    fn test_info_uses_configured_appearance() {
        let bot = Bot::new(Config::default_hardcoded());
        let info = bot.info();
        assert_eq!(info["apiversion"], "1");
        assert_eq!(info["color"], "#D2042D");
    }

    #[test]
    fn test_sessions_follow_game_lifecycle() {
        let bot = Bot::new(Config::default_hardcoded());
        let (board, you) = lone_board(Coord::new(2, 2));
        let game = Game::with_id("lifecycle");

        bot.start(&game, &0, &board, &you);
        assert_eq!(bot.session("lifecycle", "me"), Some(Session::default()));

        let decision = bot.decide(&game, 0, &board, &you);
        assert_eq!(
            bot.session("lifecycle", "me").and_then(|s| s.last_direction),
            Some(decision.direction)
        );

        bot.end(&game, &1, &board, &you);
        assert_eq!(bot.active_sessions(), 0);
    }

    #[test]
    fn test_games_do_not_share_sessions() {
        let bot = Bot::new(Config::default_hardcoded());
        let (board, you) = lone_board(Coord::new(2, 2));

        bot.decide(&Game::with_id("a"), 0, &board, &you);
        bot.decide(&Game::with_id("a"), 1, &board, &you);
        let first_b = bot.decide(&Game::with_id("b"), 0, &board, &you);

        // Game b starts from a fresh cursor: the spiral opens to the right
        assert_eq!(first_b.direction, Direction::Right);
        assert_eq!(first_b.step, DecisionStep::Pattern);
        assert_eq!(bot.active_sessions(), 2);
    }

    #[test]
    fn test_own_snakes_in_one_game_keep_separate_sessions() {
        let bot = Bot::new(Config::default_hardcoded());
        let game = Game::with_id("shared");
        let a = Battlesnake::new("a", 100, vec![Coord::new(2, 2)]);
        let b = Battlesnake::new("b", 100, vec![Coord::new(8, 8)]);
        let mut board = Board::new(11, 11);
        board.snakes = vec![a.clone(), b.clone()];

        bot.start(&game, &0, &board, &a);
        bot.start(&game, &0, &board, &b);
        assert_eq!(bot.active_sessions(), 2);

        let first_a = bot.decide(&game, 0, &board, &a);
        let first_b = bot.decide(&game, 0, &board, &b);
        assert_eq!(first_a.direction, Direction::Right);
        assert_eq!(first_b.direction, Direction::Right);
        assert_eq!(bot.session("shared", "a").map(|s| s.pattern_cursor), Some(1));
        assert_eq!(bot.session("shared", "b").map(|s| s.pattern_cursor), Some(1));

        bot.end(&game, &1, &board, &a);
        assert_eq!(bot.session("shared", "a"), None);
        assert!(bot.session("shared", "b").is_some());
    }

    #[test]
    fn test_least_recently_used_session_is_evicted() {
        let bot = Bot::new(Config::default_hardcoded()).with_max_sessions(2);
        let (board, you) = lone_board(Coord::new(2, 2));

        bot.decide(&Game::with_id("old"), 0, &board, &you);
        bot.decide(&Game::with_id("busy"), 0, &board, &you);
        // Touching "old" again makes "busy" the least recently used
        bot.decide(&Game::with_id("old"), 1, &board, &you);
        bot.decide(&Game::with_id("new"), 0, &board, &you);

        assert_eq!(bot.active_sessions(), 2);
        assert!(bot.session("old", "me").is_some());
        assert!(bot.session("busy", "me").is_none());
        assert!(bot.session("new", "me").is_some());
    }
}
