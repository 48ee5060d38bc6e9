// Debug logging module for asynchronous turn logging
//
// This module provides fire-and-forget async logging to avoid blocking
// the request/response cycle. Each decision is written as one JSONL line,
// which the replay tool can read back.

use log::error;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::policy::{Decision, DecisionStep};
use crate::types::{Board, Direction, LegalMoves, SpaceProfile};

/// Represents a single debug log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugLogEntry {
    pub game_id: String,
    pub turn: i32,
    pub you_id: String,
    pub chosen_move: Direction,
    pub step: DecisionStep,
    pub legal: LegalMoves,
    pub space: SpaceProfile,
    pub board: Board,
    pub timestamp: String,
}

impl DebugLogEntry {
    pub fn new(game_id: &str, turn: i32, you_id: &str, board: Board, decision: &Decision) -> Self {
        DebugLogEntry {
            game_id: game_id.to_string(),
            turn,
            you_id: you_id.to_string(),
            chosen_move: decision.direction,
            step: decision.step,
            legal: decision.legal,
            space: decision.space,
            board,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Shared debug logger state
/// Uses Arc<Mutex<File>> to allow concurrent async writes from multiple tasks
#[derive(Clone)]
pub struct DebugLogger {
    file: Arc<Mutex<Option<File>>>,
    enabled: bool,
}

impl DebugLogger {
    /// Creates a new debug logger
    /// If enabled is true, initializes the log file (truncating if it exists)
    pub async fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return Self::disabled();
        }

        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)
            .await
        {
            Ok(file) => {
                log::info!("Debug logging enabled: {}", log_file_path);
                DebugLogger {
                    file: Arc::new(Mutex::new(Some(file))),
                    enabled: true,
                }
            }
            Err(e) => {
                error!("Failed to create debug log file '{}': {}", log_file_path, e);
                Self::disabled()
            }
        }
    }

    /// Creates a disabled debug logger (no-op)
    pub fn disabled() -> Self {
        DebugLogger {
            file: Arc::new(Mutex::new(None)),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Logs a decision asynchronously (fire-and-forget)
    /// This spawns a tokio task that writes to the file without blocking
    pub fn log_move(&self, entry: DebugLogEntry) {
        if !self.enabled {
            return;
        }

        let file_handle = self.file.clone();
        tokio::spawn(async move {
            Self::write_entry(file_handle, entry).await;
        });
    }

    /// Performs the actual file write
    async fn write_entry(file_handle: Arc<Mutex<Option<File>>>, entry: DebugLogEntry) {
        let mut file_guard = file_handle.lock().await;

        if let Some(file) = file_guard.as_mut() {
            match serde_json::to_string(&entry) {
                Ok(json_line) => {
                    let line_with_newline = format!("{}\n", json_line);
                    if let Err(e) = file.write_all(line_with_newline.as_bytes()).await {
                        error!("Failed to write debug log entry: {}", e);
                    } else if let Err(e) = file.flush().await {
                        error!("Failed to flush debug log: {}", e);
                    }
                }
                Err(e) => {
                    error!("Failed to serialize debug log entry: {}", e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Coord;

    fn sample_decision() -> Decision {
        Decision {
            direction: Direction::Left,
            step: DecisionStep::Foraging,
            legal: LegalMoves::splat(true),
            space: SpaceProfile::splat(12),
        }
    }

    #[test]
    fn test_entry_round_trips_through_json() {
        let mut board = Board::new(7, 7);
        board.food.push(Coord::new(1, 1));
        let entry = DebugLogEntry::new("g", 4, "me", board, &sample_decision());

        let line = serde_json::to_string(&entry).unwrap();
        assert!(line.contains("\"chosen_move\":\"left\""));
        assert!(line.contains("\"step\":\"foraging\""));

        let parsed: DebugLogEntry = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed.turn, 4);
        assert_eq!(parsed.space, SpaceProfile::splat(12));
    }

    #[tokio::test]
    async fn test_enabled_logger_writes_lines() {
        let path = std::env::temp_dir().join(format!("cascade_debug_{}.jsonl", std::process::id()));
        let path_str = path.to_string_lossy().to_string();
        let logger = DebugLogger::new(true, &path_str).await;
        assert!(logger.is_enabled());

        let entry = DebugLogEntry::new("g", 1, "me", Board::new(5, 5), &sample_decision());
        DebugLogger::write_entry(logger.file.clone(), entry).await;

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(contents.lines().count(), 1);
        let _ = tokio::fs::remove_file(&path).await;
    }
}
