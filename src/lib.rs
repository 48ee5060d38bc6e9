// Library exports for the Battlesnake bot
// This allows the replay tool and the integration tests to use the decision engine

pub mod anti_trap;
pub mod bot;
pub mod config;
pub mod debug_logger;
pub mod floodfill;
pub mod foraging;
pub mod legality;
pub mod policy;
pub mod predation;
pub mod render;
pub mod replay;
pub mod types;
