// Library exports for the Isolation agent
// The tournament runner and the replay tool both build on these modules

pub mod agent;
pub mod arena;
pub mod board;
pub mod config;
pub mod deadline;
pub mod debug_logger;
pub mod eval;
pub mod replay;
pub mod search;
pub mod tournament;
pub mod types;
