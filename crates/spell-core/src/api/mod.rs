pub mod config;
pub mod game;
pub mod outbox;
pub mod snapshot;
pub mod types;
