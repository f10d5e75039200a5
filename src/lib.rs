pub mod config;
pub mod error;
pub mod game;

pub use config::GameConfig;
pub use error::GameError;
