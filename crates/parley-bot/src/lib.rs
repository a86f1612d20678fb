pub mod config;
pub mod console;
pub mod state;

pub use config::Config;
pub use console::{Command, Console};
pub use state::AppState;
