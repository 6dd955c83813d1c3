pub mod config;
pub mod decision;
pub mod game;
pub mod log_entry;
pub mod player;
pub mod role;

pub use config::*;
pub use decision::*;
pub use game::*;
pub use log_entry::*;
pub use player::*;
pub use role::*;
