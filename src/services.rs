pub mod action_service;
pub mod backend;
pub mod broadcaster;
pub mod game_service;
