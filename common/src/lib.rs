pub mod board_view;
pub mod config;
pub mod defaults;
pub mod game;
pub mod id_generator;
pub mod identifiers;
pub mod input;
pub mod instance;
pub mod logger;
pub mod registry;
pub mod runtime;
pub mod store;
pub mod tick;

pub use identifiers::*;
