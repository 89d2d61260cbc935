pub mod audio;
pub mod config;
pub mod document;
pub mod engine;
pub mod path;
pub mod save;
pub mod script;
pub mod state;
