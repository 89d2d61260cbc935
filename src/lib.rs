//! AVG Engine: a branching dialogue script interpreter for adventure games.
//!
//! Loads a graph of dialogue, choice, and scene nodes from a JSON-shaped
//! script, lets a host walk it (advance, choose, go back), tracks integer
//! story variables, and saves or restores the whole walk as text.

pub mod core;
pub mod schema;

pub use crate::core::engine::{AvgEngine, AvgEngineBuilder, EngineError, NavigationError};
