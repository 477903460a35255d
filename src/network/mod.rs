//! Contact network model and generators

pub mod generation;
pub mod graph;

pub use generation::generate;
pub use graph::{Connection, Network, Person};
