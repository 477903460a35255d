//! Disease progression and the session event stream

pub mod events;
pub mod spread;

pub use events::{ActionLog, Cue, LogEntry};
pub use spread::{advance_day, DiseaseParams, Infection, SpreadReport};
