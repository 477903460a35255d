//! Game sessions: state, orchestration and automatic day advancement

pub mod controller;
pub mod scheduler;
pub mod state;

pub use controller::{DayReport, SessionController};
pub use scheduler::{AutoAdvance, SharedSession};
pub use state::{GameState, Stats};
