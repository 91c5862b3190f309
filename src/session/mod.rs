pub mod controller;
pub mod gate;
pub mod input;
pub mod pacing;
pub mod state;

pub use controller::{CycleReport, ResponseSource, SessionController, SessionSettings};
pub use gate::PresentationGate;
pub use state::Phase;
