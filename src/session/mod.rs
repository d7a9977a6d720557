pub mod controller;
pub mod poller;
pub mod state;

pub use controller::{Command, Controller, Effect};
pub use poller::{PollReport, PollTimer};
pub use state::{Phase, Session};
