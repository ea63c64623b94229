//! Command processing
//!
//! A single controller thread owns the store; frontends talk to it
//! through `QuoteCommand`s and read `QuoteSnapshot`s.

pub mod controller;
pub mod state;

pub use controller::{spawn_controller, ControllerHandle, QuoteController};
pub use state::{Notice, QuoteCommand, QuoteSnapshot, Severity};
