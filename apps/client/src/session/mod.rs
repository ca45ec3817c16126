// Chat session controller: owns all UI state and runs the form-submit,
// chat-turn and export handlers. At most one request is in flight at a time.

pub mod controller;
mod guard;
pub mod state;

pub use controller::{ChatSession, Ignored, Outcome};
