//! Command-line front end for the licence tracker.

pub mod app;
pub mod args;
pub mod render;
mod unreachable;

pub use app::App;
pub use args::{Args, Command, Credentials};
pub use unreachable::Unreachable;
