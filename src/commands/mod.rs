//! # Commands
//!
//! Command/handler dispatch. A [`Command`] is an immutable request carrying
//! its principal; the [`CommandBus`] routes it by type to exactly one
//! [`CommandHandler`], optionally after a policy check.

pub mod bus;
pub mod command;
pub mod errors;
pub mod handler;

pub use bus::CommandBus;
pub use command::{Command, CommandId, CommandMetadata};
pub use errors::CommandError;
pub use handler::CommandHandler;
