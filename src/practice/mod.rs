//! # Practice Module
//!
//! Client management for the practice: commands, the repository boundary,
//! handlers and the policies that govern them.

pub mod clients;
pub mod handlers;
pub mod policies;
pub mod repository;

pub use clients::{Client, ClientId, CreateClientCommand, DeleteClientCommand, UpdateClientCommand};
pub use handlers::{
    ClientHandlerContext, CreateClientHandler, DeleteClientHandler, UpdateClientHandler,
};
pub use policies::default_policies;
pub use repository::{ClientRepository, InMemoryClientRepository, RepositoryError};

use crate::commands::CommandBus;

/// Register the client handlers on `bus`
pub fn register_client_handlers(bus: &CommandBus, context: &ClientHandlerContext) {
    bus.register::<CreateClientCommand, _>(CreateClientHandler::new(context.clone()));
    bus.register::<UpdateClientCommand, _>(UpdateClientHandler::new(context.clone()));
    bus.register::<DeleteClientCommand, _>(DeleteClientHandler::new(context.clone()));
}
