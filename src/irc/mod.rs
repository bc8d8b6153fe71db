//! IRC session layer on top of the `irc` crate's client.
//!
//! [`connection::connect`] opens the connection, registers (with optional
//! SASL) and spawns a task that drives the client's message stream. Callers
//! interact through a cloneable [`client::Client`] and react to
//! [`event::Event`]s via [`handler::Handlers`].

pub mod client;
pub mod connection;
pub mod event;
pub mod handler;
pub mod sasl;
