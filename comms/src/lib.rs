/// The `{type, payload}` envelope shared by every message on the wire
pub mod envelope;
/// Set of commands which the server can receive and process
pub mod command;
/// Set of events the server sends to the clients of a room
pub mod event;
/// Implementation of event and command transportation over WebSockets.
/// Requires 'server' or 'client' features to be enabled and will bring in tokio dependency alongside with other dependencies
pub mod transport;
