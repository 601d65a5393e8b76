// Chat API: HTTP access to stateful chat sessions.
// Sessions live in memory only and are lost on restart.

pub mod handlers;
pub mod store;
