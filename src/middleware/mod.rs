pub mod auth;

pub use auth::{authentication_gate, AuthGate, Authenticated};
