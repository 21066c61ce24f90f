//! Chatline - streaming chat client core
//!
//! This library exposes modules for use in the terminal driver and in
//! integration tests.

pub mod adapters;
pub mod cli;
pub mod client;
pub mod config;
pub mod conversation;
pub mod error;
pub mod models;
pub mod session;
pub mod store;
pub mod stream;
pub mod traits;
