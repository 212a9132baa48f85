//! Driven persistence adapters for the store ports.

mod memory;

pub use memory::{InMemoryPostStore, InMemoryUserStore};
