//! Context store implementations for persona-relay.

pub mod in_memory;

pub use in_memory::InMemoryContextStore;
