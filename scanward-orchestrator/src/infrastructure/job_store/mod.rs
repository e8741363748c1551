//! Scan job persistence

mod memory;
mod store;

pub use memory::InMemoryJobStore;
pub use store::{DragonflyJobStore, JobStore, JobStoreError};
