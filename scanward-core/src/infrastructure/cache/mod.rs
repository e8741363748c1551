//! Cache infrastructure

pub mod dragonfly_cache;

pub use dragonfly_cache::{CacheError, DragonflyCache};
