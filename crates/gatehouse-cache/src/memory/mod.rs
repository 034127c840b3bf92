//! In-memory revocation store.

pub mod store;

pub use store::MemoryCacheProvider;
