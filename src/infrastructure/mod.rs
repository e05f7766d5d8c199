//! Adapters for the domain ports: in-memory and RocksDB document stores, plus
//! the identity provider and clocks used outside a hosted backend.

pub mod identity;
pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
