//! Storage traits and implementations.
//!
//! This module provides the severity-partitioned log store. The
//! `PartitionStore` trait defines the interface, allowing a file-backed
//! implementation for the server and an in-memory one for tests.

pub mod partition_store;

pub use partition_store::{
    format_line, parse_line, FilePartitionStore, InMemoryPartitionStore, PartitionStore,
    PartitionStoreError, FIELD_DELIMITER,
};
