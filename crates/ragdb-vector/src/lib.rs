//! Namespace-scoped vector index over LanceDB: one table per namespace
//! inside a single on-disk database, persistent across restarts.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod schema;
pub mod store;

pub use store::NamespaceStore;
