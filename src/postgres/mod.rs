// ABOUTME: PostgreSQL access layer: connections, readiness probing, catalog queries
// ABOUTME: Exports connect for use by the pipelines and the prober

pub mod catalog;
pub mod connection;
pub mod probe;

pub use connection::connect;
