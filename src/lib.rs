// ABOUTME: Library module for postgres-csv-backup
// ABOUTME: Exports all core functionality for use in binary and tests

pub mod commands;
pub mod config;
pub mod copy;
pub mod postgres;
pub mod schema;
pub mod utils;
