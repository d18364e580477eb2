// ABOUTME: Pipeline implementations for each run mode
// ABOUTME: Exports the backup and restore entry points

pub mod backup;
pub mod restore;

pub use backup::backup;
pub use restore::restore;
