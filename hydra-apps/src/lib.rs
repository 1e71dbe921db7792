//! The six applications built on `hydra-engine`: content hashing and
//! indexing, duplicate detection, date-folder relocation, time-based
//! renaming, database-driven synchronization, and cross-database comparison.

pub mod comparator;
pub mod datemover;
pub mod db;
pub mod dedup;
pub mod indexer;
pub mod renamer;
pub mod syncdb;
