//! Ambient adapters shared by every application built on `hydra-engine`:
//! content hashing, EXIF extraction, timestamp formatting, collision-safe
//! filesystem naming, and process-wide logging setup.

pub mod exif;
pub mod fsutil;
pub mod hash;
pub mod logging;
pub mod timestamp;

pub use exif::ExifFields;
pub use logging::LoggingGuard;
