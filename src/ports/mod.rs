//! Port traits defining external boundaries.
//!
//! The engine touches the outside world only through the source tree, so
//! there is a single port. Implementations live in `src/adapters/`.

pub mod filesystem;

pub use filesystem::FileSystem;
