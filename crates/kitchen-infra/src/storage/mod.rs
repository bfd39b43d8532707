//! Image storage backends.

mod local;

pub use local::LocalImageStorage;
