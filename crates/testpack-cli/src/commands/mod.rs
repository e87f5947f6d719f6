//! Command implementations.

mod bundle;

pub use bundle::execute as bundle_execute;
