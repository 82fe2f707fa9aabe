//! Model hosting components

pub mod host;

pub use host::ModelHost;
