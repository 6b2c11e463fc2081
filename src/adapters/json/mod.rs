pub mod adapter;
pub mod document;

pub use adapter::JsonTypeGraphSource;
