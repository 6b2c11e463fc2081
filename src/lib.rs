//! override-map library: virtual-method override resolution over a loaded type graph.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod domain;
pub mod server;
