pub mod hierarchy;
pub mod method;
pub mod ports;
pub mod relationship;
pub mod resolver;
pub mod signature;
pub mod type_graph;
pub mod type_ref;
