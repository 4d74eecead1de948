pub mod cli;
pub mod extract;
pub mod loader;
pub mod model;
pub mod parser;
pub mod resolver;
pub mod visit;
