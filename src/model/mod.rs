pub mod config;
pub mod history;
pub mod tree;

pub use config::*;
pub use history::*;
pub use tree::*;
