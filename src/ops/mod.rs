pub mod history_ops;
pub mod propagate;
pub mod rollover;
pub mod store_ops;
