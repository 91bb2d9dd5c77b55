pub mod charts;
pub mod config;
pub mod csv;
pub mod datetime;
pub mod error;
pub mod import;
pub mod loader;
pub mod model;
pub mod records;
pub mod render;
pub mod store;
pub mod validate;
