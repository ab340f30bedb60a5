pub mod analyzer;
pub mod config;
pub mod loader;
pub mod model;
pub mod normalizer;
pub mod pipeline;
pub mod presenter;
pub mod utils;
