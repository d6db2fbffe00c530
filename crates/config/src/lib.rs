// Configuration loading

pub mod settings;

pub use settings::{HeaderPolicy, Settings};
