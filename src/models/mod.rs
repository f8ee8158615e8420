pub mod color;
pub mod content;
pub mod saved_config;
pub mod style;
