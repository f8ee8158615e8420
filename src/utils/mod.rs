pub mod digest;
pub mod lenient;
pub mod settings;
