pub mod color;
pub mod config;

pub use color::HexColor;
pub use config::NotebookConfig;
