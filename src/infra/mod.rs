pub mod config;

pub use config::{ConfigManager, Language, UserConfig};
