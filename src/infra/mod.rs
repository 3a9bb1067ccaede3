pub mod config;
pub mod llm;
pub mod settings_store;
pub mod wire;
