pub mod env_config;

pub use env_config::load_app_config;
