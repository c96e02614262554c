mod config;
mod constants;
pub mod storageclass;

pub use config::*;
pub use constants::*;
