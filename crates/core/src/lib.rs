mod assets;

pub mod client;
pub mod config;
pub mod render;
pub mod service;
pub mod session;
pub mod storage;

#[cfg(test)]
mod test_utils;

pub use crate::assets::{get_config_dir, get_data_dir};
