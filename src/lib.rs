#![doc = include_str!("../README.md")]

pub mod adaptor;
pub mod config;
pub mod mapper;
pub mod models;
mod splice;
pub mod tests;
mod translate;
pub mod utils;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
