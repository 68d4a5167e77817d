pub mod config;
pub mod error;
pub mod llm;
pub mod pages;
pub mod questions;
pub mod relay;
pub mod runner;
pub mod server;

pub use error::{Error, Result};
