pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod music;
pub mod pipeline;
pub mod playlist;
pub mod recommend;
pub mod scenes;
pub mod seeds;
pub mod suggest;
pub mod taste;

pub use error::{Error, Result};
