pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod display;
pub mod error;
pub mod forms;
pub mod post;
pub mod seed;
pub mod subreddit;
pub mod utils;


pub use error::{Error, Result};
