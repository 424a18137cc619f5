pub mod client;
pub mod config;
pub mod logging;
pub mod models;
pub mod render;
pub mod search;
pub mod session;
