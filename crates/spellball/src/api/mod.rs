pub mod config;
pub mod runner;
pub mod types;
pub mod world;
