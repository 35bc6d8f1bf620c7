pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod projector;
pub mod seed;
pub mod services;
pub mod state;
pub mod store;
