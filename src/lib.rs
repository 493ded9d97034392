pub mod app_context;
pub mod auth;
pub mod config;
pub mod data_loader;
pub mod database;
pub mod errors;
pub mod graphql;
pub mod integrations;
pub mod pubsub;
pub mod request_context;
pub mod server;
pub mod services;
pub mod utils;
