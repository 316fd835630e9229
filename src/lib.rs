pub mod app;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod generation;
pub mod meals;
pub mod nutrition;
pub mod routes;
pub mod state;
