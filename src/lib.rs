pub mod config;
pub mod gate;
pub mod routes;
pub mod services;
pub mod state;
pub mod upload;
