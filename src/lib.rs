pub mod auth;
pub mod config;
pub mod db;
pub mod models;
pub mod responses;
pub mod routes;
pub mod state;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use state::AppState;
