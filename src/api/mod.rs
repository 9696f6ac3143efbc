// API module - HTTP endpoints

pub mod auth;
pub mod cars;
pub mod drivers;
pub mod health;
pub mod manufacturers;
pub mod middleware;
