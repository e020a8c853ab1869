pub mod access;
pub mod audit;
pub mod config;
pub mod db;
pub mod handlers;
pub mod model;
pub mod server;
