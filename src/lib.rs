pub mod auth;
pub mod config;
pub mod constants;
pub mod dashboard;
pub mod db;
pub mod models;
pub mod rng;
pub mod store;
pub mod synth;
pub mod worker;
