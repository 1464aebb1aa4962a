pub mod errors;
pub mod models;
pub mod ports;
pub mod rotation;
pub mod service;
