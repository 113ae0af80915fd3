pub mod handlers;
pub mod service;
pub mod temp_store;
