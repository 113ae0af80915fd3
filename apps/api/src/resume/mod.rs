pub mod bundle;
pub mod handlers;
pub mod service;
pub mod templates;
