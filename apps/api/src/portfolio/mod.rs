pub mod bundle;
pub mod handlers;
pub mod publish;
pub mod service;
