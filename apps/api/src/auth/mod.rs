pub mod handlers;
pub mod oauth;
pub mod tokens;

mod extract;

pub use extract::AuthUser;
