pub mod auth;
pub mod error;
pub mod handlers;
pub mod locale;
pub mod routes;
pub mod server;
pub mod state;

pub use auth::{hash_password, AdminAuth, AdminClaims, IssuedToken};
pub use error::*;
pub use locale::RequestLocale;
pub use routes::*;
pub use server::*;
pub use state::*;
