pub mod auth;
pub mod handlers;
pub mod response;
pub mod routes;

pub use auth::{AdminCheck, IsAdmin, SharedSecret};
pub use routes::create_router;
