pub mod display;
pub mod favorites;
pub mod feed;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod search;
pub mod ws;

pub use routes::create_router;
