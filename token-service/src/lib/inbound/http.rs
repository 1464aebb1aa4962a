pub mod cookies;
pub mod csrf;
pub mod handlers;
pub mod router;
pub mod transport;
