pub mod backend;
pub mod errors;
pub mod handle;

pub use backend::TokenBackend;
pub use backend::TokenLifetimes;
pub use errors::TokenError;
pub use handle::Token;
