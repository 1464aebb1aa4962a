//! Token and credential primitives shared by the token service.
//!
//! Provides reusable authentication infrastructure:
//! - Password hashing (Argon2id)
//! - JWT claims encoding and signature validation (HS256)
//! - Typed token handles for access, refresh and sliding tokens
//! - A token backend that mints, parses, rotates and slides tokens
//!
//! The backend never consults revocation state; callers decide whether a
//! parsed token's `jti` is still honored.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Token Pair
//! ```
//! use auth::{JwtHandler, TokenBackend, TokenLifetimes, TokenType};
//! use chrono::Utc;
//!
//! let handler = JwtHandler::new(b"secret_key_at_least_32_bytes_long!");
//! let backend = TokenBackend::new(handler, TokenLifetimes::default());
//!
//! let now = Utc::now();
//! let refresh = backend.refresh_for_user("user123", "alice", now).unwrap();
//! let access = backend.access_for(&refresh, now).unwrap();
//!
//! let parsed = backend
//!     .parse(access.as_str(), Some(TokenType::Access), now)
//!     .unwrap();
//! assert_eq!(parsed.subject(), Some("user123"));
//! ```

pub mod jwt;
pub mod password;
pub mod token;

// Re-export commonly used items
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::TokenType;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token::Token;
pub use token::TokenBackend;
pub use token::TokenError;
pub use token::TokenLifetimes;
