pub mod identity;
pub mod revocation;
