//! Credential plumbing: token signing and password hashing.

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtConfig, JwtManager, TokenError};
pub use password::{hash_password, verify_password, PasswordError};
