/// Authentication and authorization core
///
/// This module provides the security-sensitive pieces of TaskMaster:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Signed access/refresh token issuance and validation
/// - [`reset`]: Password-reset token generation and expiry rules
/// - [`revocation`]: Refresh-token revocation list (blacklist)
/// - [`middleware`]: Request authentication context for Axum
/// - [`authorization`]: Per-resource ownership checks
///
/// # Security Properties
///
/// - Passwords are stored only as Argon2id hashes; verification is
///   constant-time.
/// - Access tokens are short-lived and stateless; refresh tokens carry a
///   unique `jti` and are individually revocable.
/// - Reset tokens are uniformly random (64 alphanumeric characters) and
///   single-use with a strict 24-hour expiry.
pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod reset;
pub mod revocation;
