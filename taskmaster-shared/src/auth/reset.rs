/// Password-reset tokens
///
/// Reset tokens are opaque random strings mailed to the user inside a
/// reset link. They are stored on the user row together with an expiry
/// timestamp and are single-use: consuming one clears both fields in the
/// same statement (see `User::consume_reset_token`).
///
/// Tokens are 64 alphanumeric characters drawn from the OS RNG, roughly
/// 380 bits of entropy, well above the 256-bit floor required to make
/// guessing infeasible.
use chrono::{DateTime, Duration, Utc};
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};

/// Length of a reset token in characters
pub const RESET_TOKEN_LEN: usize = 64;

/// How long a reset token stays valid
pub const RESET_TOKEN_TTL_HOURS: i64 = 24;

/// Generates a fresh uniformly-random reset token
pub fn generate_reset_token() -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(RESET_TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// Expiry timestamp for a token generated at `now`
pub fn reset_token_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::hours(RESET_TOKEN_TTL_HOURS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_length_and_alphabet() {
        let token = generate_reset_token();
        assert_eq!(token.len(), RESET_TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_tokens_are_unique() {
        let a = generate_reset_token();
        let b = generate_reset_token();
        assert_ne!(a, b);
    }

    #[test]
    fn test_expiry_is_24_hours_out() {
        let now = Utc::now();
        let expiry = reset_token_expiry(now);
        assert_eq!(expiry - now, Duration::hours(24));
    }
}
