//! Customer QR code generation.

use rand::{Rng, distributions::Alphanumeric, thread_rng};

/// Prefix on generated customer QR codes.
pub const QR_CODE_PREFIX: &str = "IK";

const QR_CODE_RANDOM_CHARS: usize = 12;

/// Collision retries before registration fails loudly. The code space makes
/// collisions vanishingly rare; exhausting this means something is wrong.
pub(crate) const MAX_QR_ATTEMPTS: usize = 5;

/// Generate one candidate QR code value.
#[must_use]
pub(crate) fn generate_qr_code() -> String {
    let random: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(QR_CODE_RANDOM_CHARS)
        .map(char::from)
        .collect::<String>()
        .to_uppercase();

    format!("{QR_CODE_PREFIX}{random}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qr_codes_carry_prefix_and_length() {
        let code = generate_qr_code();

        assert!(code.starts_with(QR_CODE_PREFIX));
        assert_eq!(code.len(), QR_CODE_PREFIX.len() + QR_CODE_RANDOM_CHARS);
    }

    #[test]
    fn qr_codes_are_uppercase_alphanumeric() {
        let code = generate_qr_code();

        assert!(
            code.chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn qr_codes_vary() {
        assert_ne!(generate_qr_code(), generate_qr_code());
    }
}
