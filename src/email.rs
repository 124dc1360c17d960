//! Email identity validation and normalization.

use crate::error::AuthError;

/// Validate and normalize an email identity.
///
/// - Trims whitespace
/// - Checks the basic shape only: non-empty local part, "@", and a domain
///   containing a "." (deliberately not full RFC validation)
/// - Lowercases the result for consistent lookups
///
/// Returns the normalized email string.
pub fn email_normalize(email: &str) -> Result<String, AuthError> {
    let trimmed = email.trim();

    if !email_shape_valid(trimmed) {
        return Err(AuthError::InvalidEmail);
    }

    Ok(trimmed.to_lowercase())
}

/// Basic email shape check: `local@domain` with a dot somewhere in the domain.
fn email_shape_valid(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    // The last "@" splits local part from domain; anything before it is
    // accepted as the local part.
    let Some(at) = email.rfind('@') else {
        return false;
    };
    let (local, domain) = (&email[..at], &email[at + 1..]);

    if local.is_empty() || domain.is_empty() {
        return false;
    }

    // The domain needs an interior dot: "a.b", not ".b" or "a.".
    domain
        .find('.')
        .is_some_and(|dot| dot > 0 && dot < domain.len() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        let result = email_normalize("user@example.com");
        assert_eq!(result.unwrap(), "user@example.com");
    }

    #[test]
    fn test_normalizes_case() {
        let result = email_normalize("User@Example.COM");
        assert_eq!(result.unwrap(), "user@example.com");
    }

    #[test]
    fn test_trims_whitespace() {
        let result = email_normalize("  user@example.com  ");
        assert_eq!(result.unwrap(), "user@example.com");
    }

    #[test]
    fn test_rejects_invalid_no_at() {
        let result = email_normalize("userexample.com");
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_invalid_no_domain() {
        let result = email_normalize("user@");
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_invalid_no_local() {
        let result = email_normalize("@example.com");
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_domain_without_dot() {
        let result = email_normalize("user@localhost");
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_interior_whitespace() {
        let result = email_normalize("us er@example.com");
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_empty() {
        let result = email_normalize("");
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_whitespace_only() {
        let result = email_normalize("   ");
        assert!(result.is_err());
    }
}
