//! Shared-secret bearer checks for trigger and admin endpoints.

use super::{ServiceError, ServiceResult};

/// Compares two byte strings in time independent of where they differ.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Extracts the token of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let value = header?.trim();
    let (scheme, token) = value.split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim())
        .filter(|token| !token.is_empty())
}

/// Accepts the request only when the header carries `expected` as bearer token.
///
/// An empty configured secret rejects everything.
pub fn authorize_bearer(header: Option<&str>, expected: &str) -> ServiceResult<()> {
    let Some(token) = bearer_token(header) else {
        return Err(ServiceError::Unauthorized);
    };
    if expected.is_empty() || !constant_time_eq(token.as_bytes(), expected.as_bytes()) {
        log::warn!("Rejected trigger with invalid bearer token");
        return Err(ServiceError::Unauthorized);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_matching_token() {
        assert_eq!(authorize_bearer(Some("Bearer s3cret"), "s3cret"), Ok(()));
        assert_eq!(authorize_bearer(Some("bearer   s3cret "), "s3cret"), Ok(()));
    }

    #[test]
    fn rejects_missing_or_wrong_token() {
        assert_eq!(
            authorize_bearer(None, "s3cret"),
            Err(ServiceError::Unauthorized)
        );
        assert_eq!(
            authorize_bearer(Some("Bearer nope"), "s3cret"),
            Err(ServiceError::Unauthorized)
        );
        assert_eq!(
            authorize_bearer(Some("Basic s3cret"), "s3cret"),
            Err(ServiceError::Unauthorized)
        );
        assert_eq!(
            authorize_bearer(Some("Bearer "), ""),
            Err(ServiceError::Unauthorized)
        );
    }

    #[test]
    fn empty_secret_rejects_everything() {
        assert_eq!(
            authorize_bearer(Some("Bearer anything"), ""),
            Err(ServiceError::Unauthorized)
        );
    }
}
