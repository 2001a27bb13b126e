//! Validation helpers for query input.

use validator::ValidationError;

/// Validates that a source URL was supplied and is not blank, returning it trimmed.
///
/// # Examples
///
/// ```ignore
/// validate_source_url(Some(" http://a/b.png ")) // Ok("http://a/b.png")
/// validate_source_url(Some("   "))              // Err - blank
/// validate_source_url(None)                     // Err - missing
/// ```
pub fn validate_source_url(url: Option<&str>) -> Result<String, ValidationError> {
    let trimmed = url.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        let mut err = ValidationError::new("url_empty");
        err.message = Some("url is not valid".into());
        return Err(err);
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_source_url_valid() {
        assert_eq!(
            validate_source_url(Some("http://example.com/a.jpg")).unwrap(),
            "http://example.com/a.jpg"
        );
        assert_eq!(validate_source_url(Some("  x  ")).unwrap(), "x");
    }

    #[test]
    fn test_validate_source_url_blank() {
        assert!(validate_source_url(None).is_err());
        assert!(validate_source_url(Some("")).is_err());
        assert!(validate_source_url(Some(" \t\n")).is_err()); // whitespace only
    }

    #[test]
    fn test_validate_source_url_error_code() {
        let err = validate_source_url(Some(" ")).unwrap_err();
        assert_eq!(err.code, "url_empty");
    }
}
