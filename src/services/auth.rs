//! Shared-secret check for uploads.

/// Pick the secret a client sent, in precedence order: multipart body field,
/// `secret` query parameter, `x-upload-secret` header. Empty values are
/// skipped.
pub fn resolve_secret(
    body: Option<String>,
    query: Option<String>,
    header: Option<String>,
) -> Option<String> {
    [body, query, header]
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
}

/// Compare the supplied secret with the configured one.
///
/// With no configured secret the endpoint is open and every caller passes.
/// Otherwise the match is exact and case-sensitive.
pub fn authenticate(supplied: Option<&str>, configured: Option<&str>) -> bool {
    match configured {
        None | Some("") => true,
        Some(expected) => supplied == Some(expected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_access_when_no_secret_configured() {
        assert!(authenticate(None, None));
        assert!(authenticate(Some("anything"), None));
        assert!(authenticate(None, Some("")));
    }

    #[test]
    fn configured_secret_requires_exact_match() {
        assert!(authenticate(Some("s"), Some("s")));
        assert!(!authenticate(Some("wrong"), Some("s")));
        assert!(!authenticate(Some("S"), Some("s")));
        assert!(!authenticate(Some(" s"), Some("s")));
        assert!(!authenticate(None, Some("s")));
    }

    #[test]
    fn body_wins_over_query_and_header() {
        let got = resolve_secret(
            Some("body".into()),
            Some("query".into()),
            Some("header".into()),
        );
        assert_eq!(got.as_deref(), Some("body"));
    }

    #[test]
    fn empty_sources_fall_through() {
        let got = resolve_secret(Some(String::new()), None, Some("header".into()));
        assert_eq!(got.as_deref(), Some("header"));
        assert_eq!(resolve_secret(None, Some(String::new()), None), None);
    }
}
