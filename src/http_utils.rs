use http::header::{HeaderMap, HeaderValue, CONTENT_TYPE};

pub const MIME_TYPE_JSON: &str = "application/json";
pub const MIME_TYPE_JWKS: &str = "application/jwk-set+json";

pub fn header_starts_with_ignoring_case(header: &HeaderValue, expected_start: &str) -> bool {
    header
        .to_str()
        .ok()
        .filter(|ct| ct.to_lowercase().starts_with(&expected_start.to_lowercase()))
        .is_some()
}

pub fn check_content_type(headers: &HeaderMap, expected_content_type: &str) -> Result<(), String> {
    headers
        .get(CONTENT_TYPE)
        .map_or(Ok(()), |content_type|
            // Media types are case insensitive and may be followed by optional whitespace and/or
            // a parameter (e.g., charset). See https://tools.ietf.org/html/rfc7231#section-3.1.1.1.
            if !header_starts_with_ignoring_case(content_type, expected_content_type) {
                Err(
                    format!(
                        "Unexpected response Content-Type: {:?}, should be `{}`",
                        content_type,
                        expected_content_type
                    )
                )
            } else {
                Ok(())
            }
        )
}
