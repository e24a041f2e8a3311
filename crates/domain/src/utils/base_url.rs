//! Base URL normalization
//!
//! Users paste instance URLs in several shapes (`https://acme.example.com`,
//! `.../api`, `.../api/`). Request paths are resolved relative to the API
//! root, so the base must end in `/api/`.

/// Normalize an instance URL so it ends with the API root segment.
///
/// Keyed on the last four characters of inputs longer than five:
/// `api/` is kept, `.com` and `com/` gain `/api/` or `api/`, `/api` gains the
/// trailing slash. Anything else is returned unchanged.
#[must_use]
pub fn normalize_base_url(raw: &str) -> String {
    let url = raw.trim();
    if url.len() <= 5 {
        return url.to_string();
    }

    if url.ends_with("api/") {
        url.to_string()
    } else if url.ends_with(".com") {
        format!("{url}/api/")
    } else if url.ends_with("com/") {
        format!("{url}api/")
    } else if url.ends_with("/api") {
        format!("{url}/")
    } else {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        let cases = [
            ("https://x.example.com/api/", "https://x.example.com/api/"),
            ("https://x.example.com", "https://x.example.com/api/"),
            ("https://x.example.com/", "https://x.example.com/api/"),
            ("https://x.example.com/api", "https://x.example.com/api/"),
            ("  https://x.example.com/api  ", "https://x.example.com/api/"),
            ("https://x.example.io:19999/", "https://x.example.io:19999/"),
            ("a.com", "a.com"),
        ];

        for (input, expected) in cases {
            assert_eq!(normalize_base_url(input), expected, "input: {input:?}");
        }
    }
}
