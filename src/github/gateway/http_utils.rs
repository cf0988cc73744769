//! Shared HTTP utilities for gateway implementations.

use http::header::{HeaderMap, HeaderValue, IF_NONE_MATCH};

use super::CacheTag;

pub(super) fn build_conditional_headers(cache_tag: Option<&CacheTag>) -> Option<HeaderMap> {
    let mut headers = HeaderMap::new();

    if let Some(tag) = cache_tag
        && let Ok(value) = tag.as_str().parse()
    {
        headers.insert(IF_NONE_MATCH, value);
    }

    if headers.is_empty() {
        None
    } else {
        Some(headers)
    }
}

pub(super) fn header_to_string(header_value: Option<&HeaderValue>) -> Option<String> {
    header_value
        .and_then(|raw| raw.to_str().ok())
        .map(ToOwned::to_owned)
}

pub(super) fn extract_github_message(body: &str) -> Option<String> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return None;
    };
    value
        .get("message")
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use http::header::IF_NONE_MATCH;

    use super::{build_conditional_headers, extract_github_message};
    use crate::github::gateway::CacheTag;

    #[test]
    fn no_tag_means_no_conditional_headers() {
        assert!(build_conditional_headers(None).is_none());
    }

    #[test]
    fn tag_is_sent_as_if_none_match() {
        let tag = CacheTag::new("W/\"abc123\"");
        let headers = build_conditional_headers(Some(&tag)).expect("headers should be built");
        assert_eq!(
            headers.get(IF_NONE_MATCH).and_then(|value| value.to_str().ok()),
            Some("W/\"abc123\"")
        );
    }

    #[test]
    fn extracts_message_from_error_body() {
        assert_eq!(
            extract_github_message(r#"{"message":"Not Found","documentation_url":"x"}"#).as_deref(),
            Some("Not Found")
        );
        assert_eq!(extract_github_message("<html>"), None);
    }
}
