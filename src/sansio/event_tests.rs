//! Tests for webhook `Event` construction and validation.

use super::{EVENT_HEADER, Event, GitLabError, TOKEN_HEADER};
use http::{HeaderMap, HeaderValue, StatusCode};
use serde_json::json;

const SECRET: &str = "123456";
const PUSH_BODY: &[u8] = br#"{"object_kind": "push"}"#;

fn headers(content_type: Option<&'static str>, token: Option<&'static str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(EVENT_HEADER, HeaderValue::from_static("Push Hook"));
    if let Some(content_type) = content_type {
        headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static(content_type),
        );
    }
    if let Some(token) = token {
        headers.insert(TOKEN_HEADER, HeaderValue::from_static(token));
    }
    headers
}

mod from_request {
    use super::*;

    #[test]
    fn json_with_matching_secret() {
        let event = Event::from_request(
            &headers(Some("application/json"), Some(SECRET)),
            PUSH_BODY,
            Some(SECRET),
        )
        .unwrap();

        assert_eq!(event.event_type(), "Push Hook");
        assert_eq!(event.data(), &json!({"object_kind": "push"}));
        assert_eq!(event.secret(), Some(SECRET));
    }

    #[test]
    fn form_encoded_payload() {
        let body = b"payload=%7B%22object_kind%22%3A%22push%22%7D";

        let event = Event::from_request(
            &headers(Some("application/x-www-form-urlencoded"), Some("my-secret-token")),
            body,
            Some("my-secret-token"),
        )
        .unwrap();

        assert_eq!(event.data()["object_kind"], "push");
    }

    #[test]
    fn no_token_and_no_secret_succeeds() {
        let event =
            Event::from_request(&headers(Some("application/json"), None), PUSH_BODY, None)
                .unwrap();

        assert_eq!(event.event_type(), "Push Hook");
        assert!(event.secret().is_none());
    }

    #[test]
    fn token_without_configured_secret_fails() {
        let result = Event::from_request(
            &headers(Some("application/json"), Some(SECRET)),
            PUSH_BODY,
            None,
        );

        assert!(matches!(result, Err(GitLabError::ValidationFailure(_))));
    }

    #[test]
    fn secret_without_token_fails() {
        let result =
            Event::from_request(&headers(Some("application/json"), None), PUSH_BODY, Some(SECRET));

        match result {
            Err(GitLabError::ValidationFailure(msg)) => assert!(msg.contains("missing")),
            other => panic!("Expected ValidationFailure, got {other:?}"),
        }
    }

    #[test]
    fn wrong_secret_fails() {
        let result = Event::from_request(
            &headers(Some("application/json"), Some(SECRET)),
            PUSH_BODY,
            Some("bad secret"),
        );

        assert!(matches!(result, Err(GitLabError::ValidationFailure(_))));
    }

    #[test]
    fn missing_content_type_is_unsupported_media() {
        let err = Event::from_request(&headers(None, Some(SECRET)), PUSH_BODY, Some(SECRET))
            .unwrap_err();

        assert!(err.is_bad_request());
        assert_eq!(err.status_code(), Some(StatusCode::UNSUPPORTED_MEDIA_TYPE));
        assert!(err.to_string().contains("application/json"));
        assert!(err.to_string().contains("application/x-www-form-urlencoded"));
    }

    #[test]
    fn unknown_content_type_is_unsupported_media() {
        let err = Event::from_request(
            &headers(Some("image/png"), Some(SECRET)),
            PUSH_BODY,
            Some(SECRET),
        )
        .unwrap_err();

        assert_eq!(err.status_code(), Some(StatusCode::UNSUPPORTED_MEDIA_TYPE));
    }

    #[test]
    fn validation_runs_before_decoding() {
        let result = Event::from_request(&headers(Some("image/png"), None), PUSH_BODY, Some(SECRET));

        assert!(matches!(result, Err(GitLabError::ValidationFailure(_))));
    }

    #[test]
    fn missing_event_header_is_bad_request() {
        let mut headers = headers(Some("application/json"), None);
        headers.remove(EVENT_HEADER);

        let err = Event::from_request(&headers, PUSH_BODY, None).unwrap_err();

        assert_eq!(err.status_code(), Some(StatusCode::BAD_REQUEST));
    }
}

mod accessors {
    use super::*;

    #[test]
    fn object_attributes_defaults_to_empty() {
        let event = Event::new(json!({"object_kind": "push"}), "Push Hook", None);

        assert!(event.object_attributes().is_empty());
    }

    #[test]
    fn object_attributes_returns_nested_object() {
        let event = Event::new(
            json!({"object_attributes": {"action": "open", "iid": 7}}),
            "Issue Hook",
            None,
        );

        assert_eq!(event.object_attributes()["action"], "open");
        assert_eq!(event.object_attributes().len(), 2);
    }

    #[test]
    fn project_id_present() {
        let event = Event::new(json!({"project": {"id": 42}}), "Push Hook", None);

        assert_eq!(event.project_id().unwrap(), &json!(42));
    }

    #[test]
    fn project_id_absent_is_attribute_not_found() {
        let event = Event::new(json!({"object_kind": "push"}), "Push Hook", None);

        assert!(matches!(
            event.project_id(),
            Err(GitLabError::AttributeNotFound(_))
        ));
    }
}
