//! Shared test fixtures for API client tests.

use crate::transport::{HttpClient, HttpError, HttpRequest, HttpResponse};
use http::{HeaderMap, HeaderValue, StatusCode};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Headers GitLab sends with a typical JSON response.
pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("ratelimit-limit", HeaderValue::from_static("2"));
    headers.insert("ratelimit-remaining", HeaderValue::from_static("1"));
    headers.insert("ratelimit-reset", HeaderValue::from_static("0"));
    headers.insert(
        http::header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers
}

pub fn json_response(status: StatusCode, body: &str) -> HttpResponse {
    HttpResponse::new(status, default_headers(), body.as_bytes().to_vec())
}

/// Mock HTTP client replaying canned responses and recording requests.
///
/// Responses are consumed in order; the last one is repeated forever.
#[derive(Debug)]
pub struct MockClient {
    responses: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockClient {
    pub fn new(responses: Vec<Result<HttpResponse, HttpError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn responding(response: HttpResponse) -> Self {
        Self::new(vec![Ok(response)])
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

impl HttpClient for MockClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.requests.lock().unwrap().push(req);
        let mut responses = self.responses.lock().unwrap();
        if responses.len() > 1 {
            responses.pop_front().unwrap()
        } else {
            match responses.front().unwrap() {
                Ok(resp) => Ok(resp.clone()),
                Err(_) => Err(HttpError::Timeout),
            }
        }
    }
}
