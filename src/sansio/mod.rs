//! Sans-I/O protocol helpers for GitLab's REST API and webhooks.
//!
//! Nothing here performs I/O. The functions turn raw HTTP pieces (status,
//! headers, body bytes) into typed values and back:
//! - Body decoding by content type ([`decode_body`])
//! - Rate limit extraction ([`RateLimit`])
//! - Response classification and pagination links ([`decipher_response`])
//! - Request header construction ([`create_headers`])
//! - Webhook event validation ([`Event::from_request`])

mod decode;
mod error;
mod event;
mod rate_limit;
mod response;

#[cfg(test)]
mod event_tests;

pub use decode::{DecodeError, decode_body, parse_content_type};
pub use error::GitLabError;
pub use event::{EVENT_HEADER, Event, TOKEN_HEADER};
pub use rate_limit::RateLimit;
pub use response::{
    Deciphered, SUCCESS_STATUSES, create_headers, decipher_response, next_link,
};
