//! Transport layer: the single HTTP exchange the core delegates to.
//!
//! [`crate::api::GitLabApi`] builds an [`HttpRequest`], passes it to an
//! [`HttpClient`] and deciphers the [`HttpResponse`]. [`ReqwestClient`] is
//! the stock implementation; tests plug in replaying mocks.
//!
//! Nothing outside this module performs network I/O.

mod client;
mod error;
mod http;


pub use client::ReqwestClient;
pub use error::HttpError;
pub use http::{HttpClient, HttpRequest, HttpResponse};
