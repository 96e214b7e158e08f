//! # HTTP Model
//!
//! Request and response values passed through the kernel. The kernel never
//! parses wire bytes itself: front ends (see [`crate::cgi`]) build a
//! [`Request`], and the [`crate::emitter`] turns the final [`Response`] into
//! transport writes.
//!
//! Headers are stored in a [`HeaderMap`] keyed case-insensitively with
//! multiple ordered values per name; display casing is applied only at
//! emission.

mod cookie;
mod headers;
mod request;
mod response;

pub use cookie::{http_date, Cookie, Expires};
pub use headers::{display_name, HeaderMap, HeaderValues};
pub use request::{negotiate, Request};
pub use response::{status_reason, Response};
