//! # Exception Module
//!
//! The kernel's single recovery point. Every failure raised while the
//! pipeline runs, and every panic caught around it, arrives here as a
//! [`Failure`], is classified into an [`ExceptionRecord`] and leaves as a
//! well-formed [`Response`](crate::http::Response).
//!
//! | Failure | Classification | Status |
//! |---|---|---|
//! | [`HttpError`](crate::error::HttpError) | `Structured` | its own |
//! | [`RoutingError`](crate::error::RoutingError) | `Structured` | 404 / 405 |
//! | panic ([`FatalFault`]) | `Fatal` | 500 |
//! | anything else | `Recoverable` | 500 |

mod fault;
mod gateway;
mod page;
mod record;

pub use fault::{guard, install_hook, FatalFault};
pub use gateway::{ExceptionGateway, ExceptionHandler, Failure};
pub use page::{escape_html, render_page};
pub use record::{Classification, ExceptionRecord};
