//! # Router Module
//!
//! Route registration and matching.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Building [`Route`]s from a method list, a raw path and an action
//! - Merging [`GroupAttributes`] (prefix, suffix, namespace, middleware)
//!   into routes declared inside nested groups
//! - Matching requests by method and canonical path, extracting `{param}`
//!   segments
//! - Telling "no such path" apart from "path exists, wrong method"
//!
//! ## Example
//!
//! ```
//! use ant_kernel::router::{GroupAttributes, RouteTable};
//! use http::Method;
//!
//! # fn main() -> Result<(), ant_kernel::error::ValidationError> {
//! let mut table = RouteTable::new();
//! table.group(
//!     GroupAttributes::new().prefix("/app").namespace("App\\Controller"),
//!     |t| {
//!         t.get("/users/{id}", "UserController@show")?;
//!         Ok(())
//!     },
//! )?;
//!
//! let m = table.match_route(&Method::GET, "/app/users/42/").unwrap();
//! assert_eq!(m.get_path_param("id"), Some("42"));
//! assert_eq!(m.route.action().to_string(), "App\\Controller\\UserController@show");
//! # Ok(())
//! # }
//! ```

mod core;
mod group;
mod path;
mod radix;
mod route;
#[cfg(test)]
mod tests;

pub use self::core::{Lookup, RouteMatch, RouteTable, ParamVec, MAX_INLINE_PARAMS};
pub use group::GroupAttributes;
pub use path::{is_canonical, normalize_path};
pub use route::{handler, Action, ActionSpec, Arguments, RawAction, Route};
