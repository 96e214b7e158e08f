//! # CLI Module
//!
//! Command-line front end for the kernel, shipped as the `ant-kernel`
//! binary. It serves a small demo application: `GET /test` answers `123`
//! and `GET /` is routed to `App\Controller\IndexController@index`.
//!
//! ## Commands
//!
//! ### `cgi`
//!
//! Handle one request from a CGI/1.1 environment, writing a CGI response
//! (`Status: 200 OK` style) to stdout:
//!
//! ```bash
//! REQUEST_METHOD=GET PATH_INFO=/test ant-kernel cgi
//! ```
//!
//! ### `request`
//!
//! Simulate one request and print the raw HTTP response:
//!
//! ```bash
//! ant-kernel request --method GET --path /missing --accept text/html
//! ```
//!
//! ### `routes`
//!
//! List the route table.
//!
//! Every command accepts `--config <FILE>` (or `ANT_CONFIG`) pointing at a
//! TOML [`KernelConfig`](crate::config::KernelConfig); `ANT_*` variables
//! override it.

mod commands;


pub use commands::{demo_kernel, run_cli, Cli, Commands};
