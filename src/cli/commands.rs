use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use http::Method;
use tracing::{error, info};

use crate::config::KernelConfig;
use crate::dispatcher::ControllerRegistry;
use crate::emitter::{Completion, ResponseEmitter, StreamSink, TransportSink};
use crate::error::HttpError;
use crate::exception::{guard, Failure};
use crate::http::Request;
use crate::kernel::{Kernel, KernelBuilder};
use crate::logging::{init_logging, LogConfig};
use crate::middleware::{MetricsMiddleware, TracingMiddleware};
use crate::router::{GroupAttributes, RawAction, RouteTable};

/// Command-line interface for the kernel
#[derive(Parser)]
#[command(name = "ant-kernel")]
#[command(about = "Ant request-processing kernel", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "ANT_CONFIG")]
    pub config: Option<PathBuf>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Handle one request from the CGI environment and stdin
    Cgi,
    /// Simulate a request and print the raw HTTP response
    Request {
        #[arg(short, long, default_value = "GET")]
        method: String,

        #[arg(short, long, default_value = "/")]
        path: String,

        /// Extra header as `Name: value` (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Query parameter as `name=value` (repeatable)
        #[arg(short, long)]
        query: Vec<String>,

        /// Shortcut for an `Accept` header
        #[arg(long)]
        accept: Option<String>,

        #[arg(long)]
        body: Option<String>,
    },
    /// List registered routes
    Routes,
}

/// The demo application served by the binary.
///
/// # Errors
///
/// Returns an error when a route definition is invalid.
pub fn demo_kernel(config: KernelConfig) -> anyhow::Result<Kernel> {
    let mut routes = RouteTable::new();
    routes.get("/test", RawAction::closure(|_, _, _| Ok("123")))?;
    routes.group(
        GroupAttributes::new().prefix("/").namespace("App\\Controller"),
        |routes| {
            routes.get("/", "IndexController@index")?;
            Ok(())
        },
    )?;

    let mut controllers = ControllerRegistry::new();
    controllers.register("App\\Controller\\IndexController@index", |req, _, _| {
        Ok(format!("Hello from {}", req.path))
    });

    let kernel = KernelBuilder::new()
        .config(config)
        .routes(routes)
        .controllers(controllers)
        .middleware(Arc::new(TracingMiddleware))
        .middleware(Arc::new(MetricsMiddleware::new()))
        .build()?;
    Ok(kernel)
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<KernelConfig> {
    let base = match path {
        Some(path) => KernelConfig::from_file(path)?,
        None => KernelConfig::default(),
    };
    Ok(base.with_overrides(|key| std::env::var(key).ok()))
}

fn simulated_request(
    method: &str,
    path: &str,
    headers: &[String],
    query: &[String],
    accept: Option<&str>,
    body: Option<&str>,
) -> anyhow::Result<Request> {
    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("invalid method '{method}'"))?;
    let mut req = Request::new(method, path);
    for header in headers {
        let (name, value) = header
            .split_once(':')
            .with_context(|| format!("header '{header}' is not `Name: value`"))?;
        req = req.with_header(name.trim(), value.trim());
    }
    for pair in query {
        let (name, value) = pair.split_once('=').unwrap_or((pair.as_str(), ""));
        req = req.with_query(name, value);
    }
    if let Some(accept) = accept {
        req = req.with_header("Accept", accept);
    }
    if let Some(body) = body {
        req = req.with_body(body.as_bytes());
    }
    Ok(req)
}

/// Run `req` against `kernel`, answering a panic that escapes the kernel
/// through [`Kernel::recover`].
fn serve<S: TransportSink>(kernel: &Kernel, req: &Request, sink: &mut S) {
    if let Err(fault) = guard(|| kernel.run(req, sink)) {
        error!(panic_message = %fault.message, "Fault outside request processing");
        let _ = kernel.recover(fault, sink);
    }
}

/// Emit a 400 for a request the front end could not even build.
pub(super) fn reject<S: TransportSink>(kernel: &Kernel, err: anyhow::Error, sink: &mut S) {
    let req = kernel.synthetic_request();
    let res = kernel.prepare_response(&req);
    let failure = Failure::Error(HttpError::bad_request(format!("{err:#}")).into());
    let res = kernel.gateway().handle(failure, &req, res);
    ResponseEmitter::new(kernel.config().output_base_level).emit(&res, sink, Completion::Error);
}

/// Parse command-line arguments and run the selected command
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded, the demo
/// application fails validation, or output cannot be written.
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(&LogConfig::from_env())?;
    let kernel = demo_kernel(load_config(cli.config.as_ref())?)?;

    match &cli.command {
        Commands::Cgi => {
            let stdout = io::stdout();
            let mut sink = StreamSink::cgi(stdout.lock());
            match crate::cgi::request_from_env(&mut io::stdin().lock()) {
                Ok(req) => serve(&kernel, &req, &mut sink),
                Err(err) => reject(&kernel, err, &mut sink),
            }
            sink.into_inner().flush()?;
        }
        Commands::Request {
            method,
            path,
            headers,
            query,
            accept,
            body,
        } => {
            let req = simulated_request(
                method,
                path,
                headers,
                query,
                accept.as_deref(),
                body.as_deref(),
            )?;
            let stdout = io::stdout();
            let mut sink = StreamSink::http(stdout.lock());
            serve(&kernel, &req, &mut sink);
            let mut out = sink.into_inner();
            writeln!(out)?;
            out.flush()?;
        }
        Commands::Routes => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            kernel.routes().dump(&mut out)?;
            out.flush()?;
        }
    }
    info!("Done");
    Ok(())
}
