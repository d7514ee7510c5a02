//! Demo server on top of `httpfromtcp`.
//!
//! Serves a few fixed HTML pages and proxies `/httpbin/*` to an upstream, relaying the
//! upstream body as chunks followed by a SHA-256 trailer.

mod config;
mod proxy;
mod router;
mod server;

pub use config::{Config, DEFAULT_PORT, DEFAULT_UPSTREAM};
pub use proxy::Proxy;
pub use router::Router;
pub use server::{run, serve};
