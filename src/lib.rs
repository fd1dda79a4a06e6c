//! Phase-level latency breakdown for a single outbound HTTP request.
//!
//! Create a [`SharedStat`], hand it to the transport as a [`ClientTrace`],
//! issue the request, drain the body, then call [`SharedStat::end`].
#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate tracing;

pub mod app;
pub mod cli;
pub mod client_trace;
pub mod http;
pub mod response;
pub mod timing;
pub mod tls;

pub use client_trace::{ClientTrace, GotConnInfo, TraceEvent};
pub use timing::durations::Durations;
pub use timing::state::Timestamps;
pub use timing::{HttpStat, SharedStat};
