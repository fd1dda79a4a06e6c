use std::net::SocketAddr;
use std::time::Instant;

/// Raw instants observed for one request.
///
/// An unset boundary is `None`. Owned by exactly one in-flight request and
/// discarded once its durations were read.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Timestamps {
    pub dns_start: Option<Instant>,
    pub dns_done: Option<Instant>,
    pub tcp_start: Option<Instant>,
    pub tcp_done: Option<Instant>,
    pub tls_start: Option<Instant>,
    pub tls_done: Option<Instant>,
    pub conn_acquired: Option<Instant>,
    /// Request fully written; server processing starts here.
    pub server_start: Option<Instant>,
    pub server_done: Option<Instant>,
    pub transfer_start: Option<Instant>,
    /// Only ever set by [`crate::HttpStat::end`].
    pub transfer_done: Option<Instant>,

    pub uses_tls: bool,
    pub conn_reused: bool,

    pub local_addr: String,
    pub remote_addr: String,
}

impl Timestamps {
    pub fn new() -> Self {
        Self::default()
    }

    /// True until the first lifecycle anchor exists.
    pub fn is_empty(&self) -> bool {
        self.dns_start.is_none()
    }
}

/// Stamps `at` into `slot`, never moving an already set instant backwards.
pub(crate) fn stamp(slot: &mut Option<Instant>, at: Instant) {
    *slot = Some(match *slot {
        Some(prev) if prev > at => prev,
        _ => at,
    });
}

/// Host portion of a socket address.
pub(crate) fn host_of(addr: Option<SocketAddr>) -> String {
    addr.map(|a| a.ip().to_string()).unwrap_or_default()
}
