use crate::timing::state::Timestamps;
use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};

/// Per-phase durations followed by cumulative checkpoints measured from the
/// start of name lookup.
///
/// ```text
/// |--NameLookup
/// |--|--Connect
/// |--|--|--PreTransfer
/// |--|--|--|--StartTransfer
/// |--|--|--|--|--Total
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Durations {
    pub dns_lookup: Duration,
    pub tcp_connection: Duration,
    pub tls_handshake: Duration,
    pub server_processing: Duration,
    pub content_transfer: Duration,

    pub name_lookup: Duration,
    pub connect: Duration,
    pub pre_transfer: Duration,
    pub start_transfer: Duration,
    pub total: Duration,
}

impl Durations {
    /// Name-keyed view for generic key/value dumps.
    pub fn entries(&self) -> [(&'static str, Duration); 10] {
        [
            ("DNSLookup", self.dns_lookup),
            ("TCPConnection", self.tcp_connection),
            ("TLSHandshake", self.tls_handshake),
            ("ServerProcessing", self.server_processing),
            ("ContentTransfer", self.content_transfer),
            ("NameLookup", self.name_lookup),
            ("Connect", self.connect),
            ("PreTransfer", self.pre_transfer),
            ("StartTransfer", self.start_transfer),
            ("Total", self.total),
        ]
    }
}

impl fmt::Display for Durations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.entries() {
            writeln!(f, "{:<17} {:>8} ms", name, value.as_millis())?;
        }
        Ok(())
    }
}

/// `end - start`, zero when either side is unset or the pair is inverted.
fn between(end: Option<Instant>, start: Option<Instant>) -> Duration {
    match (end, start) {
        (Some(end), Some(start)) => end.saturating_duration_since(start),
        _ => Duration::ZERO,
    }
}

pub fn project(ts: &Timestamps) -> Durations {
    let name_lookup = between(ts.dns_done, ts.dns_start);
    let connect = between(ts.tcp_done, ts.dns_start);

    let (tls_handshake, pre_transfer) = if ts.uses_tls {
        (
            between(ts.tls_done, ts.tls_start),
            between(ts.tls_done, ts.dns_start),
        )
    } else if ts.server_start.is_some() {
        (Duration::ZERO, connect)
    } else {
        (Duration::ZERO, Duration::ZERO)
    };

    Durations {
        dns_lookup: name_lookup,
        tcp_connection: between(ts.tcp_done, ts.tcp_start),
        tls_handshake,
        server_processing: between(ts.server_done, ts.server_start),
        content_transfer: between(ts.transfer_done, ts.transfer_start),

        name_lookup,
        connect,
        pre_transfer,
        start_transfer: between(ts.server_done, ts.dns_start),
        total: between(ts.transfer_done, ts.dns_start),
    }
}

/// Running total up to `t`, for callers that have not drained the body yet.
pub fn total_at(ts: &Timestamps, t: Instant) -> Duration {
    between(Some(t), ts.dns_start)
}

/// Body transfer time up to `t`.
pub fn content_transfer_at(ts: &Timestamps, t: Instant) -> Duration {
    between(Some(t), ts.server_done)
}
