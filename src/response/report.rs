use crate::http::handler::TracedResponse;
use crate::timing::durations::Durations;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Milliseconds for every phase and checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimingsMs {
    pub dns_lookup: f64,
    pub tcp_connection: f64,
    pub tls_handshake: f64,
    pub server_processing: f64,
    pub content_transfer: f64,
    pub name_lookup: f64,
    pub connect: f64,
    pub pre_transfer: f64,
    pub start_transfer: f64,
    pub total: f64,
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

impl From<&Durations> for TimingsMs {
    fn from(d: &Durations) -> Self {
        Self {
            dns_lookup: millis(d.dns_lookup),
            tcp_connection: millis(d.tcp_connection),
            tls_handshake: millis(d.tls_handshake),
            server_processing: millis(d.server_processing),
            content_transfer: millis(d.content_transfer),
            name_lookup: millis(d.name_lookup),
            connect: millis(d.connect),
            pre_transfer: millis(d.pre_transfer),
            start_transfer: millis(d.start_transfer),
            total: millis(d.total),
        }
    }
}

/// Edge representation of one measured request.
#[derive(Debug, Clone, Serialize)]
pub struct StatReport {
    pub url: String,
    pub started_at: DateTime<Utc>,
    pub status: u16,
    pub local_addr: String,
    pub remote_addr: String,
    pub tls: bool,
    pub reused: bool,
    pub body_bytes: usize,
    pub timings_ms: TimingsMs,
    #[serde(skip)]
    durations: Durations,
}

impl StatReport {
    pub fn new(url: &str, response: &TracedResponse) -> Self {
        let durations = response.stat.durations();
        Self {
            url: url.to_string(),
            started_at: response.started_at,
            status: response.parts.status.as_u16(),
            local_addr: response.stat.local_addr().to_string(),
            remote_addr: response.stat.remote_addr().to_string(),
            tls: response.stat.is_tls(),
            reused: response.stat.is_reused(),
            body_bytes: response.body.len(),
            timings_ms: TimingsMs::from(&durations),
            durations,
        }
    }

    pub fn to_json(&self) -> Result<String, anyhow::Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for StatReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.durations;
        let finished = !d.total.is_zero();

        writeln!(
            f,
            "Connected to {} from {}",
            self.remote_addr, self.local_addr
        )?;
        writeln!(f)?;
        writeln!(f, "DNS lookup:        {:>4} ms", d.dns_lookup.as_millis())?;
        writeln!(f, "TCP connection:    {:>4} ms", d.tcp_connection.as_millis())?;
        writeln!(f, "TLS handshake:     {:>4} ms", d.tls_handshake.as_millis())?;
        writeln!(
            f,
            "Server processing: {:>4} ms",
            d.server_processing.as_millis()
        )?;
        if finished {
            writeln!(
                f,
                "Content transfer:  {:>4} ms",
                d.content_transfer.as_millis()
            )?;
        } else {
            writeln!(f, "Content transfer:  {:>4} ms", "-")?;
        }
        writeln!(f)?;
        writeln!(f, "Name Lookup:    {:>4} ms", d.name_lookup.as_millis())?;
        writeln!(f, "Connect:        {:>4} ms", d.connect.as_millis())?;
        writeln!(f, "Pre Transfer:   {:>4} ms", d.pre_transfer.as_millis())?;
        writeln!(f, "Start Transfer: {:>4} ms", d.start_transfer.as_millis())?;
        if finished {
            writeln!(f, "Total:          {:>4} ms", d.total.as_millis())?;
        } else {
            writeln!(f, "Total:          {:>4} ms", "-")?;
        }
        Ok(())
    }
}
