pub mod durations;
pub mod recorder;
pub mod state;

use crate::client_trace::{ClientTrace, GotConnInfo, TraceEvent};
use durations::Durations;
use recorder::Recorder;
use state::{stamp, Timestamps};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Latency breakdown of a single request.
///
/// Single use: feed it the events of exactly one request, call [`end`] once
/// after the response body was fully read, then read the durations. Feeding
/// a second request into the same value gives meaningless numbers. Any
/// duration whose phase was not reached reads as zero.
///
/// [`end`]: HttpStat::end
#[derive(Debug, Default, Clone)]
pub struct HttpStat {
    ts: Timestamps,
}

impl HttpStat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: TraceEvent) {
        self.record_at(event, Instant::now());
    }

    pub fn record_at(&mut self, event: TraceEvent, at: Instant) {
        Recorder::new(&mut self.ts).record(event, at);
    }

    /// Marks the response body as drained at `t`.
    ///
    /// Does nothing when no request was ever observed, so an unused value
    /// keeps reporting zero everywhere.
    pub fn end(&mut self, t: Instant) {
        if self.ts.is_empty() {
            debug!("end called before any lifecycle event, nothing to finalize");
            return;
        }
        stamp(&mut self.ts.transfer_done, t);
    }

    pub fn durations(&self) -> Durations {
        durations::project(&self.ts)
    }

    pub fn timestamps(&self) -> &Timestamps {
        &self.ts
    }

    pub fn dns_lookup(&self) -> Duration {
        self.durations().dns_lookup
    }

    pub fn tcp_connection(&self) -> Duration {
        self.durations().tcp_connection
    }

    pub fn tls_handshake(&self) -> Duration {
        self.durations().tls_handshake
    }

    pub fn server_processing(&self) -> Duration {
        self.durations().server_processing
    }

    /// Zero until [`HttpStat::end`] ran.
    pub fn content_transfer(&self) -> Duration {
        self.durations().content_transfer
    }

    pub fn name_lookup(&self) -> Duration {
        self.durations().name_lookup
    }

    pub fn connect(&self) -> Duration {
        self.durations().connect
    }

    pub fn pre_transfer(&self) -> Duration {
        self.durations().pre_transfer
    }

    pub fn start_transfer(&self) -> Duration {
        self.durations().start_transfer
    }

    /// Zero until [`HttpStat::end`] ran.
    pub fn total(&self) -> Duration {
        self.durations().total
    }

    /// Time from name lookup start to `t`.
    pub fn total_at(&self, t: Instant) -> Duration {
        durations::total_at(&self.ts, t)
    }

    /// Time from the first response byte to `t`.
    pub fn content_transfer_at(&self, t: Instant) -> Duration {
        durations::content_transfer_at(&self.ts, t)
    }

    pub fn local_addr(&self) -> &str {
        &self.ts.local_addr
    }

    pub fn remote_addr(&self) -> &str {
        &self.ts.remote_addr
    }

    pub fn is_tls(&self) -> bool {
        self.ts.uses_tls
    }

    pub fn is_reused(&self) -> bool {
        self.ts.conn_reused
    }
}

/// Cloneable handle that lets a transport fire hooks from any task.
///
/// All clones point at the same [`HttpStat`]; the lock orders hook writes
/// against later reads.
#[derive(Debug, Default, Clone)]
pub struct SharedStat {
    inner: Arc<Mutex<HttpStat>>,
}

impl SharedStat {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HttpStat> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, event: TraceEvent) {
        let now = Instant::now();
        self.lock().record_at(event, now);
    }

    pub fn end(&self, t: Instant) {
        self.lock().end(t);
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> HttpStat {
        self.lock().clone()
    }

    pub fn durations(&self) -> Durations {
        self.lock().durations()
    }
}

impl ClientTrace for SharedStat {
    fn dns_start(&self) {
        self.record(TraceEvent::DnsStart);
    }

    fn dns_done(&self) {
        self.record(TraceEvent::DnsDone);
    }

    fn connect_start(&self) {
        self.record(TraceEvent::ConnectStart);
    }

    fn connect_done(&self) {
        self.record(TraceEvent::ConnectDone);
    }

    fn tls_handshake_start(&self) {
        self.record(TraceEvent::TlsHandshakeStart);
    }

    fn tls_handshake_done(&self) {
        self.record(TraceEvent::TlsHandshakeDone);
    }

    fn got_conn(&self, info: GotConnInfo) {
        self.record(TraceEvent::GotConn(info));
    }

    fn wrote_request(&self) {
        self.record(TraceEvent::WroteRequest);
    }

    fn got_first_response_byte(&self) {
        self.record(TraceEvent::GotFirstResponseByte);
    }
}
