use crate::client_trace::{GotConnInfo, TraceEvent};
use crate::timing::state::{host_of, stamp, Timestamps};
use std::time::Instant;

/// Turns lifecycle events into instants on a borrowed [`Timestamps`].
///
/// No event is ever rejected. A duplicate or out-of-place event overwrites
/// the matching instant forward in time, and boundaries the transport never
/// reported are synthesized so that later subtraction stays well defined.
/// Reused-connection synthesis is the one place that assigns outright.
pub struct Recorder<'a> {
    ts: &'a mut Timestamps,
}

impl<'a> Recorder<'a> {
    pub fn new(ts: &'a mut Timestamps) -> Self {
        Self { ts }
    }

    pub fn record(&mut self, event: TraceEvent, at: Instant) {
        trace!(event = event.name(), "lifecycle event");
        match event {
            TraceEvent::DnsStart => self.dns_start(at),
            TraceEvent::DnsDone => self.dns_done(at),
            TraceEvent::ConnectStart => self.connect_start(at),
            TraceEvent::ConnectDone => self.connect_done(at),
            TraceEvent::TlsHandshakeStart => self.tls_handshake_start(at),
            TraceEvent::TlsHandshakeDone => self.tls_handshake_done(at),
            TraceEvent::GotConn(info) => self.got_conn(info, at),
            TraceEvent::WroteRequest => self.wrote_request(at),
            TraceEvent::GotFirstResponseByte => self.got_first_response_byte(at),
        }
    }

    pub fn dns_start(&mut self, at: Instant) {
        stamp(&mut self.ts.dns_start, at);
    }

    pub fn dns_done(&mut self, at: Instant) {
        stamp(&mut self.ts.dns_done, at);
    }

    pub fn connect_start(&mut self, at: Instant) {
        stamp(&mut self.ts.tcp_start, at);

        // Dialing an IP literal: no lookup happened.
        if self.ts.dns_start.is_none() {
            self.ts.dns_start = self.ts.tcp_start;
            self.ts.dns_done = self.ts.tcp_start;
        }
    }

    pub fn connect_done(&mut self, at: Instant) {
        stamp(&mut self.ts.tcp_done, at);
    }

    pub fn tls_handshake_start(&mut self, at: Instant) {
        self.ts.uses_tls = true;
        stamp(&mut self.ts.tls_start, at);
    }

    pub fn tls_handshake_done(&mut self, at: Instant) {
        stamp(&mut self.ts.tls_done, at);
    }

    pub fn got_conn(&mut self, info: GotConnInfo, at: Instant) {
        stamp(&mut self.ts.conn_acquired, at);
        if info.reused {
            self.ts.conn_reused = true;
        }
        if info.local_addr.is_some() {
            self.ts.local_addr = host_of(info.local_addr);
        }
        if info.remote_addr.is_some() {
            self.ts.remote_addr = host_of(info.remote_addr);
        }
    }

    pub fn wrote_request(&mut self, at: Instant) {
        stamp(&mut self.ts.server_start, at);

        if self.ts.conn_reused {
            // A pooled connection skips lookup, dial and handshake entirely.
            // Assigned outright: a racing dial that reported after the pool
            // handed the connection over must not leave a phase behind.
            let anchor = self.ts.conn_acquired.unwrap_or(at);
            for slot in [
                &mut self.ts.dns_start,
                &mut self.ts.dns_done,
                &mut self.ts.tcp_start,
                &mut self.ts.tcp_done,
                &mut self.ts.tls_start,
                &mut self.ts.tls_done,
            ] {
                *slot = Some(anchor);
            }
        } else if self.ts.dns_start.is_none() && self.ts.tcp_start.is_none() {
            // The transport dialed without reporting any of it.
            for slot in [
                &mut self.ts.dns_start,
                &mut self.ts.dns_done,
                &mut self.ts.tcp_start,
                &mut self.ts.tcp_done,
            ] {
                stamp(slot, at);
            }
        }
    }

    pub fn got_first_response_byte(&mut self, at: Instant) {
        stamp(&mut self.ts.server_done, at);
        self.ts.transfer_start = self.ts.server_done;
    }
}
