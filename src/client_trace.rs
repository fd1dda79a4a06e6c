use std::fmt;
use std::net::SocketAddr;

/// Lifecycle hooks a transport fires while executing one request.
///
/// Every hook defaults to a no-op so a transport that only knows about a
/// subset of the lifecycle can still drive an implementation. Hooks take
/// `&self` because transports fire them from whichever task happens to be
/// polling the connection.
pub trait ClientTrace: Send + Sync {
    fn dns_start(&self) {}

    fn dns_done(&self) {}

    fn connect_start(&self) {}

    fn connect_done(&self) {}

    fn tls_handshake_start(&self) {}

    fn tls_handshake_done(&self) {}

    /// A connection was obtained, either freshly dialed or taken from a pool.
    fn got_conn(&self, _info: GotConnInfo) {}

    fn wrote_request(&self) {}

    fn got_first_response_byte(&self) {}
}

/// Details reported when a connection is handed to the request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GotConnInfo {
    /// True when the connection came from a keep-alive pool.
    pub reused: bool,
    pub local_addr: Option<SocketAddr>,
    pub remote_addr: Option<SocketAddr>,
}

impl GotConnInfo {
    pub fn new(reused: bool, local_addr: SocketAddr, remote_addr: SocketAddr) -> Self {
        Self {
            reused,
            local_addr: Some(local_addr),
            remote_addr: Some(remote_addr),
        }
    }

    pub fn reused() -> Self {
        Self {
            reused: true,
            ..Self::default()
        }
    }
}

/// One lifecycle event, as fed to the recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent {
    DnsStart,
    DnsDone,
    ConnectStart,
    ConnectDone,
    TlsHandshakeStart,
    TlsHandshakeDone,
    GotConn(GotConnInfo),
    WroteRequest,
    GotFirstResponseByte,
}

impl TraceEvent {
    /// Canonical hook name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            TraceEvent::DnsStart => "DNSStart",
            TraceEvent::DnsDone => "DNSDone",
            TraceEvent::ConnectStart => "ConnectStart",
            TraceEvent::ConnectDone => "ConnectDone",
            TraceEvent::TlsHandshakeStart => "TLSHandshakeStart",
            TraceEvent::TlsHandshakeDone => "TLSHandshakeDone",
            TraceEvent::GotConn(_) => "GotConn",
            TraceEvent::WroteRequest => "WroteRequest",
            TraceEvent::GotFirstResponseByte => "GotFirstResponseByte",
        }
    }
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
