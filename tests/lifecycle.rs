use httpstat::{Durations, GotConnInfo, HttpStat, TraceEvent};
use std::net::SocketAddr;
use std::time::{Duration, Instant};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Feeds `(event, offset_ms)` pairs relative to `base`.
fn replay(base: Instant, events: &[(TraceEvent, u64)]) -> HttpStat {
    let mut stat = HttpStat::new();
    for (event, offset) in events {
        stat.record_at(*event, base + ms(*offset));
    }
    stat
}

fn assert_checkpoints_ordered(d: &Durations) {
    assert!(d.name_lookup <= d.connect, "{:?}", d);
    assert!(d.connect <= d.pre_transfer, "{:?}", d);
    assert!(d.pre_transfer <= d.start_transfer, "{:?}", d);
    assert!(d.start_transfer <= d.total, "{:?}", d);
}

fn conn_info() -> GotConnInfo {
    let local: SocketAddr = "10.1.2.3:50123".parse().unwrap();
    let remote: SocketAddr = "203.0.113.9:443".parse().unwrap();
    GotConnInfo::new(false, local, remote)
}

#[test]
fn test_full_tls_sequence() {
    let base = Instant::now();
    let mut stat = replay(
        base,
        &[
            (TraceEvent::DnsStart, 0),
            (TraceEvent::DnsDone, 10),
            (TraceEvent::ConnectStart, 11),
            (TraceEvent::ConnectDone, 30),
            (TraceEvent::TlsHandshakeStart, 31),
            (TraceEvent::TlsHandshakeDone, 70),
            (TraceEvent::GotConn(conn_info()), 71),
            (TraceEvent::WroteRequest, 72),
            (TraceEvent::GotFirstResponseByte, 120),
        ],
    );
    stat.end(base + ms(150));
    let d = stat.durations();

    assert_eq!(d.dns_lookup, ms(10));
    assert_eq!(d.tcp_connection, ms(19));
    assert_eq!(d.tls_handshake, ms(39));
    assert_eq!(d.server_processing, ms(48));
    assert_eq!(d.content_transfer, ms(30));

    assert_eq!(d.name_lookup, ms(10));
    assert_eq!(d.connect, ms(30));
    assert_eq!(d.pre_transfer, ms(70));
    assert_eq!(d.start_transfer, ms(120));
    assert_eq!(d.total, ms(150));
    assert!(d.pre_transfer >= d.connect);
    assert_checkpoints_ordered(&d);

    assert!(stat.is_tls());
    assert!(!stat.is_reused());
    assert_eq!(stat.local_addr(), "10.1.2.3");
    assert_eq!(stat.remote_addr(), "203.0.113.9");
}

#[test]
fn test_reused_connection() {
    let base = Instant::now();
    let mut stat = replay(
        base,
        &[
            (TraceEvent::GotConn(GotConnInfo::reused()), 5),
            (TraceEvent::WroteRequest, 6),
            (TraceEvent::GotFirstResponseByte, 40),
        ],
    );
    stat.end(base + ms(55));
    let d = stat.durations();

    assert!(stat.is_reused());
    assert_eq!(d.dns_lookup, Duration::ZERO);
    assert_eq!(d.tcp_connection, Duration::ZERO);
    assert_eq!(d.tls_handshake, Duration::ZERO);
    assert_eq!(d.start_transfer, ms(35));
    assert!(d.total >= d.start_transfer);
    assert_eq!(d.total, ms(50));
    assert_checkpoints_ordered(&d);
}

#[test]
fn test_reused_connection_ignores_racing_dial_events() {
    let base = Instant::now();
    let mut stat = replay(
        base,
        &[
            (TraceEvent::DnsStart, 0),
            (TraceEvent::DnsDone, 3),
            (TraceEvent::ConnectStart, 3),
            (TraceEvent::GotConn(GotConnInfo::reused()), 4),
            (TraceEvent::ConnectDone, 8),
            (TraceEvent::TlsHandshakeStart, 8),
            (TraceEvent::TlsHandshakeDone, 9),
            (TraceEvent::WroteRequest, 9),
            (TraceEvent::GotFirstResponseByte, 20),
        ],
    );
    stat.end(base + ms(25));
    let d = stat.durations();

    assert!(stat.is_reused());
    assert_eq!(d.dns_lookup, Duration::ZERO);
    assert_eq!(d.tcp_connection, Duration::ZERO);
    assert_eq!(d.tls_handshake, Duration::ZERO);
    assert_eq!(d.connect, Duration::ZERO);
    assert_eq!(d.pre_transfer, Duration::ZERO);
    assert_eq!(d.start_transfer, ms(16));
    assert_eq!(d.total, ms(21));
    assert_checkpoints_ordered(&d);
}

#[test]
fn test_bare_ip_dial() {
    let base = Instant::now();
    let mut stat = replay(
        base,
        &[
            (TraceEvent::ConnectStart, 0),
            (TraceEvent::ConnectDone, 15),
            (TraceEvent::WroteRequest, 16),
            (TraceEvent::GotFirstResponseByte, 40),
        ],
    );
    stat.end(base + ms(41));
    let d = stat.durations();

    assert_eq!(d.dns_lookup, Duration::ZERO);
    assert_eq!(d.connect, d.tcp_connection);
    assert_eq!(d.connect, ms(15));
    assert_checkpoints_ordered(&d);
}

#[test]
fn test_plain_http_without_tls() {
    let base = Instant::now();
    let stat = replay(
        base,
        &[
            (TraceEvent::DnsStart, 0),
            (TraceEvent::DnsDone, 8),
            (TraceEvent::ConnectStart, 8),
            (TraceEvent::ConnectDone, 20),
            (TraceEvent::GotConn(conn_info()), 20),
            (TraceEvent::WroteRequest, 21),
        ],
    );
    let d = stat.durations();

    assert!(!stat.is_tls());
    assert_eq!(d.tls_handshake, Duration::ZERO);
    assert_eq!(d.pre_transfer, d.connect);
    assert_eq!(d.pre_transfer, ms(20));
}

#[test]
fn test_no_dial_events_at_all() {
    let base = Instant::now();
    let mut stat = replay(
        base,
        &[
            (TraceEvent::WroteRequest, 3),
            (TraceEvent::GotFirstResponseByte, 25),
        ],
    );
    stat.end(base + ms(30));
    let d = stat.durations();

    assert_eq!(d.dns_lookup, Duration::ZERO);
    assert_eq!(d.tcp_connection, Duration::ZERO);
    assert_eq!(d.connect, Duration::ZERO);
    assert_eq!(d.start_transfer, ms(22));
    assert_eq!(d.total, ms(27));
    assert_checkpoints_ordered(&d);
}

#[test]
fn test_never_used_object() {
    let mut stat = HttpStat::new();
    stat.end(Instant::now());
    assert_eq!(stat.durations(), Durations::default());
    assert_eq!(stat.total(), Duration::ZERO);
    assert_eq!(stat.content_transfer(), Duration::ZERO);
    assert_eq!(stat.total_at(Instant::now()), Duration::ZERO);
    assert_eq!(stat.content_transfer_at(Instant::now()), Duration::ZERO);
    assert_eq!(stat.local_addr(), "");
    assert_eq!(stat.remote_addr(), "");
}

#[test]
fn test_unfinished_request_reads_zero_total() {
    let base = Instant::now();
    let stat = replay(
        base,
        &[
            (TraceEvent::DnsStart, 0),
            (TraceEvent::DnsDone, 4),
            (TraceEvent::ConnectStart, 4),
            (TraceEvent::ConnectDone, 9),
            (TraceEvent::WroteRequest, 10),
            (TraceEvent::GotFirstResponseByte, 30),
        ],
    );

    assert_eq!(stat.total(), Duration::ZERO);
    assert_eq!(stat.content_transfer(), Duration::ZERO);
    assert_eq!(stat.total_at(base + ms(45)), ms(45));
    assert_eq!(stat.content_transfer_at(base + ms(45)), ms(15));
}

#[test]
fn test_events_after_cancellation_point_stay_zero() {
    let base = Instant::now();
    let stat = replay(
        base,
        &[
            (TraceEvent::DnsStart, 0),
            (TraceEvent::DnsDone, 6),
            (TraceEvent::ConnectStart, 6),
        ],
    );
    let d = stat.durations();

    assert_eq!(d.dns_lookup, ms(6));
    assert_eq!(d.tcp_connection, Duration::ZERO);
    assert_eq!(d.connect, Duration::ZERO);
    assert_eq!(d.pre_transfer, Duration::ZERO);
    assert_eq!(d.start_transfer, Duration::ZERO);
}

#[test]
fn test_repeated_reads_are_identical() {
    let base = Instant::now();
    let mut stat = replay(
        base,
        &[
            (TraceEvent::DnsStart, 0),
            (TraceEvent::DnsDone, 2),
            (TraceEvent::ConnectStart, 2),
            (TraceEvent::ConnectDone, 5),
            (TraceEvent::WroteRequest, 6),
            (TraceEvent::GotFirstResponseByte, 9),
        ],
    );
    stat.end(base + ms(12));
    stat.record(TraceEvent::GotConn(conn_info()));

    let first = stat.durations();
    let second = stat.durations();
    assert_eq!(first, second);
    assert_eq!(stat.start_transfer(), stat.start_transfer());
    assert_eq!(stat.durations(), first);
    assert_eq!(stat.remote_addr(), "203.0.113.9");
}

#[test]
fn test_every_prefix_of_well_formed_sequence_is_consistent() {
    let base = Instant::now();
    let events = [
        (TraceEvent::DnsStart, 0),
        (TraceEvent::DnsDone, 7),
        (TraceEvent::ConnectStart, 8),
        (TraceEvent::ConnectDone, 19),
        (TraceEvent::TlsHandshakeStart, 19),
        (TraceEvent::TlsHandshakeDone, 44),
        (TraceEvent::GotConn(conn_info()), 45),
        (TraceEvent::WroteRequest, 45),
        (TraceEvent::GotFirstResponseByte, 90),
    ];
    for len in 0..=events.len() {
        let mut stat = replay(base, &events[..len]);
        if len == events.len() {
            stat.end(base + ms(100));
        }
        let d = stat.durations();
        if len == events.len() {
            assert_checkpoints_ordered(&d);
        }
        for (name, value) in d.entries() {
            assert!(value <= ms(100), "{} = {:?} after {} events", name, value, len);
        }
    }
}
