use crate::client_trace::ClientTrace;
use std::io;
use std::net::{IpAddr, SocketAddr};
use tokio::net::TcpStream;

/// Resolves `host` unless it already is an IP literal.
///
/// Fires `dns_start`/`dns_done` only when a lookup actually runs.
pub async fn resolve(
    host: &str,
    port: u16,
    trace: &dyn ClientTrace,
) -> Result<Vec<SocketAddr>, anyhow::Error> {
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = bare.parse::<IpAddr>() {
        debug!("{} is an IP literal, skipping DNS", bare);
        return Ok(vec![SocketAddr::new(ip, port)]);
    }

    debug!("Resolving DNS for: {}", bare);
    trace.dns_start();
    let lookup = tokio::net::lookup_host((bare, port)).await;
    trace.dns_done();

    let addresses: Vec<SocketAddr> = lookup?.collect();
    if addresses.is_empty() {
        error!("DNS resolution for {} returned no addresses.", bare);
        return Err(anyhow!("No IP addresses found for host {}", bare));
    }
    info!("Resolved DNS for {}: {:?}", bare, addresses);

    for (i, addr) in addresses.iter().enumerate() {
        if i == 0 {
            debug!("Resolved IP: {}", addr.ip());
        } else {
            debug!("Resolved IP (alternative): {}", addr.ip());
        }
    }
    Ok(addresses)
}

/// Connects to the first reachable address, one `connect_start`/`connect_done`
/// pair per attempt.
pub async fn connect(
    addresses: &[SocketAddr],
    trace: &dyn ClientTrace,
) -> Result<TcpStream, anyhow::Error> {
    let mut last_error: Option<io::Error> = None;
    for addr in addresses {
        trace.connect_start();
        let attempt = TcpStream::connect(addr).await;
        trace.connect_done();
        match attempt {
            Ok(stream) => {
                debug!("Connected to {}", addr);
                return Ok(stream);
            }
            Err(e) => {
                debug!("Connect to {} failed: {}", addr, e);
                last_error = Some(e);
            }
        }
    }
    match last_error {
        Some(e) => Err(anyhow::Error::new(e).context("Failed to connect to any resolved address")),
        None => Err(anyhow!("No address to connect to")),
    }
}

pub async fn dial(
    host: &str,
    port: u16,
    trace: &dyn ClientTrace,
) -> Result<TcpStream, anyhow::Error> {
    let addresses = resolve(host, port, trace).await?;
    connect(&addresses, trace).await
}
