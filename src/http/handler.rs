use crate::cli::app_config::Cli;
use crate::client_trace::{ClientTrace, GotConnInfo};
use crate::http::dialer::dial;
use crate::http::trace_stream::TraceStream;
use crate::timing::{HttpStat, SharedStat};
use crate::tls::config::{build_tls_config, handshake};
use anyhow::Context;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::header::{HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE, HOST, USER_AGENT};
use http::response::Parts;
use http_body_util::{BodyExt, Full};
use hyper::client::conn::http1;
use hyper::{Request, Uri};
use hyper_util::rt::TokioIo;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::timeout;
use tracing::Instrument;

/// A fully drained response together with its finalized latency breakdown.
pub struct TracedResponse {
    pub started_at: DateTime<Utc>,
    pub parts: Parts,
    pub body: Bytes,
    pub stat: HttpStat,
}

/// Issues one request over a fresh connection, firing every lifecycle hook
/// into a new [`SharedStat`], and finalizes it once the body is read.
pub async fn traced_request(cli: &Cli) -> Result<TracedResponse, anyhow::Error> {
    let uri: Uri = cli.url.parse().context("Failed to parse url")?;
    let scheme = uri.scheme_str().unwrap_or("http").to_string();
    ensure!(
        scheme == "http" || scheme == "https",
        "Can not handle scheme {} in the uri:{}.",
        scheme,
        uri
    );
    let host = uri
        .host()
        .ok_or(anyhow!("Can not find host in the uri:{}.", uri))?
        .to_string();
    let port = uri
        .port_u16()
        .unwrap_or(if scheme == "https" { 443 } else { 80 });

    let request = build_request(cli, &uri)?;
    let tls_config = if scheme == "https" {
        Some(build_tls_config(cli)?)
    } else {
        None
    };

    let started_at = Utc::now();
    let stat = SharedStat::new();
    let trace: Arc<dyn ClientTrace> = Arc::new(stat.clone());
    let fut = async {
        let stream = dial(&host, port, trace.as_ref()).await?;
        let info = GotConnInfo::new(false, stream.local_addr()?, stream.peer_addr()?);
        match tls_config {
            Some(config) => {
                trace.tls_handshake_start();
                let tls_stream = handshake(config, &host, stream).await;
                trace.tls_handshake_done();
                trace.got_conn(info);
                exchange(TraceStream::new(tls_stream?, trace.clone()), request).await
            }
            None => {
                trace.got_conn(info);
                exchange(TraceStream::new(stream, trace.clone()), request).await
            }
        }
    };
    let (parts, body) = timeout(Duration::from_secs(cli.timeout), fut)
        .await
        .context(format!("Request timed out after {} seconds", cli.timeout))?
        .context("Failed to execute request")?;
    stat.end(Instant::now());

    Ok(TracedResponse {
        started_at,
        parts,
        body,
        stat: stat.snapshot(),
    })
}

fn build_request(cli: &Cli, uri: &Uri) -> Result<Request<Full<Bytes>>, anyhow::Error> {
    let mut method = String::from("GET");
    let mut body_bytes = Bytes::new();
    if let Some(body) = cli.body_option.as_ref() {
        method = String::from("POST");
        body_bytes = Bytes::from(body.clone());
    }
    if let Some(method_userdefined) = cli.method_option.as_ref() {
        method = method_userdefined.clone();
    }

    let authority = uri
        .authority()
        .ok_or(anyhow!("Can not find host in the uri:{}.", uri))?;
    let path = uri
        .path_and_query()
        .map(|p| p.as_str())
        .filter(|p| p.starts_with('/'))
        .unwrap_or("/");

    let mut request = Request::builder()
        .method(method.as_str())
        .uri(path)
        .body(Full::new(body_bytes))?;

    let headers = request.headers_mut();
    headers.insert(HOST, HeaderValue::from_str(authority.as_str())?);
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    let user_agent = cli
        .user_agent_option
        .as_deref()
        .unwrap_or(concat!("httpstat/", env!("CARGO_PKG_VERSION")));
    headers.insert(USER_AGENT, HeaderValue::from_str(user_agent)?);
    if cli.body_option.is_some() {
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
    }
    for x in &cli.headers {
        let split: Vec<&str> = x.splitn(2, ':').collect();
        if split.len() == 2 {
            headers.insert(
                HeaderName::from_str(split[0].trim())?,
                HeaderValue::from_str(split[1].trim_start())?,
            );
        } else {
            return Err(anyhow!("header error: '{}'", x));
        }
    }

    if cli.verbosity >= 1 {
        debug!("> {} {} {:?}", request.method(), path, request.version());
        for (key, value) in request.headers().iter() {
            debug!("> {}: {}", key, value.to_str()?);
        }
        debug!(">");
    }
    Ok(request)
}

async fn exchange<S>(
    io: TraceStream<S>,
    request: Request<Full<Bytes>>,
) -> Result<(Parts, Bytes), anyhow::Error>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (mut sender, conn) = http1::handshake(TokioIo::new(io)).await?;
    tokio::spawn(
        async move {
            if let Err(err) = conn.await {
                debug!("Connection failed: {:?}", err);
            }
        }
        .instrument(info_span!("connection")),
    );

    let response = sender.send_request(request).await?;
    let (parts, incoming) = response.into_parts();
    let body = incoming.collect().await?.to_bytes();
    Ok((parts, body))
}
