use crate::client_trace::ClientTrace;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// Connection wrapper that reports when the request left and the response
/// started arriving.
///
/// `wrote_request` fires on the first successful flush after bytes were
/// written, or at the latest together with the first response byte.
pub struct TraceStream<S> {
    inner: S,
    trace: Arc<dyn ClientTrace>,
    wrote_bytes: bool,
    request_written: bool,
    first_byte_seen: bool,
}

impl<S> TraceStream<S> {
    pub fn new(inner: S, trace: Arc<dyn ClientTrace>) -> Self {
        Self {
            inner,
            trace,
            wrote_bytes: false,
            request_written: false,
            first_byte_seen: false,
        }
    }

    fn mark_request_written(&mut self) {
        if !self.request_written {
            self.request_written = true;
            self.trace.wrote_request();
        }
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for TraceStream<S> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let before = buf.filled().len();
        let poll = Pin::new(&mut this.inner).poll_read(cx, buf);
        if let Poll::Ready(Ok(())) = poll {
            if !this.first_byte_seen && buf.filled().len() > before {
                this.mark_request_written();
                this.first_byte_seen = true;
                this.trace.got_first_response_byte();
            }
        }
        poll
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for TraceStream<S> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        let poll = Pin::new(&mut this.inner).poll_write(cx, buf);
        if let Poll::Ready(Ok(n)) = poll {
            this.wrote_bytes |= n > 0;
        }
        poll
    }

    fn poll_write_vectored(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        bufs: &[io::IoSlice<'_>],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        let poll = Pin::new(&mut this.inner).poll_write_vectored(cx, bufs);
        if let Poll::Ready(Ok(n)) = poll {
            this.wrote_bytes |= n > 0;
        }
        poll
    }

    fn is_write_vectored(&self) -> bool {
        self.inner.is_write_vectored()
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let poll = Pin::new(&mut this.inner).poll_flush(cx);
        if let Poll::Ready(Ok(())) = poll {
            if this.wrote_bytes {
                this.mark_request_written();
            }
        }
        poll
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}
