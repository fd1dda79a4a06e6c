pub mod dialer;
pub mod handler;
pub mod trace_stream;
