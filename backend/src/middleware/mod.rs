//! Request middleware.
//!
//! Purpose: attach a request-scoped trace identifier that error payloads and
//! logs share.

pub mod trace;

pub use trace::Trace;
