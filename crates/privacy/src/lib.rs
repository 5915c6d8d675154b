//! # Veilroute Privacy
//!
//! PII masking and unmasking. The masker replaces emails, phone numbers,
//! and person names with stable pseudonymous tokens before any text reaches
//! the classifier, and the resulting mapping restores the real values into
//! the handler-bound prompt afterwards.
//!
//! The mapping is **request-scoped**: created at mask time, consumed at
//! unmask time, dropped with the request. It is never persisted and never
//! shared across requests — that is the invariant that keeps PII out of
//! everything the classifier touches.

pub mod masker;
pub mod token;

pub use masker::{Masked, MaskerConfig, PiiMasker};
pub use token::{PiiCategory, PiiMapping, PiiToken};
