//! Application layer: the quote and payment services and the error normalizer.
//!
//! `QuotesApi` and `RemittanceApi` are independent. A quote-bound payment is
//! composed by the caller, who carries the proposal id from one call to the
//! next; neither service calls the other. Both hold only read-only handles
//! (transport, cipher), so a single instance can be shared across tasks.

mod exchange;
pub mod normalizer;
pub mod quotes;
pub mod remittance;

pub use quotes::QuotesApi;
pub use remittance::RemittanceApi;
