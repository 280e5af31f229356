//! Value objects exchanged with the remittance service, and the ports the
//! application layer drives (transport and payload cipher).

pub mod failure;
pub mod money;
pub mod ports;
pub mod quote;
pub mod remittance;
