//! XML marshalling for the service's wire format.

pub mod codec;

pub use codec::{CodecError, from_xml, to_xml};
