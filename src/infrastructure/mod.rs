//! Adapters for the domain ports: HTTP and in-process transports, payload ciphers.

pub mod cipher;
pub mod http;
pub mod sandbox;
