use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub const QUOTE_REQUEST_ROOT: &str = "quoterequest";
pub const QUOTE_RESPONSE_ROOT: &str = "quote";
pub const PAYMENT_REQUEST_ROOT: &str = "paymentrequest";
pub const PAYMENT_RESPONSE_ROOT: &str = "payment";
pub const ERRORS_ROOT: &str = "errors";

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("body is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::DeError),
}

/// Serializes a wire model under the given root element.
pub fn to_xml<T: Serialize>(root: &str, value: &T) -> Result<Vec<u8>, CodecError> {
    let xml = quick_xml::se::to_string_with_root(root, value)?;
    Ok(xml.into_bytes())
}

/// Deserializes a wire model; the root element name is not checked.
pub fn from_xml<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    let text = std::str::from_utf8(bytes)?;
    Ok(quick_xml::de::from_str(text)?)
}
