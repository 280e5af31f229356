use crate::domain::ports::{CipherError, PayloadCipher};
use crate::error::ConfigurationError;
use crate::interfaces::xml::{from_xml, to_xml};
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const ENVELOPE_ROOT: &str = "encrypted_payload";

/// Identity strategy used when payload encryption is off.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainPayload;

impl PayloadCipher for PlainPayload {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
        Ok(plaintext.to_vec())
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CipherError> {
        Ok(ciphertext.to_vec())
    }

    fn is_active(&self) -> bool {
        false
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    data: String,
}

/// AES-256-GCM payload encryption.
///
/// Each message gets a fresh random nonce. The wire form is an XML envelope
/// whose `data` element holds `base64(nonce || ciphertext)`.
#[derive(Clone)]
pub struct AesGcmCipher {
    cipher: Aes256Gcm,
}

impl AesGcmCipher {
    pub fn new(key: &[u8]) -> Result<Self, ConfigurationError> {
        if key.len() != KEY_LEN {
            return Err(ConfigurationError::InvalidKey(format!(
                "expected {KEY_LEN} bytes, got {}",
                key.len()
            )));
        }
        let cipher = Aes256Gcm::new_from_slice(key)
            .map_err(|e| ConfigurationError::InvalidKey(e.to_string()))?;
        Ok(Self { cipher })
    }

    /// Builds the cipher from a base64-encoded key, as stored in configuration.
    pub fn from_base64(encoded: &str) -> Result<Self, ConfigurationError> {
        let key = BASE64
            .decode(encoded.trim())
            .map_err(|e| ConfigurationError::InvalidKey(format!("invalid base64: {e}")))?;
        Self::new(&key)
    }
}

impl fmt::Debug for AesGcmCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesGcmCipher").finish_non_exhaustive()
    }
}

impl PayloadCipher for AesGcmCipher {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
        let nonce_bytes: [u8; NONCE_LEN] = rand::random();
        let sealed = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
            .map_err(|e| CipherError::Encrypt(e.to_string()))?;

        let mut framed = Vec::with_capacity(NONCE_LEN + sealed.len());
        framed.extend_from_slice(&nonce_bytes);
        framed.extend_from_slice(&sealed);

        let envelope = Envelope {
            data: BASE64.encode(framed),
        };
        to_xml(ENVELOPE_ROOT, &envelope).map_err(|e| CipherError::Encrypt(e.to_string()))
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CipherError> {
        let envelope: Envelope =
            from_xml(ciphertext).map_err(|e| CipherError::Decrypt(format!("bad envelope: {e}")))?;
        let framed = BASE64
            .decode(envelope.data.trim())
            .map_err(|e| CipherError::Decrypt(format!("invalid base64: {e}")))?;

        if framed.len() < NONCE_LEN {
            return Err(CipherError::Decrypt("payload shorter than nonce".to_string()));
        }
        let (nonce, sealed) = framed.split_at(NONCE_LEN);

        self.cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|e| CipherError::Decrypt(e.to_string()))
    }
}
