//! Cryptographic signature records.
//!
//! The codec only parses and re-serializes signatures. Checking them is left
//! to a [`SignatureVerifier`] supplied by the caller.

use crate::ocpp_object;

ocpp_object! {
    /// One signature over the canonical serialization of a message.
    pub struct Signature: "signature" {
        /// Reference to the signing key (e.g. a certificate fingerprint).
        mandatory key_id: String = "keyId",
        /// Signature bytes, encoded as text.
        mandatory value: String = "value",
        optional signing_method: String = "signingMethod",
        optional encoding_method: String = "encodingMethod",
    }
}

impl Signature {
    pub fn new(key_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            value: value.into(),
            signing_method: None,
            encoding_method: None,
            custom_data: None,
        }
    }

    pub fn with_signing_method(mut self, method: impl Into<String>) -> Self {
        self.signing_method = Some(method.into());
        self
    }
}

/// Checks a signature against the bytes it claims to cover.
pub trait SignatureVerifier {
    /// `Err` carries a human-readable reason.
    fn verify(&self, signature: &Signature, signed: &[u8]) -> Result<(), String>;
}

impl<F> SignatureVerifier for F
where
    F: Fn(&Signature, &[u8]) -> Result<(), String>,
{
    fn verify(&self, signature: &Signature, signed: &[u8]) -> Result<(), String> {
        self(signature, signed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CodecHooks, JsonCodec};
    use serde_json::json;

    #[test]
    fn test_signature_json() {
        let hooks = CodecHooks::none();
        let sig = Signature::new("key-1", "c2lnbmF0dXJl").with_signing_method("secp256r1");

        let doc = sig.to_json(&hooks);
        assert_eq!(
            doc,
            json!({"keyId": "key-1", "value": "c2lnbmF0dXJl", "signingMethod": "secp256r1"})
        );
        assert_eq!(Signature::from_json(&doc, &hooks).unwrap(), sig);
    }

    #[test]
    fn test_closure_verifier() {
        let verifier = |sig: &Signature, _: &[u8]| {
            if sig.value == "ok" {
                Ok(())
            } else {
                Err("mismatch".to_string())
            }
        };
        assert!(verifier.verify(&Signature::new("k", "ok"), b"").is_ok());
        assert!(verifier.verify(&Signature::new("k", "no"), b"").is_err());
    }
}
