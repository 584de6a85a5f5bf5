use crate::ocpp_object;

use super::IdTokenKind;

ocpp_object! {
    /// Additional identifier carried next to an id token.
    pub struct AdditionalInfo: "additional info" {
        mandatory additional_id_token: String = "additionalIdToken",
        mandatory kind: String = "type",
    }
}

ocpp_object! {
    /// Token for identification
    pub struct IdToken: "id token" {
        mandatory id_token: String = "idToken",
        mandatory kind: IdTokenKind = "type",
        optional_set additional_info: AdditionalInfo = "additionalInfo",
    }
}

impl IdToken {
    pub fn new(id_token: impl Into<String>, kind: IdTokenKind) -> Self {
        Self {
            id_token: id_token.into(),
            kind,
            additional_info: Default::default(),
            custom_data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CodecHooks, JsonCodec};
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_id_token_case_insensitive_type() {
        let json = json!({"idToken": "ABC123", "type": "iso14443"});
        let token = IdToken::from_json(&json, &CodecHooks::none()).unwrap();
        assert_eq!(token, IdToken::new("ABC123", IdTokenKind::Iso14443));
        assert_eq!(
            token.to_json(&CodecHooks::none()),
            json!({"idToken": "ABC123", "type": "ISO14443"})
        );
    }

    #[test]
    fn test_id_token_unknown_type() {
        let json = json!({"idToken": "ABC123", "type": "Bogus"});
        let err = IdToken::from_json(&json, &CodecHooks::none()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownEnumValue);
        assert!(err.to_string().contains("'type'"));
    }

    #[test]
    fn test_additional_info_set() {
        let doc = json!({
            "idToken": "ABC123",
            "type": "Central",
            "additionalInfo": [
                {"additionalIdToken": "B", "type": "x"},
                {"additionalIdToken": "A", "type": "x"}
            ]
        });
        let token = IdToken::from_json(&doc, &CodecHooks::none()).unwrap();
        assert_eq!(token.additional_info.len(), 2);
    }
}
