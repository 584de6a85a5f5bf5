//! SOAP 1.2 envelope for OCPP 1.5
//!
//! ```text
//! <SOAP:Envelope xmlns:SOAP=".." xmlns:CS=".." xmlns:CP="..">
//!   <SOAP:Header> headers.. </SOAP:Header>
//!   <SOAP:Body> body </SOAP:Body>
//! </SOAP:Envelope>
//! ```
//!
//! Only structure is assembled; header and body content are not validated.

use thiserror::Error;

use crate::xml::XElement;

/// SOAP 1.2 envelope namespace
pub const SOAP_NS: &str = "http://www.w3.org/2003/05/soap-envelope";
/// OCPP 1.5 central system namespace
pub const CS_NS: &str = "urn://Ocpp/Cs/2012/06/";
/// OCPP 1.5 charge point namespace
pub const CP_NS: &str = "urn://Ocpp/Cp/2012/06/";

pub const ENVELOPE: &str = "SOAP:Envelope";
pub const HEADER: &str = "SOAP:Header";
pub const BODY: &str = "SOAP:Body";

/// Errors in building or reading an envelope
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SoapError {
    #[error("SOAP body element is required")]
    MissingBody,

    #[error("expected SOAP:Envelope, found <{0}>")]
    NotAnEnvelope(String),
}

/// Wrap `body` and `headers` in a SOAP envelope.
///
/// `namespace_hook` may rewrite the finished envelope, typically its
/// namespace declarations; without one the envelope is returned as built.
pub fn encapsulate(
    headers: impl IntoIterator<Item = XElement>,
    body: Option<XElement>,
    namespace_hook: Option<&dyn Fn(XElement) -> XElement>,
) -> Result<XElement, SoapError> {
    let body = body.ok_or(SoapError::MissingBody)?;

    let envelope = XElement::new(ENVELOPE)
        .with_attr("xmlns:SOAP", SOAP_NS)
        .with_attr("xmlns:CS", CS_NS)
        .with_attr("xmlns:CP", CP_NS)
        .with_child(XElement::new(HEADER).with_children(headers))
        .with_child(XElement::new(BODY).with_child(body));

    Ok(match namespace_hook {
        Some(hook) => hook(envelope),
        None => envelope,
    })
}

/// First element inside `SOAP:Body`.
pub fn body_of(envelope: &XElement) -> Result<&XElement, SoapError> {
    if envelope.name() != ENVELOPE {
        return Err(SoapError::NotAnEnvelope(envelope.name().to_string()));
    }
    envelope
        .element(BODY)
        .and_then(|body| body.elements().next())
        .ok_or(SoapError::MissingBody)
}

/// Elements inside `SOAP:Header`.
pub fn headers_of(envelope: &XElement) -> impl Iterator<Item = &XElement> {
    envelope.element(HEADER).into_iter().flat_map(XElement::elements)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heartbeat() -> XElement {
        XElement::new("CS:heartbeatRequest")
    }

    #[test]
    fn test_envelope_structure() {
        let headers = vec![XElement::new("CS:chargeBoxIdentity").with_text("CP01")];
        let envelope = encapsulate(headers, Some(heartbeat()), None).unwrap();

        assert_eq!(envelope.name(), "SOAP:Envelope");
        assert_eq!(envelope.attr("xmlns:SOAP"), Some(SOAP_NS));
        assert_eq!(envelope.attr("xmlns:CS"), Some(CS_NS));
        assert_eq!(envelope.attr("xmlns:CP"), Some(CP_NS));

        let names: Vec<&str> = envelope.elements().map(XElement::name).collect();
        assert_eq!(names, vec!["SOAP:Header", "SOAP:Body"]);

        let header: Vec<String> = headers_of(&envelope).map(XElement::text).collect();
        assert_eq!(header, vec!["CP01".to_string()]);
        assert_eq!(body_of(&envelope).unwrap(), &heartbeat());
    }

    #[test]
    fn test_missing_body() {
        assert_eq!(
            encapsulate(Vec::new(), None, None).unwrap_err(),
            SoapError::MissingBody
        );
    }

    #[test]
    fn test_namespace_hook() {
        let hook = |mut envelope: XElement| {
            envelope.remove_attr("xmlns:CP");
            envelope.set_attr("xmlns:wsa", "http://www.w3.org/2005/08/addressing");
            envelope
        };

        let envelope = encapsulate(Vec::new(), Some(heartbeat()), Some(&hook)).unwrap();
        assert_eq!(envelope.attr("xmlns:CP"), None);
        assert!(envelope.attr("xmlns:wsa").is_some());
    }

    #[test]
    fn test_rendered_text() {
        let envelope = encapsulate(Vec::new(), Some(heartbeat()), None).unwrap();
        let text = envelope.to_xml_string();
        assert!(text
            .starts_with("<SOAP:Envelope xmlns:SOAP=\"http://www.w3.org/2003/05/soap-envelope\""));
        assert!(text.contains("<SOAP:Header/><SOAP:Body><CS:heartbeatRequest/></SOAP:Body>"));
    }

    #[test]
    fn test_body_of_wrong_root() {
        assert!(matches!(
            body_of(&heartbeat()),
            Err(SoapError::NotAnEnvelope(_))
        ));
    }
}
