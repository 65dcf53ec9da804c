//! SOAP envelope codec.
//!
//! Requests are written with every element in the `hps:` namespace. Responses
//! are read into a [`ResponseTree`] rooted at the children of `Ver1.0`.

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use secrecy::ExposeSecret;

use gateway_types::{Element, ResponseTree};

use crate::ClientError;
use crate::config::{Credentials, GatewayConfig};

pub const GATEWAY_NAMESPACE: &str = "http://Hps.Exchange.PosGateway";
const SOAP_NAMESPACE: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// The `Header` block carrying the merchant's credentials.
pub fn header(config: &GatewayConfig) -> Element {
    let header = match &config.credentials {
        Credentials::SecretApiKey(key) => {
            Element::new("Header").text_child("SecretAPIKey", key.expose_secret())
        }
        Credentials::Site {
            site_id,
            license_id,
            device_id,
            username,
            password,
        } => Element::new("Header")
            .text_child("SiteId", site_id.to_string())
            .text_child("LicenseId", license_id.to_string())
            .text_child("DeviceId", device_id.to_string())
            .text_child("UserName", username)
            .text_child("Password", password.expose_secret()),
    };

    header
        .text_child_opt("DeveloperID", config.developer_id.as_deref())
        .text_child_opt("VersionNbr", config.version_number.as_deref())
}

/// Wraps a `Transaction` document in a complete SOAP request.
pub fn envelope(config: &GatewayConfig, transaction: &Element) -> Result<String, ClientError> {
    let mut writer = Writer::new(Vec::new());

    write(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)),
    )?;
    let mut root = BytesStart::new("soap:Envelope");
    root.push_attribute(("xmlns:soap", SOAP_NAMESPACE));
    write(&mut writer, Event::Start(root))?;
    write(&mut writer, Event::Start(BytesStart::new("soap:Body")))?;
    let mut request = BytesStart::new("hps:PosRequest");
    request.push_attribute(("xmlns:hps", GATEWAY_NAMESPACE));
    write(&mut writer, Event::Start(request))?;
    write(&mut writer, Event::Start(BytesStart::new("hps:Ver1.0")))?;

    write_element(&mut writer, &header(config))?;
    write_element(&mut writer, transaction)?;

    write(&mut writer, Event::End(BytesEnd::new("hps:Ver1.0")))?;
    write(&mut writer, Event::End(BytesEnd::new("hps:PosRequest")))?;
    write(&mut writer, Event::End(BytesEnd::new("soap:Body")))?;
    write(&mut writer, Event::End(BytesEnd::new("soap:Envelope")))?;

    String::from_utf8(writer.into_inner()).map_err(|e| ClientError::Xml(e.to_string()))
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), ClientError> {
    writer
        .write_event(event)
        .map_err(|e| ClientError::Xml(e.to_string()))
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), ClientError> {
    let name = format!("hps:{}", element.name());
    let mut start = BytesStart::new(name.as_str());
    for (key, value) in element.attributes() {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children().is_empty() && element.text().is_none() {
        return write(writer, Event::Empty(start));
    }

    write(writer, Event::Start(start))?;
    if let Some(text) = element.text() {
        write(writer, Event::Text(BytesText::new(text)))?;
    }
    for child in element.children() {
        write_element(writer, child)?;
    }
    write(writer, Event::End(BytesEnd::new(name.as_str())))
}

struct Frame {
    name: String,
    node: ResponseTree,
    text: String,
    has_children: bool,
}

impl Frame {
    fn new(name: String) -> Self {
        Self {
            name,
            node: ResponseTree::default(),
            text: String::new(),
            has_children: false,
        }
    }

    fn finish(self) -> (String, ResponseTree) {
        let value = if self.has_children {
            self.node
        } else {
            ResponseTree::Text(self.text)
        };
        (self.name, value)
    }
}

/// Parses a SOAP response into the tree under `Envelope/Body/PosResponse/Ver1.0`.
///
/// A SOAP fault is returned as [`ClientError::Fault`] with its fault string.
pub fn parse_response(xml: &str) -> Result<ResponseTree, ClientError> {
    let envelope = parse_document(xml)?;
    let body = envelope
        .get("Body")
        .ok_or_else(|| ClientError::Xml("response has no SOAP body".into()))?;

    if let Some(fault) = body.get("Fault") {
        let reason = fault
            .text("faultstring")
            .or_else(|| fault.path(&["Reason", "Text"]).and_then(ResponseTree::as_text))
            .unwrap_or("unspecified fault");
        return Err(ClientError::Fault(reason.to_string()));
    }

    body.path(&["PosResponse", "Ver1.0"])
        .cloned()
        .ok_or_else(|| ClientError::Xml("response has no PosResponse/Ver1.0 element".into()))
}

/// Reads any XML document into a tree keyed by local element names.
/// Leaves become text and repeated siblings become lists.
fn parse_document(xml: &str) -> Result<ResponseTree, ClientError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ClientError::Xml(format!("at {}: {e}", reader.buffer_position())))?;

        match event {
            Event::Start(start) => {
                stack.push(Frame::new(local_name(&start)?));
            }
            Event::Empty(start) => {
                let name = local_name(&start)?;
                match stack.last_mut() {
                    Some(parent) => {
                        parent.has_children = true;
                        parent.node.insert(name, ResponseTree::Text(String::new()));
                    }
                    None => root = Some(ResponseTree::default()),
                }
            }
            Event::Text(text) => {
                if let Some(frame) = stack.last_mut() {
                    let value = text.unescape().map_err(|e| ClientError::Xml(e.to_string()))?;
                    frame.text.push_str(&value);
                }
            }
            Event::CData(data) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::End(_) => {
                let Some(frame) = stack.pop() else {
                    return Err(ClientError::Xml("unbalanced end tag".into()));
                };
                let (name, value) = frame.finish();
                match stack.last_mut() {
                    Some(parent) => {
                        parent.has_children = true;
                        parent.node.insert(name, value);
                    }
                    None => root = Some(value),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    root.ok_or_else(|| ClientError::Xml("empty response document".into()))
}

fn local_name(start: &BytesStart<'_>) -> Result<String, ClientError> {
    std::str::from_utf8(start.local_name().as_ref())
        .map(str::to_string)
        .map_err(|e| ClientError::Xml(e.to_string()))
}
