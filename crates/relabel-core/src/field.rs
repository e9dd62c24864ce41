//! Field-definition documents.
//!
//! A field-definition document is a small XML file describing one schema
//! field of a metadata-driven platform:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <CustomField x-gs-devobject="true" xmlns="http://soap.sforce.com/2006/04/metadata">
//!     <fullName>Invoice__c</fullName>
//!     <externalId>false</externalId>
//!     <label>Invoice</label>
//!     <type>AutoNumber</type>
//! </CustomField>
//! ```
//!
//! [`FieldDefinition::parse`] reads a document into a typed record and
//! [`FieldDefinition::to_xml`] writes it back with tab indentation and the
//! standard declaration line. Child elements the record does not model are
//! carried through verbatim so a rewrite never drops content.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use thiserror::Error;

/// Declaration line prepended to every serialized document.
pub const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// The only field type whose label may be randomized.
pub const AUTO_NUMBER: &str = "AutoNumber";

const OVERLAY_ATTR: &str = "x-gs-overlay";
const TEST_MARKER: &str = "x-gs-devobject";
const XMLNS_ATTR: &str = "xmlns";

const FULL_NAME: &str = "fullName";
const EXTERNAL_ID: &str = "externalId";
const LABEL: &str = "label";
const TYPE: &str = "type";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced while reading or writing a field-definition document.
#[derive(Debug, Error)]
pub enum FieldError {
    /// The input is not well-formed XML (or not UTF-8).
    #[error("malformed XML: {0}")]
    Malformed(String),

    /// The input is well-formed but is not shaped like a field definition.
    #[error("not a field definition: {0}")]
    Shape(String),

    /// Writing the document failed.
    #[error("failed to serialize field definition: {0}")]
    Serialize(String),
}

impl FieldError {
    /// Returns `true` for syntax-level failures, as opposed to documents that
    /// are simply some other kind of record.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }
}

/// A specialized `Result` type for field-definition operations.
pub type Result<T> = std::result::Result<T, FieldError>;

fn malformed(err: impl std::fmt::Display) -> FieldError {
    FieldError::Malformed(err.to_string())
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// A child element of the root that [`FieldDefinition`] does not model.
///
/// Stored as the owned event sequence of the element (start tag through
/// end tag, or a single empty tag) so it can be written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraElement {
    /// Element name, e.g. `displayFormat`.
    pub name: String,
    events: Vec<Event<'static>>,
}

impl ExtraElement {
    /// The concatenated character data of this element, if any.
    pub fn text(&self) -> String {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Text(text) => text.unescape().ok().map(|t| t.into_owned()),
                _ => None,
            })
            .collect()
    }
}

/// One parsed field-definition document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    /// Name of the root element, reused on output.
    pub root: String,
    /// Fully-qualified field name (`fullName`).
    pub full_name: String,
    /// Whether the field is an external identifier (`externalId`).
    pub external_id: bool,
    /// Display label (`label`).
    pub label: String,
    /// Field-type tag (`type`), e.g. `AutoNumber` or `Text`.
    pub field_type: String,
    /// Optional overlay identifier (`x-gs-overlay` root attribute).
    pub overlay_id: Option<String>,
    /// Test-object marker (`x-gs-devobject`); absent means `false`.
    pub test_object: bool,
    /// Comments found directly under the root, concatenated verbatim.
    pub comment: String,
    /// Namespace URI (`xmlns` root attribute). Always present.
    pub xmlns: String,
    /// Other root attributes, in document order.
    pub attributes: Vec<(String, String)>,
    /// Unmodeled child elements, in document order.
    pub extra: Vec<ExtraElement>,
}

impl FieldDefinition {
    /// Returns `true` if the field type is exactly [`AUTO_NUMBER`].
    pub fn is_auto_number(&self) -> bool {
        self.field_type == AUTO_NUMBER
    }

    /// Look up an unmodeled child element by name.
    pub fn extra_element(&self, name: &str) -> Option<&ExtraElement> {
        self.extra.iter().find(|e| e.name == name)
    }

    // -----------------------------------------------------------------------
    // Parsing
    // -----------------------------------------------------------------------

    /// Parse a field-definition document.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::Malformed`] if the input is not well-formed XML,
    /// or [`FieldError::Shape`] if it has no root element, no namespace, or a
    /// modeled element that does not hold the expected value.
    pub fn parse(input: &str) -> Result<Self> {
        let mut reader = Reader::from_str(input);
        reader.config_mut().trim_text(true);

        let mut doc = loop {
            match reader.read_event().map_err(malformed)? {
                Event::Start(start) => break Self::from_root(&start)?,
                Event::Empty(start) => return Self::from_root(&start),
                Event::Eof => {
                    return Err(FieldError::Shape("document has no root element".into()));
                }
                _ => {}
            }
        };

        loop {
            match reader.read_event().map_err(malformed)? {
                Event::Start(child) => {
                    let name = element_name(&child)?;
                    match name.as_str() {
                        FULL_NAME => doc.full_name = read_text(&mut reader, &name)?,
                        EXTERNAL_ID => {
                            doc.external_id = parse_bool(&name, &read_text(&mut reader, &name)?)?;
                        }
                        LABEL => doc.label = read_text(&mut reader, &name)?,
                        TYPE => doc.field_type = read_text(&mut reader, &name)?,
                        TEST_MARKER => {
                            doc.test_object = parse_bool(&name, &read_text(&mut reader, &name)?)?;
                        }
                        _ => doc.extra.push(read_extra(&mut reader, name, child.into_owned())?),
                    }
                }
                Event::Empty(child) => {
                    let name = element_name(&child)?;
                    match name.as_str() {
                        FULL_NAME => doc.full_name.clear(),
                        EXTERNAL_ID => doc.external_id = false,
                        LABEL => doc.label.clear(),
                        TYPE => doc.field_type.clear(),
                        TEST_MARKER => doc.test_object = false,
                        _ => doc.extra.push(ExtraElement {
                            name,
                            events: vec![Event::Empty(child.into_owned())],
                        }),
                    }
                }
                Event::Comment(text) => {
                    doc.comment
                        .push_str(std::str::from_utf8(&text).map_err(malformed)?);
                }
                Event::End(_) => break,
                Event::Eof => return Err(malformed("unexpected end of document")),
                // Stray character data directly under the root is not modeled.
                _ => {}
            }
        }

        Ok(doc)
    }

    fn from_root(start: &BytesStart<'_>) -> Result<Self> {
        let root = element_name(start)?;
        let mut xmlns = None;
        let mut overlay_id = None;
        let mut test_object = false;
        let mut attributes = Vec::new();

        for attr in start.attributes() {
            let attr = attr.map_err(malformed)?;
            let key = std::str::from_utf8(attr.key.as_ref()).map_err(malformed)?;
            let value = attr.unescape_value().map_err(malformed)?;
            match key {
                XMLNS_ATTR => xmlns = Some(value.into_owned()),
                OVERLAY_ATTR => overlay_id = Some(value.into_owned()).filter(|v| !v.is_empty()),
                TEST_MARKER => test_object = parse_bool(key, &value)?,
                _ => attributes.push((key.to_string(), value.into_owned())),
            }
        }

        let xmlns = xmlns
            .filter(|ns| !ns.is_empty())
            .ok_or_else(|| FieldError::Shape(format!("<{root}> has no xmlns attribute")))?;

        Ok(Self {
            root,
            full_name: String::new(),
            external_id: false,
            label: String::new(),
            field_type: String::new(),
            overlay_id,
            test_object,
            comment: String::new(),
            xmlns,
            attributes,
            extra: Vec::new(),
        })
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    /// Serialize the record as a complete document: the declaration line,
    /// then the tab-indented root element, then a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::Serialize`] if the writer fails.
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b'\t', 1);

        let mut root = BytesStart::new(self.root.as_str());
        if let Some(overlay) = self.overlay_id.as_deref().filter(|o| !o.is_empty()) {
            root.push_attribute((OVERLAY_ATTR, overlay));
        }
        if self.test_object {
            root.push_attribute((TEST_MARKER, "true"));
        }
        root.push_attribute((XMLNS_ATTR, self.xmlns.as_str()));
        for (key, value) in &self.attributes {
            root.push_attribute((key.as_str(), value.as_str()));
        }
        emit(&mut writer, Event::Start(root))?;

        emit_text_element(&mut writer, FULL_NAME, &self.full_name)?;
        emit_text_element(&mut writer, EXTERNAL_ID, bool_text(self.external_id))?;
        emit_text_element(&mut writer, LABEL, &self.label)?;
        emit_text_element(&mut writer, TYPE, &self.field_type)?;

        for extra in &self.extra {
            for event in &extra.events {
                emit(&mut writer, event.clone())?;
            }
        }

        if !self.comment.is_empty() {
            emit(
                &mut writer,
                Event::Comment(BytesText::from_escaped(self.comment.as_str())),
            )?;
        }

        emit(&mut writer, Event::End(BytesEnd::new(self.root.as_str())))?;

        let body = String::from_utf8(writer.into_inner())
            .map_err(|e| FieldError::Serialize(e.to_string()))?;
        Ok(format!("{XML_DECLARATION}{body}\n"))
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn element_name(start: &BytesStart<'_>) -> Result<String> {
    std::str::from_utf8(start.name().as_ref())
        .map(str::to_owned)
        .map_err(malformed)
}

/// Read the character data of a modeled element up to its end tag.
fn read_text(reader: &mut Reader<&[u8]>, element: &str) -> Result<String> {
    let mut text = String::new();
    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Text(t) => text.push_str(&t.unescape().map_err(malformed)?),
            Event::CData(c) => text.push_str(std::str::from_utf8(&c).map_err(malformed)?),
            Event::Start(_) | Event::Empty(_) => {
                return Err(FieldError::Shape(format!(
                    "<{element}> contains nested elements"
                )));
            }
            Event::End(_) => return Ok(text),
            Event::Eof => return Err(malformed(format!("unclosed <{element}>"))),
            _ => {}
        }
    }
}

/// Capture an unmodeled element, whose start tag has already been read.
fn read_extra(
    reader: &mut Reader<&[u8]>,
    name: String,
    start: BytesStart<'static>,
) -> Result<ExtraElement> {
    let mut events = vec![Event::Start(start)];
    let mut depth = 1usize;
    while depth > 0 {
        let event = reader.read_event().map_err(malformed)?.into_owned();
        match &event {
            Event::Start(_) => depth += 1,
            Event::End(_) => depth -= 1,
            Event::Eof => return Err(malformed(format!("unclosed <{name}>"))),
            _ => {}
        }
        events.push(event);
    }
    Ok(ExtraElement { name, events })
}

/// Parse boolean text the way the platform's exporters write it.
fn parse_bool(element: &str, text: &str) -> Result<bool> {
    match text.trim() {
        "" | "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        other => Err(FieldError::Shape(format!(
            "{element} is not a boolean: {other:?}"
        ))),
    }
}

fn bool_text(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| FieldError::Serialize(e.to_string()))
}

fn emit_text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    emit(writer, Event::Start(BytesStart::new(name)))?;
    emit(writer, Event::Text(BytesText::new(text)))?;
    emit(writer, Event::End(BytesEnd::new(name)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
