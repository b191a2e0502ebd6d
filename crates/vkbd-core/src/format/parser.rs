//! Streaming parser for layout resources.

use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;
use tracing::trace;

use crate::domain::layout::{
    Element, KeyElement, KeyStyle, LayoutDocument, Row, SpacerElement, DEFAULT_LAYOUT_NAME,
};

/// Errors that make a layout resource unusable.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The XML itself is malformed (bad syntax, mismatched end tag, ...).
    #[error("malformed XML at byte {position}: {source}")]
    Xml {
        position: usize,
        #[source]
        source: quick_xml::Error,
    },

    /// An attribute could not be read (duplicate, missing quotes, ...).
    #[error("malformed attribute: {0}")]
    Attribute(#[from] AttrError),

    /// An attribute value holds an unknown or broken entity reference.
    #[error("malformed attribute value: {0}")]
    AttributeValue(#[source] quick_xml::Error),

    /// A `width` attribute is not a finite, non-negative number.
    #[error("invalid width '{value}': expected a non-negative number")]
    InvalidWidth { value: String },

    /// The document has no root element.
    #[error("document has no root element")]
    MissingRoot,

    /// A second top-level element follows the root.
    #[error("document has more than one root element")]
    MultipleRoots,

    /// The document ends while elements are still open.
    #[error("unexpected end of document inside an open element")]
    UnexpectedEof,
}

/// Parses one layout resource.
///
/// # Errors
///
/// Returns [`FormatError`] when the XML is malformed or an attribute value
/// cannot be interpreted.  Unknown elements and unknown key styles are not
/// errors.
///
/// # Examples
///
/// ```rust
/// use vkbd_core::{parse_layout, Element};
///
/// let doc = parse_layout(r#"<Layout name="digits"><Row><Key symbol="1" keystroke="1"/></Row></Layout>"#).unwrap();
/// assert_eq!(doc.name, "digits");
/// assert!(matches!(doc.rows[0].elements[0], Element::Key(_)));
/// ```
pub fn parse_layout(xml: &str) -> Result<LayoutDocument, FormatError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut builder = DocumentBuilder::default();
    loop {
        let position = reader.buffer_position();
        let event = reader
            .read_event()
            .map_err(|source| FormatError::Xml { position, source })?;
        match event {
            Event::Start(ref e) => {
                builder.open(e)?;
                builder.depth += 1;
            }
            Event::Empty(ref e) => {
                builder.open(e)?;
                builder.close();
            }
            Event::End(_) => {
                builder.depth = builder.depth.saturating_sub(1);
                builder.close();
            }
            Event::Eof => break,
            // Text, comments, declarations and processing instructions carry
            // nothing for the layout.
            _ => {}
        }
    }
    builder.finish()
}

// ── Private helpers ───────────────────────────────────────────────────────────

/// Accumulates rows while the reader walks the element tree.
///
/// `depth` is the number of currently open elements: the root opens at 0,
/// rows at 1, keys and spacers at 2.
#[derive(Default)]
struct DocumentBuilder {
    depth: usize,
    name: Option<String>,
    root_seen: bool,
    rows: Vec<Row>,
    current_row: Option<Row>,
}

impl DocumentBuilder {
    fn open(&mut self, e: &BytesStart) -> Result<(), FormatError> {
        let tag = e.name();
        match self.depth {
            0 => {
                if self.root_seen {
                    return Err(FormatError::MultipleRoots);
                }
                self.root_seen = true;
                self.name = attr(e, "name")?;
            }
            1 if tag.as_ref() == b"Row" => {
                self.current_row = Some(Row {
                    row_type: attr(e, "type")?,
                    elements: Vec::new(),
                });
            }
            2 => {
                if let Some(row) = self.current_row.as_mut() {
                    match tag.as_ref() {
                        b"Key" => row.elements.push(Element::Key(parse_key(e)?)),
                        b"Spacer" => row.elements.push(Element::Spacer(SpacerElement {
                            width: width_attr(e)?,
                        })),
                        other => trace!(
                            "skipping unknown row element <{}>",
                            String::from_utf8_lossy(other)
                        ),
                    }
                }
            }
            depth => trace!(
                "skipping element <{}> at depth {depth}",
                String::from_utf8_lossy(tag.as_ref())
            ),
        }
        Ok(())
    }

    /// Called after an element closes; `depth` already excludes it.
    fn close(&mut self) {
        if self.depth == 1 {
            if let Some(row) = self.current_row.take() {
                self.rows.push(row);
            }
        }
    }

    fn finish(self) -> Result<LayoutDocument, FormatError> {
        if self.depth > 0 {
            return Err(FormatError::UnexpectedEof);
        }
        if !self.root_seen {
            return Err(FormatError::MissingRoot);
        }
        let name = self
            .name
            .unwrap_or_else(|| DEFAULT_LAYOUT_NAME.to_string());
        Ok(LayoutDocument::new(name, self.rows))
    }
}

fn parse_key(e: &BytesStart) -> Result<KeyElement, FormatError> {
    let style = attr(e, "style")?
        .map(|s| KeyStyle::from_attr(&s))
        .unwrap_or_default();
    Ok(KeyElement {
        symbol: attr(e, "symbol")?.unwrap_or_default(),
        style,
        keystroke: attr(e, "keystroke")?,
        width: width_attr(e)?,
        layout_link: attr(e, "layoutLink")?.filter(|link| !link.is_empty()),
    })
}

/// Returns the unescaped value of attribute `name`, if present.
fn attr(e: &BytesStart, name: &str) -> Result<Option<String>, FormatError> {
    for attribute in e.attributes() {
        let attribute = attribute?;
        if attribute.key.as_ref() == name.as_bytes() {
            let value = attribute
                .unescape_value()
                .map_err(FormatError::AttributeValue)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn width_attr(e: &BytesStart) -> Result<f32, FormatError> {
    match attr(e, "width")? {
        None => Ok(1.0),
        Some(value) => parse_width(&value),
    }
}

fn parse_width(value: &str) -> Result<f32, FormatError> {
    match value.trim().parse::<f32>() {
        Ok(width) if width.is_finite() && width >= 0.0 => Ok(width),
        _ => Err(FormatError::InvalidWidth {
            value: value.to_string(),
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
