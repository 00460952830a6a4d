use quick_xml::{
  events::{attributes::AttrError, BytesStart, Event},
  Decoder, Reader,
};
use std::{borrow::Cow, fmt::Write, io::BufRead, num::ParseIntError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SdkError {
  #[error("quick_xml error")]
  QuickXmlError(#[from] quick_xml::Error),
  #[error("quick_xml attr error")]
  AttrError(#[from] AttrError),
  #[error("ParseIntError")]
  ParseIntError(#[from] ParseIntError),
  #[error("StdFmtError")]
  StdFmtError(#[from] std::fmt::Error),
  #[error("StdIoError")]
  StdIoError(#[from] std::io::Error),
  #[error("ZipError")]
  ZipError(#[from] zip::result::ZipError),
  #[error("mismatch error (expected {expected:?}, found {found:?})")]
  MismatchError { expected: String, found: String },
  #[error("package has no `{0}` part")]
  MissingPart(String),
  #[error("unexpected end of xml inside `{0}`")]
  UnexpectedEof(String),
  #[error("character {0:?} is not allowed in xml")]
  InvalidXmlChar(char),
  #[error("`{0}` common error")]
  CommonError(String),
  #[error("unknown error")]
  UnknownError,
}

pub trait XmlReader<'de> {
  fn next(&mut self) -> Result<Event<'de>, SdkError>;

  fn peek(&mut self) -> Result<&Event<'de>, SdkError>;

  fn decoder(&self) -> Decoder;
}

pub struct IoReader<'de, R: BufRead> {
  reader: Reader<R>,
  peek: Option<Event<'de>>,
  buf: Vec<u8>,
}

impl<'de, R: BufRead> IoReader<'de, R> {
  pub fn new(reader: Reader<R>) -> Self {
    Self {
      reader,
      peek: None,
      buf: Vec::new(),
    }
  }
}

impl<'de, R: BufRead> XmlReader<'de> for IoReader<'de, R> {
  fn next(&mut self) -> Result<Event<'de>, SdkError> {
    if let Some(e) = self.peek.take() {
      return Ok(e);
    }

    self.buf.clear();

    let event = self.reader.read_event_into(&mut self.buf)?;

    Ok(event.into_owned())
  }

  fn peek(&mut self) -> Result<&Event<'de>, SdkError> {
    if self.peek.is_none() {
      self.peek = Some(self.next()?);
    }

    self.peek.as_ref().ok_or(SdkError::UnknownError)
  }

  fn decoder(&self) -> Decoder {
    self.reader.decoder()
  }
}

pub struct SliceReader<'de> {
  reader: Reader<&'de [u8]>,
  peek: Option<Event<'de>>,
}

impl<'de> SliceReader<'de> {
  pub fn new(reader: Reader<&'de [u8]>) -> Self {
    Self { reader, peek: None }
  }
}

impl<'de> XmlReader<'de> for SliceReader<'de> {
  fn next(&mut self) -> Result<Event<'de>, SdkError> {
    if let Some(e) = self.peek.take() {
      return Ok(e);
    }

    Ok(self.reader.read_event()?)
  }

  fn peek(&mut self) -> Result<&Event<'de>, SdkError> {
    if self.peek.is_none() {
      self.peek = Some(self.next()?);
    }

    self.peek.as_ref().ok_or(SdkError::UnknownError)
  }

  fn decoder(&self) -> Decoder {
    self.reader.decoder()
  }
}

/// What the next event is, without borrowing the reader.
///
/// Element names are local names, so `w:p` and `p` both come back as `p`.
#[derive(Debug, PartialEq, Eq)]
pub enum PeekedEvent {
  Start(Vec<u8>),
  End,
  Eof,
  Other,
}

pub fn peek_event<'de, R: XmlReader<'de>>(xml_reader: &mut R) -> Result<PeekedEvent, SdkError> {
  Ok(match xml_reader.peek()? {
    Event::Start(e) | Event::Empty(e) => {
      PeekedEvent::Start(e.name().local_name().as_ref().to_vec())
    }
    Event::End(_) => PeekedEvent::End,
    Event::Eof => PeekedEvent::Eof,
    _ => PeekedEvent::Other,
  })
}

/// Consumes the next start tag, which must have the given local name.
///
/// The flag is `true` for a self-closing tag.
pub fn expect_start<'de, R: XmlReader<'de>>(
  xml_reader: &mut R,
  local_name: &str,
) -> Result<(BytesStart<'de>, bool), SdkError> {
  let (e, empty_tag) = match xml_reader.next()? {
    Event::Start(e) => (e, false),
    Event::Empty(e) => (e, true),
    other => Err(SdkError::MismatchError {
      expected: local_name.to_string(),
      found: format!("{other:?}"),
    })?,
  };

  if e.name().local_name().as_ref() != local_name.as_bytes() {
    Err(SdkError::MismatchError {
      expected: local_name.to_string(),
      found: String::from_utf8_lossy(e.name().as_ref()).to_string(),
    })?;
  }

  Ok((e, empty_tag))
}

/// Looks up an attribute by local name and returns its unescaped value.
pub fn attribute(
  e: &BytesStart<'_>,
  decoder: Decoder,
  local_name: &[u8],
) -> Result<Option<String>, SdkError> {
  for attr in e.attributes() {
    let attr = attr?;

    if attr.key.local_name().as_ref() == local_name {
      return Ok(Some(attr.decode_and_unescape_value(decoder)?.into_owned()));
    }
  }

  Ok(None)
}

pub fn required_attribute(
  e: &BytesStart<'_>,
  decoder: Decoder,
  local_name: &[u8],
) -> Result<String, SdkError> {
  attribute(e, decoder, local_name)?.ok_or_else(|| {
    SdkError::CommonError(format!(
      "{}@{}",
      String::from_utf8_lossy(e.name().as_ref()),
      String::from_utf8_lossy(local_name)
    ))
  })
}

/// Consumes events until the element whose start tag was already read is
/// closed. `depth` is the number of open elements to close.
pub fn skip_to_end<'de, R: XmlReader<'de>>(xml_reader: &mut R, depth: usize) -> Result<(), SdkError> {
  let mut depth = depth;

  while depth > 0 {
    match xml_reader.next()? {
      Event::Start(_) => depth += 1,
      Event::End(_) => depth -= 1,
      Event::Eof => Err(SdkError::UnexpectedEof("skipped element".to_string()))?,
      _ => {}
    }
  }

  Ok(())
}

/// Consumes the next element together with all of its descendants.
pub fn skip_element<'de, R: XmlReader<'de>>(xml_reader: &mut R) -> Result<(), SdkError> {
  match xml_reader.next()? {
    Event::Start(_) => skip_to_end(xml_reader, 1),
    _ => Ok(()),
  }
}

/// Consumes the next element together with all of its descendants and
/// returns its markup as read, prefixes and attributes included.
pub fn read_raw_element<'de, R: XmlReader<'de>>(xml_reader: &mut R) -> Result<String, SdkError> {
  let mut writer = quick_xml::Writer::new(Vec::new());

  let first = xml_reader.next()?;

  let mut depth: usize = match &first {
    Event::Start(_) => 1,
    Event::Empty(_) => 0,
    other => Err(SdkError::MismatchError {
      expected: "element".to_string(),
      found: format!("{other:?}"),
    })?,
  };

  writer.write_event(first)?;

  while depth > 0 {
    let event = xml_reader.next()?;

    match &event {
      Event::Start(_) => depth += 1,
      Event::End(_) => depth -= 1,
      Event::Eof => Err(SdkError::UnexpectedEof("raw element".to_string()))?,
      _ => {}
    }

    writer.write_event(event)?;
  }

  String::from_utf8(writer.into_inner()).map_err(|e| SdkError::CommonError(e.to_string()))
}

/// Walks the children of an element whose start tag was already consumed,
/// up to and including its end tag.
///
/// `on_child` sees each child start tag by local name while it is still
/// unread; it returns `false` to have the child skipped.
pub fn read_children<'de, R, F>(xml_reader: &mut R, element: &str, mut on_child: F) -> Result<(), SdkError>
where
  R: XmlReader<'de>,
  F: FnMut(&mut R, &[u8]) -> Result<bool, SdkError>,
{
  loop {
    match peek_event(xml_reader)? {
      PeekedEvent::Start(name) => {
        if !on_child(xml_reader, &name)? {
          skip_element(xml_reader)?;
        }
      }
      PeekedEvent::End => {
        xml_reader.next()?;
        return Ok(());
      }
      PeekedEvent::Eof => Err(SdkError::UnexpectedEof(element.to_string()))?,
      PeekedEvent::Other => {
        xml_reader.next()?;
      }
    }
  }
}

/// Reads the text content of an element whose start tag was already consumed,
/// up to and including its end tag. Nested elements are skipped.
pub fn read_text<'de, R: XmlReader<'de>>(
  xml_reader: &mut R,
  empty_tag: bool,
) -> Result<String, SdkError> {
  let mut text = String::new();

  if empty_tag {
    return Ok(text);
  }

  loop {
    match xml_reader.next()? {
      Event::Text(t) => text.push_str(&t.unescape()?),
      Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c)),
      Event::Start(_) => skip_to_end(xml_reader, 1)?,
      Event::End(_) => return Ok(text),
      Event::Eof => Err(SdkError::UnexpectedEof("text".to_string()))?,
      _ => {}
    }
  }
}

/// Whether `c` is a `Char` of XML 1.0. Control characters other than tab,
/// line feed and carriage return have no escaped form there.
pub fn is_xml_char(c: char) -> bool {
  matches!(
    c,
    '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
  )
}

/// Escapes `value` for text or attribute content, failing on characters
/// that cannot appear in an XML document at all.
pub fn escape_checked(value: &str) -> Result<Cow<'_, str>, SdkError> {
  if let Some(c) = value.chars().find(|c| !is_xml_char(*c)) {
    return Err(SdkError::InvalidXmlChar(c));
  }

  Ok(quick_xml::escape::escape(value))
}

/// Writes ` name="value"` with the value escaped.
pub fn write_attr(writer: &mut String, name: &str, value: &str) -> Result<(), SdkError> {
  writer.write_char(' ')?;
  writer.write_str(name)?;
  writer.write_str("=\"")?;
  writer.write_str(&escape_checked(value)?)?;
  writer.write_char('"')?;

  Ok(())
}

/// Writes `<name>value</name>` with the value escaped.
pub fn write_text_element(writer: &mut String, name: &str, value: &str) -> Result<(), SdkError> {
  writer.write_char('<')?;
  writer.write_str(name)?;
  writer.write_char('>')?;
  writer.write_str(&escape_checked(value)?)?;
  writer.write_str("</")?;
  writer.write_str(name)?;
  writer.write_char('>')?;

  Ok(())
}

pub const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n";

pub fn resolve_zip_file_path(path: &str) -> String {
  let mut stack = Vec::new();

  for component in path.split('/') {
    match component {
      "" | "." => {}
      ".." => {
        stack.pop();
      }
      _ => {
        stack.push(component);
      }
    }
  }

  stack.join("/")
}

/// Path of the relationships part belonging to `part_path`,
/// e.g. `word/document.xml` -> `word/_rels/document.xml.rels`.
pub fn rels_path_for(part_path: &str) -> String {
  match part_path.rsplit_once('/') {
    Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
    None => format!("_rels/{part_path}.rels"),
  }
}

/// Directory of a part path, with a trailing slash, or empty at the root.
pub fn parent_dir(part_path: &str) -> &str {
  match part_path.rfind('/') {
    Some(i) => &part_path[..=i],
    None => "",
  }
}

#[inline]
pub fn from_reader_inner<'de, R: BufRead>(reader: R) -> Result<IoReader<'de, R>, SdkError> {
  let mut xml_reader = IoReader::new(quick_xml::Reader::from_reader(reader));

  skip_prolog(&mut xml_reader)?;

  Ok(xml_reader)
}

#[inline]
pub fn from_str_inner(s: &str) -> Result<SliceReader<'_>, SdkError> {
  let mut xml_reader = SliceReader::new(quick_xml::Reader::from_str(s));

  skip_prolog(&mut xml_reader)?;

  Ok(xml_reader)
}

fn skip_prolog<'de, R: XmlReader<'de>>(xml_reader: &mut R) -> Result<(), SdkError> {
  loop {
    match xml_reader.peek()? {
      Event::Decl(_) | Event::Text(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {
        xml_reader.next()?;
      }
      _ => return Ok(()),
    }
  }
}
