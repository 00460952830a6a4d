use std::fmt::Write;

use quick_xml::events::Event;

use crate::common::{
  attribute, escape_checked, expect_start, read_children, read_raw_element, read_text,
  skip_element, skip_to_end, write_attr, SdkError, XmlReader, XML_DECLARATION,
};

pub const W_NAMESPACE: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub const R_NAMESPACE: &str =
  "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Root element of the main document part, `<w:document>`.
///
/// Markup this model has no type for is kept as read and written back in
/// place, so opening and saving a document does not lose tables, drawings or
/// formatting.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
  /// Attributes of `<w:document>` besides the `w` and `r` namespace
  /// declarations, e.g. the namespaces kept markup refers to.
  pub attributes: Vec<(String, String)>,
  /// Children ahead of the body, such as `<w:background>`.
  pub before_body: Vec<String>,
  pub body: Body,
}

impl std::str::FromStr for Document {
  type Err = SdkError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let mut xml_reader = crate::common::from_str_inner(s)?;

    Self::deserialize_self(&mut xml_reader)
  }
}

impl Document {
  pub fn from_reader<R: std::io::BufRead>(reader: R) -> Result<Self, SdkError> {
    let mut xml_reader = crate::common::from_reader_inner(reader)?;

    Self::deserialize_self(&mut xml_reader)
  }

  pub fn deserialize_self<'de, R: XmlReader<'de>>(xml_reader: &mut R) -> Result<Self, SdkError> {
    let (e, empty_tag) = expect_start(xml_reader, "document")?;

    let decoder = xml_reader.decoder();

    let mut attributes = vec![];

    for attr in e.attributes() {
      let attr = attr?;

      let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();

      if key == "xmlns:w" || key == "xmlns:r" {
        continue;
      }

      attributes.push((key, attr.decode_and_unescape_value(decoder)?.into_owned()));
    }

    let mut before_body = vec![];

    let mut body = None;

    if !empty_tag {
      read_children(xml_reader, "document", |xml_reader, name| {
        if name == b"body" {
          body = Some(Body::deserialize_self(xml_reader)?);
        } else {
          before_body.push(read_raw_element(xml_reader)?);
        }

        Ok(true)
      })?;
    }

    Ok(Self {
      attributes,
      before_body,
      body: body.unwrap_or_default(),
    })
  }

  pub fn to_xml(&self) -> Result<String, SdkError> {
    let mut writer = String::with_capacity(self.body.text_len() + 1024);

    writer.write_str(XML_DECLARATION)?;

    writer.write_str("<w:document")?;
    write_attr(&mut writer, "xmlns:w", W_NAMESPACE)?;
    write_attr(&mut writer, "xmlns:r", R_NAMESPACE)?;

    for (key, value) in &self.attributes {
      write_attr(&mut writer, key, value)?;
    }

    writer.write_char('>')?;

    for markup in &self.before_body {
      writer.write_str(markup)?;
    }

    self.body.write_xml(&mut writer)?;

    writer.write_str("</w:document>")?;

    Ok(writer)
  }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Body {
  pub children: Vec<BodyChild>,
  /// Always written after the other children, as the last child of the body.
  pub section_properties: Option<SectionProperties>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum BodyChild {
  Paragraph(Paragraph),
  /// Any other block, such as `<w:tbl>` or `<w:sdt>`, as read.
  Raw(String),
}

impl Body {
  pub fn deserialize_self<'de, R: XmlReader<'de>>(xml_reader: &mut R) -> Result<Self, SdkError> {
    let (_, empty_tag) = expect_start(xml_reader, "body")?;

    let mut body = Self::default();

    if !empty_tag {
      read_children(xml_reader, "body", |xml_reader, name| {
        match name {
          b"p" => body
            .children
            .push(BodyChild::Paragraph(Paragraph::deserialize_self(xml_reader)?)),
          b"sectPr" => {
            body.section_properties = Some(SectionProperties::deserialize_self(xml_reader)?)
          }
          _ => body.children.push(BodyChild::Raw(read_raw_element(xml_reader)?)),
        }

        Ok(true)
      })?;
    }

    Ok(body)
  }

  /// Paragraphs directly under the body, in document order.
  pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
    self.children.iter().filter_map(|child| match child {
      BodyChild::Paragraph(paragraph) => Some(paragraph),
      BodyChild::Raw(_) => None,
    })
  }

  pub fn push_paragraph(&mut self, paragraph: Paragraph) -> &mut Paragraph {
    self.children.push(BodyChild::Paragraph(paragraph));

    match self.children.last_mut() {
      Some(BodyChild::Paragraph(paragraph)) => paragraph,
      _ => unreachable!(),
    }
  }

  /// Rough size of the markup, used to presize the serializer buffer.
  pub fn text_len(&self) -> usize {
    self
      .children
      .iter()
      .map(|child| match child {
        BodyChild::Paragraph(paragraph) => {
          paragraph
            .runs()
            .into_iter()
            .flat_map(|r| r.content.iter())
            .map(|c| match c {
              RunContent::Text(text) => text.len() + 32,
              RunContent::Tab | RunContent::Break => 8,
              RunContent::Raw(markup) => markup.len(),
            })
            .sum::<usize>()
            + 16
        }
        BodyChild::Raw(markup) => markup.len(),
      })
      .sum()
  }

  pub fn write_xml(&self, writer: &mut String) -> Result<(), SdkError> {
    if self.children.is_empty() && self.section_properties.is_none() {
      writer.write_str("<w:body/>")?;
      return Ok(());
    }

    writer.write_str("<w:body>")?;

    for child in &self.children {
      match child {
        BodyChild::Paragraph(paragraph) => paragraph.write_xml(writer)?,
        BodyChild::Raw(markup) => writer.write_str(markup)?,
      }
    }

    if let Some(section_properties) = &self.section_properties {
      section_properties.write_xml(writer)?;
    }

    writer.write_str("</w:body>")?;

    Ok(())
  }
}

/// `<w:p>`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Paragraph {
  pub style: Option<String>,
  /// `<w:pPr>` children other than `<w:pStyle>`, as read.
  pub properties: Vec<String>,
  pub content: Vec<ParagraphContent>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ParagraphContent {
  Run(Run),
  /// A container such as `<w:hyperlink>` or `<w:ins>`, kept with its own
  /// tags around the content read from it.
  Group {
    start_tag: String,
    end_tag: String,
    content: Vec<ParagraphContent>,
  },
  /// Anything else, such as bookmarks, as read.
  Raw(String),
}

impl Paragraph {
  /// A paragraph holding `text` in a single run, or no run at all when
  /// `text` is empty.
  pub fn new(text: &str) -> Self {
    let mut paragraph = Self::default();

    if !text.is_empty() {
      paragraph.add_run(text);
    }

    paragraph
  }

  pub fn with_style(mut self, style: &str) -> Self {
    self.style = Some(style.to_string());
    self
  }

  pub fn add_run(&mut self, text: &str) -> &mut Self {
    self.content.push(ParagraphContent::Run(Run::new(text)));
    self
  }

  /// Every run of the paragraph, including those inside containers.
  pub fn runs(&self) -> Vec<&Run> {
    let mut runs = vec![];

    collect_runs(&self.content, &mut runs);

    runs
  }

  pub fn text(&self) -> String {
    self.runs().into_iter().map(Run::text).collect()
  }

  pub fn deserialize_self<'de, R: XmlReader<'de>>(xml_reader: &mut R) -> Result<Self, SdkError> {
    let (_, empty_tag) = expect_start(xml_reader, "p")?;

    let mut paragraph = Self::default();

    if !empty_tag {
      let Self {
        style,
        properties,
        content,
      } = &mut paragraph;

      read_children(xml_reader, "p", |xml_reader, name| {
        if name == b"pPr" {
          read_paragraph_properties(xml_reader, style, properties)?;
        } else {
          read_paragraph_content(xml_reader, name, content)?;
        }

        Ok(true)
      })?;
    }

    Ok(paragraph)
  }

  pub fn write_xml(&self, writer: &mut String) -> Result<(), SdkError> {
    if self.style.is_none() && self.properties.is_empty() && self.content.is_empty() {
      writer.write_str("<w:p/>")?;
      return Ok(());
    }

    writer.write_str("<w:p>")?;

    if self.style.is_some() || !self.properties.is_empty() {
      writer.write_str("<w:pPr>")?;

      if let Some(style) = &self.style {
        writer.write_str("<w:pStyle")?;
        write_attr(writer, "w:val", style)?;
        writer.write_str("/>")?;
      }

      for markup in &self.properties {
        writer.write_str(markup)?;
      }

      writer.write_str("</w:pPr>")?;
    }

    for c in &self.content {
      c.write_xml(writer)?;
    }

    writer.write_str("</w:p>")?;

    Ok(())
  }
}

impl ParagraphContent {
  pub fn write_xml(&self, writer: &mut String) -> Result<(), SdkError> {
    match self {
      Self::Run(run) => run.write_xml(writer)?,
      Self::Group {
        start_tag,
        end_tag,
        content,
      } => {
        writer.write_str(start_tag)?;

        for c in content {
          c.write_xml(writer)?;
        }

        writer.write_str(end_tag)?;
      }
      Self::Raw(markup) => writer.write_str(markup)?,
    }

    Ok(())
  }
}

fn collect_runs<'a>(content: &'a [ParagraphContent], runs: &mut Vec<&'a Run>) {
  for c in content {
    match c {
      ParagraphContent::Run(run) => runs.push(run),
      ParagraphContent::Group { content, .. } => collect_runs(content, runs),
      ParagraphContent::Raw(_) => {}
    }
  }
}

/// Runs may sit directly in a paragraph or inside containers such as
/// hyperlinks and tracked insertions.
fn read_paragraph_content<'de, R: XmlReader<'de>>(
  xml_reader: &mut R,
  name: &[u8],
  content: &mut Vec<ParagraphContent>,
) -> Result<(), SdkError> {
  match name {
    b"r" => content.push(ParagraphContent::Run(Run::deserialize_self(xml_reader)?)),
    b"hyperlink" | b"ins" | b"smartTag" | b"fldSimple" | b"customXml" => {
      let local_name = String::from_utf8_lossy(name).into_owned();

      let (e, empty_tag) = expect_start(xml_reader, &local_name)?;

      let tag = String::from_utf8_lossy(&e).into_owned();

      if empty_tag {
        content.push(ParagraphContent::Raw(format!("<{tag}/>")));
        return Ok(());
      }

      let mut inner = vec![];

      read_children(xml_reader, &local_name, |xml_reader, name| {
        read_paragraph_content(xml_reader, name, &mut inner)?;
        Ok(true)
      })?;

      content.push(ParagraphContent::Group {
        start_tag: format!("<{tag}>"),
        end_tag: format!("</{}>", String::from_utf8_lossy(e.name().as_ref())),
        content: inner,
      });
    }
    _ => content.push(ParagraphContent::Raw(read_raw_element(xml_reader)?)),
  }

  Ok(())
}

fn read_paragraph_properties<'de, R: XmlReader<'de>>(
  xml_reader: &mut R,
  style: &mut Option<String>,
  properties: &mut Vec<String>,
) -> Result<(), SdkError> {
  let (_, empty_tag) = expect_start(xml_reader, "pPr")?;

  if !empty_tag {
    read_children(xml_reader, "pPr", |xml_reader, name| {
      if name != b"pStyle" {
        properties.push(read_raw_element(xml_reader)?);
        return Ok(true);
      }

      let (e, empty_tag) = expect_start(xml_reader, "pStyle")?;

      *style = attribute(&e, xml_reader.decoder(), b"val")?;

      if !empty_tag {
        skip_to_end(xml_reader, 1)?;
      }

      Ok(true)
    })?;
  }

  Ok(())
}

/// `<w:r>`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Run {
  /// `<w:rPr>` as read.
  pub properties: Option<String>,
  pub content: Vec<RunContent>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RunContent {
  /// `<w:t>`
  Text(String),
  /// `<w:tab/>`
  Tab,
  /// `<w:br/>` or `<w:cr/>` without attributes
  Break,
  /// Anything else, such as `<w:drawing>` or a page break, as read.
  Raw(String),
}

impl Run {
  /// Tabs become `<w:tab/>` and each `\n` or `\r` becomes `<w:br/>`; everything
  /// else is kept as text.
  pub fn new(text: &str) -> Self {
    let mut content = vec![];

    let mut rest = text;

    while let Some(i) = rest.find(|c| matches!(c, '\t' | '\n' | '\r')) {
      if i > 0 {
        content.push(RunContent::Text(rest[..i].to_string()));
      }

      content.push(match rest.as_bytes()[i] {
        b'\t' => RunContent::Tab,
        _ => RunContent::Break,
      });

      rest = &rest[i + 1..];
    }

    if !rest.is_empty() {
      content.push(RunContent::Text(rest.to_string()));
    }

    Self {
      properties: None,
      content,
    }
  }

  pub fn text(&self) -> String {
    let mut text = String::new();

    for c in &self.content {
      match c {
        RunContent::Text(t) => text.push_str(t),
        RunContent::Tab => text.push('\t'),
        RunContent::Break => text.push('\n'),
        RunContent::Raw(_) => {}
      }
    }

    text
  }

  pub fn deserialize_self<'de, R: XmlReader<'de>>(xml_reader: &mut R) -> Result<Self, SdkError> {
    let (_, empty_tag) = expect_start(xml_reader, "r")?;

    let mut properties = None;

    let mut content = vec![];

    if !empty_tag {
      read_children(xml_reader, "r", |xml_reader, name| {
        match name {
          b"rPr" => properties = Some(read_raw_element(xml_reader)?),
          b"t" => {
            let (_, empty_tag) = expect_start(xml_reader, "t")?;

            content.push(RunContent::Text(read_text(xml_reader, empty_tag)?));
          }
          b"tab" => {
            skip_element(xml_reader)?;
            content.push(RunContent::Tab);
          }
          b"br" | b"cr" if !next_has_attributes(xml_reader)? => {
            skip_element(xml_reader)?;
            content.push(RunContent::Break);
          }
          _ => content.push(RunContent::Raw(read_raw_element(xml_reader)?)),
        }

        Ok(true)
      })?;
    }

    Ok(Self {
      properties,
      content,
    })
  }

  pub fn write_xml(&self, writer: &mut String) -> Result<(), SdkError> {
    writer.write_str("<w:r>")?;

    if let Some(properties) = &self.properties {
      writer.write_str(properties)?;
    }

    for c in &self.content {
      match c {
        RunContent::Text(text) => {
          if needs_space_preserve(text) {
            writer.write_str(r#"<w:t xml:space="preserve">"#)?;
          } else {
            writer.write_str("<w:t>")?;
          }

          writer.write_str(&escape_checked(text)?)?;
          writer.write_str("</w:t>")?;
        }
        RunContent::Tab => writer.write_str("<w:tab/>")?,
        RunContent::Break => writer.write_str("<w:br/>")?,
        RunContent::Raw(markup) => writer.write_str(markup)?,
      }
    }

    writer.write_str("</w:r>")?;

    Ok(())
  }
}

/// Word drops leading and trailing whitespace of `<w:t>` unless told not to.
fn needs_space_preserve(text: &str) -> bool {
  text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace)
}

fn next_has_attributes<'de, R: XmlReader<'de>>(xml_reader: &mut R) -> Result<bool, SdkError> {
  Ok(match xml_reader.peek()? {
    Event::Start(e) | Event::Empty(e) => e.attributes().next().is_some(),
    _ => false,
  })
}

/// `<w:sectPr>` children that come before the page size.
const BEFORE_PAGE: [&[u8]; 5] = [
  b"headerReference",
  b"footerReference",
  b"footnotePr",
  b"endnotePr",
  b"type",
];

/// `<w:sectPr>`, page geometry in twentieths of a point.
///
/// Other children are kept as read on either side of the page size and
/// margins, so header references and columns survive a round trip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionProperties {
  pub before_page: Vec<String>,
  pub page_width: u32,
  pub page_height: u32,
  pub margin_top: i32,
  pub margin_right: u32,
  pub margin_bottom: i32,
  pub margin_left: u32,
  pub margin_header: u32,
  pub margin_footer: u32,
  pub margin_gutter: u32,
  pub after_page: Vec<String>,
}

impl Default for SectionProperties {
  /// US Letter, portrait, one column.
  fn default() -> Self {
    Self {
      before_page: vec![],
      page_width: 12240,
      page_height: 15840,
      margin_top: 1440,
      margin_right: 1800,
      margin_bottom: 1440,
      margin_left: 1800,
      margin_header: 720,
      margin_footer: 720,
      margin_gutter: 0,
      after_page: vec![
        r#"<w:cols w:space="720"/>"#.to_string(),
        r#"<w:docGrid w:linePitch="360"/>"#.to_string(),
      ],
    }
  }
}

impl SectionProperties {
  pub fn deserialize_self<'de, R: XmlReader<'de>>(xml_reader: &mut R) -> Result<Self, SdkError> {
    let (_, empty_tag) = expect_start(xml_reader, "sectPr")?;

    let mut properties = Self {
      after_page: vec![],
      ..Self::default()
    };

    if empty_tag {
      return Ok(properties);
    }

    read_children(xml_reader, "sectPr", |xml_reader, name| {
      let is_page_size = match name {
        b"pgSz" => true,
        b"pgMar" => false,
        _ => {
          let markup = read_raw_element(xml_reader)?;

          if BEFORE_PAGE.iter().any(|n| *n == name) {
            properties.before_page.push(markup);
          } else {
            properties.after_page.push(markup);
          }

          return Ok(true);
        }
      };

      let local_name = if is_page_size { "pgSz" } else { "pgMar" };

      let (e, empty_tag) = expect_start(xml_reader, local_name)?;

      let decoder = xml_reader.decoder();

      let number = |key: &[u8]| -> Result<Option<String>, SdkError> { attribute(&e, decoder, key) };

      if is_page_size {
        if let Some(v) = number(b"w")? {
          properties.page_width = v.parse()?;
        }
        if let Some(v) = number(b"h")? {
          properties.page_height = v.parse()?;
        }
      } else {
        if let Some(v) = number(b"top")? {
          properties.margin_top = v.parse()?;
        }
        if let Some(v) = number(b"right")? {
          properties.margin_right = v.parse()?;
        }
        if let Some(v) = number(b"bottom")? {
          properties.margin_bottom = v.parse()?;
        }
        if let Some(v) = number(b"left")? {
          properties.margin_left = v.parse()?;
        }
        if let Some(v) = number(b"header")? {
          properties.margin_header = v.parse()?;
        }
        if let Some(v) = number(b"footer")? {
          properties.margin_footer = v.parse()?;
        }
        if let Some(v) = number(b"gutter")? {
          properties.margin_gutter = v.parse()?;
        }
      }

      if !empty_tag {
        skip_to_end(xml_reader, 1)?;
      }

      Ok(true)
    })?;

    Ok(properties)
  }

  pub fn write_xml(&self, writer: &mut String) -> Result<(), SdkError> {
    writer.write_str("<w:sectPr>")?;

    for markup in &self.before_page {
      writer.write_str(markup)?;
    }

    write!(
      writer,
      r#"<w:pgSz w:w="{}" w:h="{}"/><w:pgMar w:top="{}" w:right="{}" w:bottom="{}" w:left="{}" w:header="{}" w:footer="{}" w:gutter="{}"/>"#,
      self.page_width,
      self.page_height,
      self.margin_top,
      self.margin_right,
      self.margin_bottom,
      self.margin_left,
      self.margin_header,
      self.margin_footer,
      self.margin_gutter,
    )?;

    for markup in &self.after_page {
      writer.write_str(markup)?;
    }

    writer.write_str("</w:sectPr>")?;

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::str::FromStr;

  #[test]
  fn test_run_new_splits_tabs_and_breaks() {
    let run = Run::new("a\tb\nc\r\n");

    assert_eq!(
      run.content,
      vec![
        RunContent::Text("a".to_string()),
        RunContent::Tab,
        RunContent::Text("b".to_string()),
        RunContent::Break,
        RunContent::Text("c".to_string()),
        RunContent::Break,
        RunContent::Break,
      ]
    );
    assert_eq!(run.text(), "a\tb\nc\n\n");
  }

  #[test]
  fn test_empty_paragraph_has_no_run() {
    let paragraph = Paragraph::new("");

    assert!(paragraph.runs().is_empty());

    let mut writer = String::new();
    paragraph.write_xml(&mut writer).unwrap();
    assert_eq!(writer, "<w:p/>");
  }

  #[test]
  fn test_trailing_space_is_preserved() {
    let paragraph = Paragraph::new("Lorem ipsum. Lorem ipsum. ");

    let mut writer = String::new();
    paragraph.write_xml(&mut writer).unwrap();

    assert_eq!(
      writer,
      r#"<w:p><w:r><w:t xml:space="preserve">Lorem ipsum. Lorem ipsum. </w:t></w:r></w:p>"#
    );

    let mut writer = String::new();
    Paragraph::new("tight").write_xml(&mut writer).unwrap();
    assert_eq!(writer, "<w:p><w:r><w:t>tight</w:t></w:r></w:p>");
  }

  #[test]
  fn test_text_is_escaped() {
    let mut writer = String::new();
    Paragraph::new("a<b & c>d").with_style("Title").write_xml(&mut writer).unwrap();

    assert_eq!(
      writer,
      r#"<w:p><w:pPr><w:pStyle w:val="Title"/></w:pPr><w:r><w:t>a&lt;b &amp; c&gt;d</w:t></w:r></w:p>"#
    );
  }

  #[test]
  fn test_control_characters_fail_to_serialize() {
    let mut writer = String::new();

    match Paragraph::new("a\u{1}b\u{b}c").write_xml(&mut writer) {
      Err(SdkError::InvalidXmlChar(c)) => assert_eq!(c, '\u{1}'),
      other => panic!("unexpected {other:?}"),
    }

    let mut writer = String::new();
    assert!(matches!(
      Paragraph::new("ok").with_style("bad\u{0}style").write_xml(&mut writer),
      Err(SdkError::InvalidXmlChar('\u{0}'))
    ));
  }

  #[test]
  fn test_document_round_trip() {
    let document = Document {
      body: Body {
        children: vec![
          BodyChild::Paragraph(Paragraph::new("Heading").with_style("Heading1")),
          BodyChild::Paragraph(Paragraph::new(" leading\tand trailing \n")),
          BodyChild::Paragraph(Paragraph::new("")),
        ],
        section_properties: Some(SectionProperties::default()),
      },
      ..Default::default()
    };

    let xml = document.to_xml().unwrap();

    assert!(xml.ends_with(
      r#"<w:cols w:space="720"/><w:docGrid w:linePitch="360"/></w:sectPr></w:body></w:document>"#
    ));

    let parsed = Document::from_str(&xml).unwrap();

    assert_eq!(parsed, document);

    let paragraphs: Vec<&Paragraph> = parsed.body.paragraphs().collect();
    assert_eq!(paragraphs[1].text(), " leading\tand trailing \n");
  }

  const FOREIGN_DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <w:background w:color="FFFFFF"/>
  <w:body>
    <w:p w:rsidR="00F1">
      <w:pPr><w:jc w:val="center"/><w:pStyle w:val="Title"/></w:pPr>
      <w:bookmarkStart w:id="0" w:name="_GoBack"/>
      <w:r><w:rPr><w:b/></w:rPr><w:t>Hello</w:t></w:r>
      <w:hyperlink r:id="rId4"><w:r><w:t xml:space="preserve"> world</w:t></w:r></w:hyperlink>
      <w:bookmarkEnd w:id="0"/>
    </w:p>
    <w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
    <w:p><w:r><w:drawing><wp:inline distT="0"/></w:drawing><w:br w:type="page"/><w:t>after</w:t></w:r></w:p>
    <w:p/>
    <w:sectPr w:rsidR="00F1">
      <w:headerReference w:type="default" r:id="rId7"/>
      <w:pgSz w:w="11906" w:h="16838"/>
      <w:pgMar w:top="-1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="708" w:footer="708" w:gutter="0"/>
      <w:cols w:space="708"/>
    </w:sectPr>
  </w:body>
</w:document>"#;

  #[test]
  fn test_from_str_reads_foreign_document() {
    let document = Document::from_str(FOREIGN_DOCUMENT).unwrap();

    let paragraphs: Vec<&Paragraph> = document.body.paragraphs().collect();
    assert_eq!(paragraphs.len(), 3);
    assert_eq!(paragraphs[0].style.as_deref(), Some("Title"));
    assert_eq!(paragraphs[0].text(), "Hello world");
    assert_eq!(paragraphs[0].runs().len(), 2);
    assert_eq!(paragraphs[1].text(), "after");
    assert_eq!(paragraphs[2].text(), "");

    assert_eq!(document.body.children.len(), 4);
    assert!(matches!(
      &document.body.children[1],
      BodyChild::Raw(markup) if markup.starts_with("<w:tbl>")
    ));

    let section_properties = document.body.section_properties.unwrap();
    assert_eq!(section_properties.page_width, 11906);
    assert_eq!(section_properties.page_height, 16838);
    assert_eq!(section_properties.margin_top, -1440);
    assert_eq!(section_properties.margin_header, 708);
    assert_eq!(
      section_properties.before_page,
      vec![r#"<w:headerReference w:type="default" r:id="rId7"/>"#.to_string()]
    );
    assert_eq!(
      section_properties.after_page,
      vec![r#"<w:cols w:space="708"/>"#.to_string()]
    );
  }

  #[test]
  fn test_unmodeled_markup_survives_round_trip() {
    let document = Document::from_str(FOREIGN_DOCUMENT).unwrap();

    let xml = document.to_xml().unwrap();

    for kept in [
      r#"xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing""#,
      r#"<w:background w:color="FFFFFF"/><w:body>"#,
      r#"<w:pPr><w:pStyle w:val="Title"/><w:jc w:val="center"/></w:pPr>"#,
      r#"<w:bookmarkStart w:id="0" w:name="_GoBack"/><w:r><w:rPr><w:b/></w:rPr><w:t>Hello</w:t></w:r>"#,
      r#"<w:hyperlink r:id="rId4"><w:r><w:t xml:space="preserve"> world</w:t></w:r></w:hyperlink><w:bookmarkEnd w:id="0"/>"#,
      r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
      r#"<w:drawing><wp:inline distT="0"/></w:drawing><w:br w:type="page"/><w:t>after</w:t>"#,
      r#"<w:sectPr><w:headerReference w:type="default" r:id="rId7"/><w:pgSz w:w="11906" w:h="16838"/>"#,
      r#"<w:cols w:space="708"/></w:sectPr>"#,
    ] {
      assert!(xml.contains(kept), "lost {kept}");
    }

    assert_eq!(Document::from_str(&xml).unwrap(), document);
  }

  #[test]
  fn test_empty_document() {
    let document = Document::from_str("<w:document><w:body/></w:document>").unwrap();

    assert_eq!(document, Document::default());
    assert!(document.to_xml().unwrap().ends_with("<w:body/></w:document>"));
  }

  #[test]
  fn test_truncated_document_fails() {
    let xml = "<w:document><w:body><w:p><w:r><w:t>cut";

    assert!(Document::from_str(xml).is_err());
  }
}
