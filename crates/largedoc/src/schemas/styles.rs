use std::fmt::Write;

use crate::common::{
  attribute, expect_start, read_children, skip_to_end, write_attr, SdkError, XmlReader,
  XML_DECLARATION,
};

use super::wordprocessing::W_NAMESPACE;

/// Root of `word/styles.xml`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Styles {
  pub doc_defaults: Option<RunProperties>,
  pub styles: Vec<Style>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StyleType {
  Paragraph,
  Character,
  Table,
  Numbering,
}

impl StyleType {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Paragraph => "paragraph",
      Self::Character => "character",
      Self::Table => "table",
      Self::Numbering => "numbering",
    }
  }
}

impl std::str::FromStr for StyleType {
  type Err = SdkError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "paragraph" => Ok(Self::Paragraph),
      "character" => Ok(Self::Character),
      "table" => Ok(Self::Table),
      "numbering" => Ok(Self::Numbering),
      _ => Err(SdkError::CommonError(s.to_string())),
    }
  }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Style {
  pub style_type: StyleType,
  pub style_id: String,
  pub name: Option<String>,
  pub based_on: Option<String>,
  pub next: Option<String>,
  pub is_default: bool,
  pub run_properties: Option<RunProperties>,
}

/// The subset of `<w:rPr>` styles here care about. Sizes are in half-points.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunProperties {
  pub font: Option<String>,
  pub bold: bool,
  pub size: Option<u32>,
}

impl std::str::FromStr for Styles {
  type Err = SdkError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let mut xml_reader = crate::common::from_str_inner(s)?;

    Self::deserialize_self(&mut xml_reader)
  }
}

impl Styles {
  /// `Normal`, `Heading1`, `Title` and the default character style, on an
  /// 11pt Calibri base.
  pub fn default_set() -> Self {
    let paragraph = |style_id: &str, name: &str, size: Option<u32>, bold: bool| Style {
      style_type: StyleType::Paragraph,
      style_id: style_id.to_string(),
      name: Some(name.to_string()),
      based_on: Some("Normal".to_string()),
      next: Some("Normal".to_string()),
      is_default: false,
      run_properties: Some(RunProperties {
        font: None,
        bold,
        size,
      }),
    };

    Self {
      doc_defaults: Some(RunProperties {
        font: Some("Calibri".to_string()),
        bold: false,
        size: Some(22),
      }),
      styles: vec![
        Style {
          style_type: StyleType::Paragraph,
          style_id: "Normal".to_string(),
          name: Some("Normal".to_string()),
          based_on: None,
          next: None,
          is_default: true,
          run_properties: None,
        },
        Style {
          style_type: StyleType::Character,
          style_id: "DefaultParagraphFont".to_string(),
          name: Some("Default Paragraph Font".to_string()),
          based_on: None,
          next: None,
          is_default: true,
          run_properties: None,
        },
        paragraph("Heading1", "heading 1", Some(28), true),
        paragraph("Title", "Title", Some(56), false),
      ],
    }
  }

  pub fn find(&self, style_id: &str) -> Option<&Style> {
    self.styles.iter().find(|s| s.style_id == style_id)
  }

  pub fn from_reader<R: std::io::BufRead>(reader: R) -> Result<Self, SdkError> {
    let mut xml_reader = crate::common::from_reader_inner(reader)?;

    Self::deserialize_self(&mut xml_reader)
  }

  pub fn deserialize_self<'de, R: XmlReader<'de>>(xml_reader: &mut R) -> Result<Self, SdkError> {
    let (_, empty_tag) = expect_start(xml_reader, "styles")?;

    let mut styles = Self::default();

    if empty_tag {
      return Ok(styles);
    }

    read_children(xml_reader, "styles", |xml_reader, name| {
      match name {
        b"docDefaults" => styles.doc_defaults = read_doc_defaults(xml_reader)?,
        b"style" => styles.styles.push(Style::deserialize_self(xml_reader)?),
        _ => return Ok(false),
      }

      Ok(true)
    })?;

    Ok(styles)
  }

  pub fn to_xml(&self) -> Result<String, SdkError> {
    let mut writer = String::new();

    writer.write_str(XML_DECLARATION)?;

    writer.write_str("<w:styles")?;
    write_attr(&mut writer, "xmlns:w", W_NAMESPACE)?;
    writer.write_char('>')?;

    if let Some(doc_defaults) = &self.doc_defaults {
      writer.write_str("<w:docDefaults><w:rPrDefault>")?;
      doc_defaults.write_xml(&mut writer)?;
      writer.write_str("</w:rPrDefault></w:docDefaults>")?;
    }

    for style in &self.styles {
      style.write_xml(&mut writer)?;
    }

    writer.write_str("</w:styles>")?;

    Ok(writer)
  }
}

fn read_doc_defaults<'de, R: XmlReader<'de>>(
  xml_reader: &mut R,
) -> Result<Option<RunProperties>, SdkError> {
  let (_, empty_tag) = expect_start(xml_reader, "docDefaults")?;

  let mut run_properties = None;

  if !empty_tag {
    read_children(xml_reader, "docDefaults", |xml_reader, name| {
      if name != b"rPrDefault" {
        return Ok(false);
      }

      let (_, empty_tag) = expect_start(xml_reader, "rPrDefault")?;

      if !empty_tag {
        read_children(xml_reader, "rPrDefault", |xml_reader, name| {
          if name != b"rPr" {
            return Ok(false);
          }

          run_properties = Some(RunProperties::deserialize_self(xml_reader)?);

          Ok(true)
        })?;
      }

      Ok(true)
    })?;
  }

  Ok(run_properties)
}

/// Value of a `w:val` attribute on a child such as `<w:basedOn w:val=".."/>`.
fn read_val<'de, R: XmlReader<'de>>(
  xml_reader: &mut R,
  local_name: &str,
) -> Result<Option<String>, SdkError> {
  let (e, empty_tag) = expect_start(xml_reader, local_name)?;

  let value = attribute(&e, xml_reader.decoder(), b"val")?;

  if !empty_tag {
    skip_to_end(xml_reader, 1)?;
  }

  Ok(value)
}

impl Style {
  pub fn deserialize_self<'de, R: XmlReader<'de>>(xml_reader: &mut R) -> Result<Self, SdkError> {
    let (e, empty_tag) = expect_start(xml_reader, "style")?;

    let decoder = xml_reader.decoder();

    let style_type = match attribute(&e, decoder, b"type")? {
      Some(v) => v.parse()?,
      None => StyleType::Paragraph,
    };

    let is_default = matches!(
      attribute(&e, decoder, b"default")?.as_deref(),
      Some("1" | "true" | "on")
    );

    let mut style = Self {
      style_type,
      style_id: attribute(&e, decoder, b"styleId")?.unwrap_or_default(),
      name: None,
      based_on: None,
      next: None,
      is_default,
      run_properties: None,
    };

    if !empty_tag {
      read_children(xml_reader, "style", |xml_reader, name| {
        match name {
          b"name" => style.name = read_val(xml_reader, "name")?,
          b"basedOn" => style.based_on = read_val(xml_reader, "basedOn")?,
          b"next" => style.next = read_val(xml_reader, "next")?,
          b"rPr" => style.run_properties = Some(RunProperties::deserialize_self(xml_reader)?),
          _ => return Ok(false),
        }

        Ok(true)
      })?;
    }

    Ok(style)
  }

  pub fn write_xml(&self, writer: &mut String) -> Result<(), SdkError> {
    writer.write_str("<w:style")?;
    write_attr(writer, "w:type", self.style_type.as_str())?;

    if self.is_default {
      write_attr(writer, "w:default", "1")?;
    }

    write_attr(writer, "w:styleId", &self.style_id)?;
    writer.write_char('>')?;

    let children = [
      ("w:name", &self.name),
      ("w:basedOn", &self.based_on),
      ("w:next", &self.next),
    ];

    for (element, value) in children {
      if let Some(value) = value {
        writer.write_char('<')?;
        writer.write_str(element)?;
        write_attr(writer, "w:val", value)?;
        writer.write_str("/>")?;
      }
    }

    if let Some(run_properties) = &self.run_properties {
      run_properties.write_xml(writer)?;
    }

    writer.write_str("</w:style>")?;

    Ok(())
  }
}

impl RunProperties {
  pub fn deserialize_self<'de, R: XmlReader<'de>>(xml_reader: &mut R) -> Result<Self, SdkError> {
    let (_, empty_tag) = expect_start(xml_reader, "rPr")?;

    let mut run_properties = Self::default();

    if empty_tag {
      return Ok(run_properties);
    }

    read_children(xml_reader, "rPr", |xml_reader, name| {
      let local_name = match name {
        b"rFonts" => "rFonts",
        b"b" => "b",
        b"sz" => "sz",
        _ => return Ok(false),
      };

      let (e, empty_tag) = expect_start(xml_reader, local_name)?;

      let decoder = xml_reader.decoder();

      match local_name {
        "rFonts" => run_properties.font = attribute(&e, decoder, b"ascii")?,
        "b" => {
          run_properties.bold = !matches!(
            attribute(&e, decoder, b"val")?.as_deref(),
            Some("0" | "false" | "off")
          )
        }
        _ => {
          run_properties.size = match attribute(&e, decoder, b"val")? {
            Some(v) => Some(v.parse()?),
            None => None,
          }
        }
      }

      if !empty_tag {
        skip_to_end(xml_reader, 1)?;
      }

      Ok(true)
    })?;

    Ok(run_properties)
  }

  pub fn write_xml(&self, writer: &mut String) -> Result<(), SdkError> {
    writer.write_str("<w:rPr>")?;

    if let Some(font) = &self.font {
      writer.write_str("<w:rFonts")?;
      write_attr(writer, "w:ascii", font)?;
      write_attr(writer, "w:hAnsi", font)?;
      write_attr(writer, "w:cs", font)?;
      writer.write_str("/>")?;
    }

    if self.bold {
      writer.write_str("<w:b/>")?;
    }

    if let Some(size) = self.size {
      write!(writer, r#"<w:sz w:val="{size}"/>"#)?;
    }

    writer.write_str("</w:rPr>")?;

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::str::FromStr;

  #[test]
  fn test_default_set_round_trip() {
    let styles = Styles::default_set();

    let xml = styles.to_xml().unwrap();

    assert!(xml.contains(r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal">"#));
    assert_eq!(Styles::from_str(&xml).unwrap(), styles);
  }

  #[test]
  fn test_from_str() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:docDefaults>
    <w:rPrDefault><w:rPr><w:rFonts w:asciiTheme="minorHAnsi" w:ascii="Cambria"/><w:sz w:val="24"/><w:lang w:val="en-US"/></w:rPr></w:rPrDefault>
    <w:pPrDefault/>
  </w:docDefaults>
  <w:latentStyles w:defLockedState="0"><w:lsdException w:name="Normal"/></w:latentStyles>
  <w:style w:type="paragraph" w:styleId="Heading1">
    <w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:uiPriority w:val="9"/>
    <w:rPr><w:b w:val="0"/><w:sz w:val="32"/></w:rPr>
  </w:style>
  <w:style w:type="character" w:default="1" w:styleId="DefaultParagraphFont"><w:name w:val="Default Paragraph Font"/></w:style>
</w:styles>"#;

    let styles = Styles::from_str(xml).unwrap();

    let doc_defaults = styles.doc_defaults.as_ref().unwrap();
    assert_eq!(doc_defaults.font.as_deref(), Some("Cambria"));
    assert_eq!(doc_defaults.size, Some(24));

    let heading = styles.find("Heading1").unwrap();
    assert_eq!(heading.name.as_deref(), Some("heading 1"));
    assert_eq!(heading.based_on.as_deref(), Some("Normal"));
    assert!(!heading.is_default);
    assert_eq!(
      heading.run_properties,
      Some(RunProperties {
        font: None,
        bold: false,
        size: Some(32),
      })
    );

    let character = styles.find("DefaultParagraphFont").unwrap();
    assert_eq!(character.style_type, StyleType::Character);
    assert!(character.is_default);
  }

  #[test]
  fn test_unknown_style_type() {
    let xml = r#"<w:styles><w:style w:type="frame" w:styleId="X"/></w:styles>"#;

    assert!(Styles::from_str(xml).is_err());
  }
}
