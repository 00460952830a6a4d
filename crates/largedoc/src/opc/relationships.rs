use std::collections::HashSet;
use std::fmt::Write;

use crate::common::{
  attribute, expect_start, peek_event, required_attribute, skip_element, skip_to_end, write_attr,
  PeekedEvent, SdkError, XmlReader, XML_DECLARATION,
};

pub const RELATIONSHIPS_NAMESPACE: &str =
  "http://schemas.openxmlformats.org/package/2006/relationships";

pub const OFFICE_DOCUMENT_RELATIONSHIP_TYPE: &str =
  "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub const STYLES_RELATIONSHIP_TYPE: &str =
  "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
pub const CORE_PROPERTIES_RELATIONSHIP_TYPE: &str =
  "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
pub const EXTENDED_PROPERTIES_RELATIONSHIP_TYPE: &str =
  "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Relationships {
  pub relationship: Vec<Relationship>,
}

impl std::str::FromStr for Relationships {
  type Err = SdkError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let mut xml_reader = crate::common::from_str_inner(s)?;

    Self::deserialize_self(&mut xml_reader)
  }
}

impl Relationships {
  pub fn from_reader<R: std::io::BufRead>(reader: R) -> Result<Self, SdkError> {
    let mut xml_reader = crate::common::from_reader_inner(reader)?;

    Self::deserialize_self(&mut xml_reader)
  }

  pub fn deserialize_self<'de, R: XmlReader<'de>>(xml_reader: &mut R) -> Result<Self, SdkError> {
    let (_, empty_tag) = expect_start(xml_reader, "Relationships")?;

    let mut relationship = vec![];

    if !empty_tag {
      loop {
        match peek_event(xml_reader)? {
          PeekedEvent::Start(name) if name == b"Relationship" => {
            relationship.push(Relationship::deserialize_self(xml_reader)?);
          }
          PeekedEvent::Start(_) => skip_element(xml_reader)?,
          PeekedEvent::End => {
            xml_reader.next()?;
            break;
          }
          PeekedEvent::Eof => Err(SdkError::UnexpectedEof("Relationships".to_string()))?,
          PeekedEvent::Other => {
            xml_reader.next()?;
          }
        }
      }
    }

    Ok(Self { relationship })
  }

  pub fn find_by_type(&self, r#type: &str) -> Option<&Relationship> {
    self.relationship.iter().find(|r| r.r#type == r#type)
  }

  pub fn find_by_id(&self, id: &str) -> Option<&Relationship> {
    self.relationship.iter().find(|r| r.id == id)
  }

  /// Appends an internal relationship under the next free `rIdN` and returns
  /// that id. Past `rId4294967295` the lowest unused number is taken.
  pub fn push(&mut self, r#type: &str, target: &str) -> String {
    let used: HashSet<u32> = self
      .relationship
      .iter()
      .filter_map(|r| r.id.strip_prefix("rId")?.parse::<u32>().ok())
      .collect();

    let next = match used.iter().max() {
      None => 1,
      Some(max) => match max.checked_add(1) {
        Some(next) => next,
        None => (1..=u32::MAX).find(|n| !used.contains(n)).unwrap_or(0),
      },
    };

    let id = format!("rId{next}");

    self.relationship.push(Relationship {
      target_mode: None,
      target: target.to_string(),
      r#type: r#type.to_string(),
      id: id.clone(),
    });

    id
  }

  pub fn to_xml(&self) -> Result<String, SdkError> {
    let mut writer = String::new();

    writer.write_str(XML_DECLARATION)?;

    writer.write_str("<Relationships")?;
    write_attr(&mut writer, "xmlns", RELATIONSHIPS_NAMESPACE)?;
    writer.write_char('>')?;

    for child in &self.relationship {
      child.write_xml(&mut writer)?;
    }

    writer.write_str("</Relationships>")?;

    Ok(writer)
  }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Relationship {
  pub target_mode: Option<TargetMode>,
  pub target: String,
  pub r#type: String,
  pub id: String,
}

impl Relationship {
  pub fn deserialize_self<'de, R: XmlReader<'de>>(xml_reader: &mut R) -> Result<Self, SdkError> {
    let (e, empty_tag) = expect_start(xml_reader, "Relationship")?;

    let decoder = xml_reader.decoder();

    let target_mode = match attribute(&e, decoder, b"TargetMode")? {
      Some(v) => Some(v.parse()?),
      None => None,
    };

    let relationship = Self {
      target_mode,
      target: required_attribute(&e, decoder, b"Target")?,
      r#type: required_attribute(&e, decoder, b"Type")?,
      id: required_attribute(&e, decoder, b"Id")?,
    };

    if !empty_tag {
      skip_to_end(xml_reader, 1)?;
    }

    Ok(relationship)
  }

  pub fn is_external(&self) -> bool {
    matches!(self.target_mode, Some(TargetMode::External))
  }

  /// Package path of the target, relative to the directory of the source
  /// part (`""` for the package root).
  pub fn resolve_target(&self, source_dir: &str) -> String {
    if let Some(absolute) = self.target.strip_prefix('/') {
      crate::common::resolve_zip_file_path(absolute)
    } else {
      crate::common::resolve_zip_file_path(&format!("{source_dir}{}", self.target))
    }
  }

  pub fn write_xml(&self, writer: &mut String) -> Result<(), SdkError> {
    writer.write_str("<Relationship")?;

    write_attr(writer, "Id", &self.id)?;
    write_attr(writer, "Type", &self.r#type)?;
    write_attr(writer, "Target", &self.target)?;

    if let Some(target_mode) = &self.target_mode {
      write_attr(writer, "TargetMode", target_mode.as_str())?;
    }

    writer.write_str("/>")?;

    Ok(())
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetMode {
  External,
  Internal,
}

impl TargetMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::External => "External",
      Self::Internal => "Internal",
    }
  }
}

impl std::str::FromStr for TargetMode {
  type Err = SdkError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "External" => Ok(Self::External),
      "Internal" => Ok(Self::Internal),
      _ => Err(SdkError::CommonError(s.to_string())),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::str::FromStr;

  const XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
  <Relationship Id="rId9" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/?a=1&amp;b=2" TargetMode="External"/>
</Relationships>"#;

  #[test]
  fn test_from_str() {
    let relationships = Relationships::from_str(XML).unwrap();

    assert_eq!(relationships.relationship.len(), 4);

    let main = relationships
      .find_by_type(OFFICE_DOCUMENT_RELATIONSHIP_TYPE)
      .unwrap();
    assert_eq!(main.id, "rId1");
    assert_eq!(main.resolve_target(""), "word/document.xml");

    let link = relationships.find_by_id("rId9").unwrap();
    assert!(link.is_external());
    assert_eq!(link.target, "https://example.com/?a=1&b=2");
  }

  #[test]
  fn test_push_allocates_next_id() {
    let mut relationships = Relationships::from_str(XML).unwrap();

    assert_eq!(relationships.push(STYLES_RELATIONSHIP_TYPE, "styles.xml"), "rId10");

    let mut empty = Relationships::default();
    assert_eq!(empty.push(STYLES_RELATIONSHIP_TYPE, "styles.xml"), "rId1");
    assert_eq!(empty.push(STYLES_RELATIONSHIP_TYPE, "other.xml"), "rId2");
  }

  #[test]
  fn test_push_after_largest_id() {
    let mut relationships = Relationships::default();

    relationships.push("t", "max.xml");
    relationships.relationship[0].id = "rId4294967295".to_string();

    assert_eq!(relationships.push("t", "a.xml"), "rId1");
    assert_eq!(relationships.push("t", "b.xml"), "rId2");
    assert_eq!(relationships.relationship.len(), 3);
  }

  #[test]
  fn test_resolve_target() {
    let relationship = Relationship {
      target_mode: None,
      target: "../customXml/item1.xml".to_string(),
      r#type: "x".to_string(),
      id: "rId1".to_string(),
    };
    assert_eq!(relationship.resolve_target("word/"), "customXml/item1.xml");

    let absolute = Relationship {
      target: "/word/styles.xml".to_string(),
      ..relationship
    };
    assert_eq!(absolute.resolve_target("word/"), "word/styles.xml");
  }

  #[test]
  fn test_to_xml_reparses() {
    let relationships = Relationships::from_str(XML).unwrap();

    let xml = relationships.to_xml().unwrap();

    assert!(xml.contains(r#"Target="https://example.com/?a=1&amp;b=2" TargetMode="External""#));
    assert_eq!(Relationships::from_str(&xml).unwrap(), relationships);
  }

  #[test]
  fn test_bad_target_mode() {
    let xml = r#"<Relationships><Relationship Id="rId1" Type="t" Target="x" TargetMode="Sideways"/></Relationships>"#;

    assert!(Relationships::from_str(xml).is_err());
  }
}
