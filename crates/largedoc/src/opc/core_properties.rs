use std::fmt::Write;

use crate::common::{
  escape_checked, expect_start, peek_event, read_text, write_attr, write_text_element,
  PeekedEvent, SdkError, XmlReader, XML_DECLARATION,
};

pub const CORE_PROPERTIES_PATH: &str = "docProps/core.xml";

const CP_NAMESPACE: &str =
  "http://schemas.openxmlformats.org/package/2006/metadata/core-properties";
const DC_NAMESPACE: &str = "http://purl.org/dc/elements/1.1/";
const DCTERMS_NAMESPACE: &str = "http://purl.org/dc/terms/";
const DCMITYPE_NAMESPACE: &str = "http://purl.org/dc/dcmitype/";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// `docProps/core.xml`. Dates are kept as the W3CDTF strings found in the
/// package.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CoreProperties {
  pub title: Option<String>,
  pub subject: Option<String>,
  pub creator: Option<String>,
  pub keywords: Option<String>,
  pub description: Option<String>,
  pub last_modified_by: Option<String>,
  pub revision: Option<String>,
  pub category: Option<String>,
  pub created: Option<String>,
  pub modified: Option<String>,
}

impl std::str::FromStr for CoreProperties {
  type Err = SdkError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let mut xml_reader = crate::common::from_str_inner(s)?;

    Self::deserialize_self(&mut xml_reader)
  }
}

impl CoreProperties {
  pub fn from_reader<R: std::io::BufRead>(reader: R) -> Result<Self, SdkError> {
    let mut xml_reader = crate::common::from_reader_inner(reader)?;

    Self::deserialize_self(&mut xml_reader)
  }

  pub fn deserialize_self<'de, R: XmlReader<'de>>(xml_reader: &mut R) -> Result<Self, SdkError> {
    let (_, empty_tag) = expect_start(xml_reader, "coreProperties")?;

    let mut properties = Self::default();

    if empty_tag {
      return Ok(properties);
    }

    loop {
      match peek_event(xml_reader)? {
        PeekedEvent::Start(name) => {
          let local_name = String::from_utf8_lossy(&name).into_owned();

          let (_, empty_tag) = expect_start(xml_reader, &local_name)?;

          let value = read_text(xml_reader, empty_tag)?;

          let slot = match local_name.as_str() {
            "title" => &mut properties.title,
            "subject" => &mut properties.subject,
            "creator" => &mut properties.creator,
            "keywords" => &mut properties.keywords,
            "description" => &mut properties.description,
            "lastModifiedBy" => &mut properties.last_modified_by,
            "revision" => &mut properties.revision,
            "category" => &mut properties.category,
            "created" => &mut properties.created,
            "modified" => &mut properties.modified,
            _ => continue,
          };

          *slot = Some(value);
        }
        PeekedEvent::End => {
          xml_reader.next()?;
          break;
        }
        PeekedEvent::Eof => Err(SdkError::UnexpectedEof("coreProperties".to_string()))?,
        PeekedEvent::Other => {
          xml_reader.next()?;
        }
      }
    }

    Ok(properties)
  }

  pub fn to_xml(&self) -> Result<String, SdkError> {
    let mut writer = String::new();

    writer.write_str(XML_DECLARATION)?;

    writer.write_str("<cp:coreProperties")?;
    write_attr(&mut writer, "xmlns:cp", CP_NAMESPACE)?;
    write_attr(&mut writer, "xmlns:dc", DC_NAMESPACE)?;
    write_attr(&mut writer, "xmlns:dcterms", DCTERMS_NAMESPACE)?;
    write_attr(&mut writer, "xmlns:dcmitype", DCMITYPE_NAMESPACE)?;
    write_attr(&mut writer, "xmlns:xsi", XSI_NAMESPACE)?;
    writer.write_char('>')?;

    let plain = [
      ("dc:title", &self.title),
      ("dc:subject", &self.subject),
      ("dc:creator", &self.creator),
      ("cp:keywords", &self.keywords),
      ("dc:description", &self.description),
      ("cp:lastModifiedBy", &self.last_modified_by),
      ("cp:revision", &self.revision),
      ("cp:category", &self.category),
    ];

    for (name, value) in plain {
      if let Some(value) = value {
        write_text_element(&mut writer, name, value)?;
      }
    }

    for (name, value) in [("dcterms:created", &self.created), ("dcterms:modified", &self.modified)] {
      if let Some(value) = value {
        writer.write_char('<')?;
        writer.write_str(name)?;
        writer.write_str(r#" xsi:type="dcterms:W3CDTF">"#)?;
        writer.write_str(&escape_checked(value)?)?;
        writer.write_str("</")?;
        writer.write_str(name)?;
        writer.write_char('>')?;
      }
    }

    writer.write_str("</cp:coreProperties>")?;

    Ok(writer)
  }
}
