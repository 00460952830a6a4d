use std::fmt::Write;

use crate::common::{
  expect_start, peek_event, required_attribute, skip_element, skip_to_end, PeekedEvent, SdkError,
  XmlReader, XML_DECLARATION,
};

pub const CONTENT_TYPES_NAMESPACE: &str =
  "http://schemas.openxmlformats.org/package/2006/content-types";

pub const CONTENT_TYPES_PATH: &str = "[Content_Types].xml";

pub const RELATIONSHIPS_CONTENT_TYPE: &str =
  "application/vnd.openxmlformats-package.relationships+xml";
pub const XML_CONTENT_TYPE: &str = "application/xml";
pub const MAIN_DOCUMENT_CONTENT_TYPE: &str =
  "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
pub const STYLES_CONTENT_TYPE: &str =
  "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";
pub const CORE_PROPERTIES_CONTENT_TYPE: &str =
  "application/vnd.openxmlformats-package.core-properties+xml";
pub const EXTENDED_PROPERTIES_CONTENT_TYPE: &str =
  "application/vnd.openxmlformats-officedocument.extended-properties+xml";

/// The `[Content_Types].xml` stream of a package.
#[derive(Clone, Debug, PartialEq)]
pub struct ContentTypes {
  pub children: Vec<ContentTypesChildChoice>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ContentTypesChildChoice {
  Default(Default),
  Override(Override),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Default {
  pub extension: String,
  pub content_type: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Override {
  pub part_name: String,
  pub content_type: String,
}

impl std::str::FromStr for ContentTypes {
  type Err = SdkError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let mut xml_reader = crate::common::from_str_inner(s)?;

    Self::deserialize_self(&mut xml_reader)
  }
}

impl ContentTypes {
  /// Content types of a freshly created wordprocessing package.
  pub fn wordprocessing() -> Self {
    let mut content_types = Self {
      children: vec![
        ContentTypesChildChoice::Default(Default {
          extension: "rels".to_string(),
          content_type: RELATIONSHIPS_CONTENT_TYPE.to_string(),
        }),
        ContentTypesChildChoice::Default(Default {
          extension: "xml".to_string(),
          content_type: XML_CONTENT_TYPE.to_string(),
        }),
      ],
    };

    content_types.set_override("/word/document.xml", MAIN_DOCUMENT_CONTENT_TYPE);

    content_types
  }

  pub fn from_reader<R: std::io::BufRead>(reader: R) -> Result<Self, SdkError> {
    let mut xml_reader = crate::common::from_reader_inner(reader)?;

    Self::deserialize_self(&mut xml_reader)
  }

  pub fn deserialize_self<'de, R: XmlReader<'de>>(xml_reader: &mut R) -> Result<Self, SdkError> {
    let (_, empty_tag) = expect_start(xml_reader, "Types")?;

    let mut children = vec![];

    if empty_tag {
      return Ok(Self { children });
    }

    loop {
      match peek_event(xml_reader)? {
        PeekedEvent::Start(name) => match name.as_slice() {
          b"Default" => {
            let (e, empty_tag) = expect_start(xml_reader, "Default")?;

            children.push(ContentTypesChildChoice::Default(Default {
              extension: required_attribute(&e, xml_reader.decoder(), b"Extension")?,
              content_type: required_attribute(&e, xml_reader.decoder(), b"ContentType")?,
            }));

            if !empty_tag {
              skip_to_end(xml_reader, 1)?;
            }
          }
          b"Override" => {
            let (e, empty_tag) = expect_start(xml_reader, "Override")?;

            children.push(ContentTypesChildChoice::Override(Override {
              part_name: required_attribute(&e, xml_reader.decoder(), b"PartName")?,
              content_type: required_attribute(&e, xml_reader.decoder(), b"ContentType")?,
            }));

            if !empty_tag {
              skip_to_end(xml_reader, 1)?;
            }
          }
          _ => skip_element(xml_reader)?,
        },
        PeekedEvent::End => {
          xml_reader.next()?;
          break;
        }
        PeekedEvent::Eof => Err(SdkError::UnexpectedEof("Types".to_string()))?,
        PeekedEvent::Other => {
          xml_reader.next()?;
        }
      }
    }

    Ok(Self { children })
  }

  /// Content type of a part: an override wins over the extension default.
  pub fn content_type_for(&self, part_name: &str) -> Option<&str> {
    let part_name = normalize_part_name(part_name);

    let overridden = self.children.iter().find_map(|child| match child {
      ContentTypesChildChoice::Override(o)
        if o.part_name.eq_ignore_ascii_case(&part_name) =>
      {
        Some(o.content_type.as_str())
      }
      _ => None,
    });

    if overridden.is_some() {
      return overridden;
    }

    let extension = part_name.rsplit_once('.').map(|(_, ext)| ext)?;

    self.children.iter().find_map(|child| match child {
      ContentTypesChildChoice::Default(d) if d.extension.eq_ignore_ascii_case(extension) => {
        Some(d.content_type.as_str())
      }
      _ => None,
    })
  }

  /// Adds or replaces the override for `part_name`.
  pub fn set_override(&mut self, part_name: &str, content_type: &str) {
    let part_name = normalize_part_name(part_name);

    for child in self.children.iter_mut() {
      if let ContentTypesChildChoice::Override(o) = child {
        if o.part_name.eq_ignore_ascii_case(&part_name) {
          o.content_type = content_type.to_string();
          return;
        }
      }
    }

    self
      .children
      .push(ContentTypesChildChoice::Override(Override {
        part_name,
        content_type: content_type.to_string(),
      }));
  }

  pub fn to_xml(&self) -> Result<String, SdkError> {
    let mut writer = String::with_capacity(256 + self.children.len() * 160);

    writer.write_str(XML_DECLARATION)?;

    writer.write_str(r#"<Types xmlns=""#)?;
    writer.write_str(CONTENT_TYPES_NAMESPACE)?;
    writer.write_str("\">")?;

    for child in &self.children {
      match child {
        ContentTypesChildChoice::Default(d) => {
          writer.write_str("<Default")?;
          crate::common::write_attr(&mut writer, "Extension", &d.extension)?;
          crate::common::write_attr(&mut writer, "ContentType", &d.content_type)?;
          writer.write_str("/>")?;
        }
        ContentTypesChildChoice::Override(o) => {
          writer.write_str("<Override")?;
          crate::common::write_attr(&mut writer, "PartName", &o.part_name)?;
          crate::common::write_attr(&mut writer, "ContentType", &o.content_type)?;
          writer.write_str("/>")?;
        }
      }
    }

    writer.write_str("</Types>")?;

    Ok(writer)
  }
}

impl std::fmt::Display for ContentTypes {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.to_xml().map_err(|_| std::fmt::Error)?)
  }
}

/// Part names in `[Content_Types].xml` are absolute: `/word/document.xml`.
pub fn normalize_part_name(part_name: &str) -> String {
  format!("/{}", crate::common::resolve_zip_file_path(part_name))
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::str::FromStr;

  const XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="jpeg" ContentType="image/jpeg"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#;

  #[test]
  fn test_from_str() {
    let content_types = ContentTypes::from_str(XML).unwrap();

    assert_eq!(content_types.children.len(), 5);
    assert_eq!(
      content_types.content_type_for("word/document.xml"),
      Some(MAIN_DOCUMENT_CONTENT_TYPE)
    );
    assert_eq!(
      content_types.content_type_for("/docProps/core.xml"),
      Some(CORE_PROPERTIES_CONTENT_TYPE)
    );
    assert_eq!(
      content_types.content_type_for("word/styles.xml"),
      Some(XML_CONTENT_TYPE)
    );
    assert_eq!(
      content_types.content_type_for("word/media/image1.JPEG"),
      Some("image/jpeg")
    );
    assert_eq!(content_types.content_type_for("word/media/image1.png"), None);
  }

  #[test]
  fn test_set_override_replaces() {
    let mut content_types = ContentTypes::wordprocessing();

    content_types.set_override("word/styles.xml", XML_CONTENT_TYPE);
    content_types.set_override("/word/styles.xml", STYLES_CONTENT_TYPE);

    let overrides = content_types
      .children
      .iter()
      .filter(|child| matches!(child, ContentTypesChildChoice::Override(_)))
      .count();

    assert_eq!(overrides, 2);
    assert_eq!(
      content_types.content_type_for("word/styles.xml"),
      Some(STYLES_CONTENT_TYPE)
    );
    assert!(content_types.children.iter().any(
      |child| matches!(child, ContentTypesChildChoice::Default(d) if d.extension == "rels")
    ));
  }

  #[test]
  fn test_to_xml_reparses() {
    let content_types = ContentTypes::wordprocessing();

    let xml = content_types.to_xml().unwrap();

    assert!(xml.starts_with("<?xml"));
    assert!(xml.contains(r#"<Override PartName="/word/document.xml""#));
    assert_eq!(ContentTypes::from_str(&xml).unwrap(), content_types);
  }
}
