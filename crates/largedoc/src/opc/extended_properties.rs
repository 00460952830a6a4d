use std::fmt::Write;

use crate::common::{
  expect_start, peek_event, read_text, write_attr, write_text_element, PeekedEvent, SdkError,
  XmlReader, XML_DECLARATION,
};

pub const EXTENDED_PROPERTIES_PATH: &str = "docProps/app.xml";

const EXTENDED_PROPERTIES_NAMESPACE: &str =
  "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties";
const VT_NAMESPACE: &str =
  "http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes";

/// `docProps/app.xml`, limited to the application name and the document
/// statistics word processors show in their properties dialog.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtendedProperties {
  pub application: Option<String>,
  pub app_version: Option<String>,
  pub pages: Option<u32>,
  pub words: Option<u32>,
  pub characters: Option<u32>,
  pub characters_with_spaces: Option<u32>,
  pub paragraphs: Option<u32>,
}

impl std::str::FromStr for ExtendedProperties {
  type Err = SdkError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let mut xml_reader = crate::common::from_str_inner(s)?;

    Self::deserialize_self(&mut xml_reader)
  }
}

impl ExtendedProperties {
  pub fn from_reader<R: std::io::BufRead>(reader: R) -> Result<Self, SdkError> {
    let mut xml_reader = crate::common::from_reader_inner(reader)?;

    Self::deserialize_self(&mut xml_reader)
  }

  pub fn deserialize_self<'de, R: XmlReader<'de>>(xml_reader: &mut R) -> Result<Self, SdkError> {
    let (_, empty_tag) = expect_start(xml_reader, "Properties")?;

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

          match local_name.as_str() {
            "Application" => properties.application = Some(value),
            "AppVersion" => properties.app_version = Some(value),
            "Pages" => properties.pages = Some(value.trim().parse()?),
            "Words" => properties.words = Some(value.trim().parse()?),
            "Characters" => properties.characters = Some(value.trim().parse()?),
            "CharactersWithSpaces" => {
              properties.characters_with_spaces = Some(value.trim().parse()?)
            }
            "Paragraphs" => properties.paragraphs = Some(value.trim().parse()?),
            _ => {}
          }
        }
        PeekedEvent::End => {
          xml_reader.next()?;
          break;
        }
        PeekedEvent::Eof => Err(SdkError::UnexpectedEof("Properties".to_string()))?,
        PeekedEvent::Other => {
          xml_reader.next()?;
        }
      }
    }

    Ok(properties)
  }

  /// Recomputes the statistics from paragraph texts.
  pub fn update_statistics<'a, I: IntoIterator<Item = &'a str>>(&mut self, paragraphs: I) {
    let mut paragraph_count = 0u32;
    let mut words = 0u32;
    let mut characters = 0u32;
    let mut characters_with_spaces = 0u32;

    for text in paragraphs {
      paragraph_count = paragraph_count.saturating_add(1);

      for c in text.chars() {
        characters_with_spaces = characters_with_spaces.saturating_add(1);

        if !c.is_whitespace() {
          characters = characters.saturating_add(1);
        }
      }

      words = words.saturating_add(text.split_whitespace().count() as u32);
    }

    self.paragraphs = Some(paragraph_count);
    self.words = Some(words);
    self.characters = Some(characters);
    self.characters_with_spaces = Some(characters_with_spaces);
  }

  pub fn to_xml(&self) -> Result<String, SdkError> {
    let mut writer = String::new();

    writer.write_str(XML_DECLARATION)?;

    writer.write_str("<Properties")?;
    write_attr(&mut writer, "xmlns", EXTENDED_PROPERTIES_NAMESPACE)?;
    write_attr(&mut writer, "xmlns:vt", VT_NAMESPACE)?;
    writer.write_char('>')?;

    if let Some(application) = &self.application {
      write_text_element(&mut writer, "Application", application)?;
    }

    let counts = [
      ("Pages", self.pages),
      ("Words", self.words),
      ("Characters", self.characters),
      ("Paragraphs", self.paragraphs),
      ("CharactersWithSpaces", self.characters_with_spaces),
    ];

    for (name, value) in counts {
      if let Some(value) = value {
        write!(writer, "<{name}>{value}</{name}>")?;
      }
    }

    if let Some(app_version) = &self.app_version {
      write_text_element(&mut writer, "AppVersion", app_version)?;
    }

    writer.write_str("</Properties>")?;

    Ok(writer)
  }
}
