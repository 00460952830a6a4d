use std::collections::HashSet;
use std::io::{Read, Seek, Write};

use crate::common::{parent_dir, rels_path_for, SdkError};
use crate::opc::content_types::{
  ContentTypes, CONTENT_TYPES_PATH, CORE_PROPERTIES_CONTENT_TYPE, EXTENDED_PROPERTIES_CONTENT_TYPE,
  STYLES_CONTENT_TYPE,
};
use crate::opc::core_properties::CORE_PROPERTIES_PATH;
use crate::opc::extended_properties::EXTENDED_PROPERTIES_PATH;
use crate::opc::relationships::{
  Relationships, CORE_PROPERTIES_RELATIONSHIP_TYPE, EXTENDED_PROPERTIES_RELATIONSHIP_TYPE,
  OFFICE_DOCUMENT_RELATIONSHIP_TYPE, STYLES_RELATIONSHIP_TYPE,
};
use crate::opc::{CoreProperties, ExtendedProperties};
use crate::schemas::{Body, Document, Paragraph, SectionProperties, Styles};

const PACKAGE_RELS_PATH: &str = "_rels/.rels";
const MAIN_DOCUMENT_PATH: &str = "word/document.xml";
const APPLICATION_NAME: &str = "largedoc";

/// A `.docx` package.
///
/// Parts this crate models are parsed; every other entry of an opened package
/// is carried through [`RawPart`] and written back unchanged.
#[derive(Clone, Debug)]
pub struct WordprocessingDocument {
  pub content_types: ContentTypes,
  pub relationships: Relationships,
  pub main_document_part: MainDocumentPart,
  pub core_file_properties_part: Option<CoreFilePropertiesPart>,
  pub extended_file_properties_part: Option<ExtendedFilePropertiesPart>,
  pub raw_parts: Vec<RawPart>,
}

#[derive(Clone, Debug)]
pub struct MainDocumentPart {
  pub r_id: String,
  pub inner_path: String,
  pub rels_path: String,
  pub relationships: Option<Relationships>,
  pub root_element: Document,
  pub style_definitions_part: Option<StyleDefinitionsPart>,
}

#[derive(Clone, Debug)]
pub struct StyleDefinitionsPart {
  pub r_id: String,
  pub inner_path: String,
  pub root_element: Styles,
}

#[derive(Clone, Debug)]
pub struct CoreFilePropertiesPart {
  pub r_id: String,
  pub inner_path: String,
  pub root_element: CoreProperties,
}

#[derive(Clone, Debug)]
pub struct ExtendedFilePropertiesPart {
  pub r_id: String,
  pub inner_path: String,
  pub root_element: ExtendedProperties,
}

#[derive(Clone, Debug)]
pub struct RawPart {
  pub inner_path: String,
  pub part_content: Vec<u8>,
}

fn read_entry<R: Read + Seek>(
  archive: &mut zip::ZipArchive<R>,
  path: &str,
) -> Result<Vec<u8>, SdkError> {
  let mut zip_entry = archive.by_name(path)?;

  let mut part_content = Vec::with_capacity(zip_entry.size() as usize);

  zip_entry.read_to_end(&mut part_content)?;

  Ok(part_content)
}

fn write_entry<W: Write + Seek>(
  zip: &mut zip::ZipWriter<W>,
  entry_set: &mut HashSet<String>,
  path: &str,
  content: &[u8],
) -> Result<(), SdkError> {
  if entry_set.contains(path) {
    return Ok(());
  }

  let options = zip::write::SimpleFileOptions::default()
    .compression_method(zip::CompressionMethod::Deflated)
    .unix_permissions(0o644);

  zip.start_file(path, options)?;

  zip.write_all(content)?;

  tracing::debug!(path, bytes = content.len(), "wrote part");

  entry_set.insert(path.to_string());

  Ok(())
}

impl WordprocessingDocument {
  /// An empty document: one main part with an empty body, default styles,
  /// core and extended properties.
  pub fn create() -> Self {
    let mut content_types = ContentTypes::wordprocessing();

    let mut relationships = Relationships::default();

    let main_r_id = relationships.push(OFFICE_DOCUMENT_RELATIONSHIP_TYPE, MAIN_DOCUMENT_PATH);
    let core_r_id = relationships.push(CORE_PROPERTIES_RELATIONSHIP_TYPE, CORE_PROPERTIES_PATH);
    let extended_r_id =
      relationships.push(EXTENDED_PROPERTIES_RELATIONSHIP_TYPE, EXTENDED_PROPERTIES_PATH);

    content_types.set_override(CORE_PROPERTIES_PATH, CORE_PROPERTIES_CONTENT_TYPE);
    content_types.set_override(EXTENDED_PROPERTIES_PATH, EXTENDED_PROPERTIES_CONTENT_TYPE);
    content_types.set_override("word/styles.xml", STYLES_CONTENT_TYPE);

    let mut main_relationships = Relationships::default();

    let styles_r_id = main_relationships.push(STYLES_RELATIONSHIP_TYPE, "styles.xml");

    Self {
      content_types,
      relationships,
      main_document_part: MainDocumentPart {
        r_id: main_r_id,
        inner_path: MAIN_DOCUMENT_PATH.to_string(),
        rels_path: rels_path_for(MAIN_DOCUMENT_PATH),
        relationships: Some(main_relationships),
        root_element: Document {
          body: Body {
            children: vec![],
            section_properties: Some(SectionProperties::default()),
          },
          ..Default::default()
        },
        style_definitions_part: Some(StyleDefinitionsPart {
          r_id: styles_r_id,
          inner_path: "word/styles.xml".to_string(),
          root_element: Styles::default_set(),
        }),
      },
      core_file_properties_part: Some(CoreFilePropertiesPart {
        r_id: core_r_id,
        inner_path: CORE_PROPERTIES_PATH.to_string(),
        root_element: CoreProperties {
          creator: Some(APPLICATION_NAME.to_string()),
          last_modified_by: Some(APPLICATION_NAME.to_string()),
          revision: Some("1".to_string()),
          ..Default::default()
        },
      }),
      extended_file_properties_part: Some(ExtendedFilePropertiesPart {
        r_id: extended_r_id,
        inner_path: EXTENDED_PROPERTIES_PATH.to_string(),
        root_element: ExtendedProperties {
          application: Some(APPLICATION_NAME.to_string()),
          ..Default::default()
        },
      }),
      raw_parts: vec![],
    }
  }

  pub fn new<R: Read + Seek>(reader: R) -> Result<Self, SdkError> {
    let mut archive = zip::ZipArchive::new(reader)?;

    let mut file_paths: Vec<String> = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
      let file = archive.by_index(i)?;

      if !file.is_dir() {
        file_paths.push(file.name().to_string());
      }
    }

    let file_path_set: HashSet<&str> = file_paths.iter().map(String::as_str).collect();

    let mut loaded: HashSet<String> = HashSet::new();

    if !file_path_set.contains(CONTENT_TYPES_PATH) {
      return Err(SdkError::MissingPart(CONTENT_TYPES_PATH.to_string()));
    }

    if !file_path_set.contains(PACKAGE_RELS_PATH) {
      return Err(SdkError::MissingPart(PACKAGE_RELS_PATH.to_string()));
    }

    let content_types =
      ContentTypes::from_reader(read_entry(&mut archive, CONTENT_TYPES_PATH)?.as_slice())?;
    loaded.insert(CONTENT_TYPES_PATH.to_string());

    let relationships =
      Relationships::from_reader(read_entry(&mut archive, PACKAGE_RELS_PATH)?.as_slice())?;
    loaded.insert(PACKAGE_RELS_PATH.to_string());

    let main_relationship = relationships
      .find_by_type(OFFICE_DOCUMENT_RELATIONSHIP_TYPE)
      .ok_or_else(|| SdkError::MissingPart("officeDocument".to_string()))?;

    let main_document_part = MainDocumentPart::new_from_archive(
      &main_relationship.resolve_target(""),
      &main_relationship.id,
      &file_path_set,
      &mut archive,
      &mut loaded,
    )?;

    let mut core_file_properties_part = None;

    if let Some(rel) = relationships.find_by_type(CORE_PROPERTIES_RELATIONSHIP_TYPE) {
      let inner_path = rel.resolve_target("");

      if file_path_set.contains(inner_path.as_str()) {
        let root_element =
          CoreProperties::from_reader(read_entry(&mut archive, &inner_path)?.as_slice())?;

        loaded.insert(inner_path.clone());

        core_file_properties_part = Some(CoreFilePropertiesPart {
          r_id: rel.id.clone(),
          inner_path,
          root_element,
        });
      }
    }

    let mut extended_file_properties_part = None;

    if let Some(rel) = relationships.find_by_type(EXTENDED_PROPERTIES_RELATIONSHIP_TYPE) {
      let inner_path = rel.resolve_target("");

      if file_path_set.contains(inner_path.as_str()) {
        let root_element =
          ExtendedProperties::from_reader(read_entry(&mut archive, &inner_path)?.as_slice())?;

        loaded.insert(inner_path.clone());

        extended_file_properties_part = Some(ExtendedFilePropertiesPart {
          r_id: rel.id.clone(),
          inner_path,
          root_element,
        });
      }
    }

    let mut raw_parts = vec![];

    for path in &file_paths {
      if !loaded.contains(path) {
        raw_parts.push(RawPart {
          inner_path: path.clone(),
          part_content: read_entry(&mut archive, path)?,
        });
      }
    }

    Ok(Self {
      content_types,
      relationships,
      main_document_part,
      core_file_properties_part,
      extended_file_properties_part,
      raw_parts,
    })
  }

  pub fn new_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, SdkError> {
    Self::new(std::io::BufReader::new(std::fs::File::open(path)?))
  }

  /// Paragraphs directly under the body; tables and other kept blocks are
  /// not included.
  pub fn paragraphs(&self) -> Vec<&Paragraph> {
    self.main_document_part.root_element.body.paragraphs().collect()
  }

  /// Appends a paragraph after the existing body content. Section properties
  /// stay last.
  pub fn add_paragraph(&mut self, text: &str) -> &mut Paragraph {
    self
      .main_document_part
      .root_element
      .body
      .push_paragraph(Paragraph::new(text))
  }

  pub fn add_paragraph_with_style(&mut self, text: &str, style: &str) -> &mut Paragraph {
    let paragraph = self.add_paragraph(text);

    paragraph.style = Some(style.to_string());

    paragraph
  }

  pub fn styles(&self) -> Option<&Styles> {
    self
      .main_document_part
      .style_definitions_part
      .as_ref()
      .map(|part| &part.root_element)
  }

  pub fn core_properties(&self) -> Option<&CoreProperties> {
    self
      .core_file_properties_part
      .as_ref()
      .map(|part| &part.root_element)
  }

  /// Core properties, adding an empty core properties part first if the
  /// package has none. A core properties relationship already present is
  /// reused, since a package may hold only one.
  pub fn core_properties_mut(&mut self) -> &mut CoreProperties {
    &mut self
      .core_file_properties_part
      .get_or_insert_with(|| {
        let existing = self
          .relationships
          .find_by_type(CORE_PROPERTIES_RELATIONSHIP_TYPE)
          .map(|rel| (rel.id.clone(), rel.resolve_target("")));

        let (r_id, inner_path) = match existing {
          Some(existing) => existing,
          None => (
            self
              .relationships
              .push(CORE_PROPERTIES_RELATIONSHIP_TYPE, CORE_PROPERTIES_PATH),
            CORE_PROPERTIES_PATH.to_string(),
          ),
        };

        self
          .content_types
          .set_override(&inner_path, CORE_PROPERTIES_CONTENT_TYPE);

        self.raw_parts.retain(|part| part.inner_path != inner_path);

        CoreFilePropertiesPart {
          r_id,
          inner_path,
          root_element: CoreProperties::default(),
        }
      })
      .root_element
  }

  pub fn extended_properties(&self) -> Option<&ExtendedProperties> {
    self
      .extended_file_properties_part
      .as_ref()
      .map(|part| &part.root_element)
  }

  pub fn save<W: Write + Seek>(&self, writer: W) -> Result<(), SdkError> {
    let mut entry_set: HashSet<String> = HashSet::new();

    let mut zip = zip::ZipWriter::new(writer);

    write_entry(
      &mut zip,
      &mut entry_set,
      CONTENT_TYPES_PATH,
      self.content_types.to_xml()?.as_bytes(),
    )?;

    write_entry(
      &mut zip,
      &mut entry_set,
      PACKAGE_RELS_PATH,
      self.relationships.to_xml()?.as_bytes(),
    )?;

    if let Some(part) = &self.core_file_properties_part {
      write_entry(
        &mut zip,
        &mut entry_set,
        &part.inner_path,
        part.root_element.to_xml()?.as_bytes(),
      )?;
    }

    if let Some(part) = &self.extended_file_properties_part {
      let mut root_element = part.root_element.clone();

      let texts: Vec<String> = self.paragraphs().into_iter().map(Paragraph::text).collect();

      root_element.update_statistics(texts.iter().map(String::as_str));

      write_entry(
        &mut zip,
        &mut entry_set,
        &part.inner_path,
        root_element.to_xml()?.as_bytes(),
      )?;
    }

    self.main_document_part.save_zip(&mut zip, &mut entry_set)?;

    for part in &self.raw_parts {
      write_entry(&mut zip, &mut entry_set, &part.inner_path, &part.part_content)?;
    }

    zip.finish()?;

    tracing::info!(
      parts = entry_set.len(),
      paragraphs = self.paragraphs().len(),
      "saved wordprocessing document"
    );

    Ok(())
  }

  pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), SdkError> {
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);

    self.save(&mut file)?;

    file.flush()?;

    Ok(())
  }
}

impl MainDocumentPart {
  pub(crate) fn new_from_archive<R: Read + Seek>(
    path: &str,
    r_id: &str,
    file_path_set: &HashSet<&str>,
    archive: &mut zip::ZipArchive<R>,
    loaded: &mut HashSet<String>,
  ) -> Result<Self, SdkError> {
    if !file_path_set.contains(path) {
      return Err(SdkError::MissingPart(path.to_string()));
    }

    let root_element = Document::from_reader(read_entry(archive, path)?.as_slice())?;

    loaded.insert(path.to_string());

    let rels_path = rels_path_for(path);

    let mut relationships = None;

    if file_path_set.contains(rels_path.as_str()) {
      relationships = Some(Relationships::from_reader(
        read_entry(archive, &rels_path)?.as_slice(),
      )?);

      loaded.insert(rels_path.clone());
    }

    let mut style_definitions_part = None;

    if let Some(rel) = relationships
      .as_ref()
      .and_then(|r| r.find_by_type(STYLES_RELATIONSHIP_TYPE))
    {
      let inner_path = rel.resolve_target(parent_dir(path));

      if file_path_set.contains(inner_path.as_str()) {
        let root_element = Styles::from_reader(read_entry(archive, &inner_path)?.as_slice())?;

        loaded.insert(inner_path.clone());

        style_definitions_part = Some(StyleDefinitionsPart {
          r_id: rel.id.clone(),
          inner_path,
          root_element,
        });
      }
    }

    Ok(Self {
      r_id: r_id.to_string(),
      inner_path: path.to_string(),
      rels_path,
      relationships,
      root_element,
      style_definitions_part,
    })
  }

  pub(crate) fn save_zip<W: Write + Seek>(
    &self,
    zip: &mut zip::ZipWriter<W>,
    entry_set: &mut HashSet<String>,
  ) -> Result<(), SdkError> {
    write_entry(
      zip,
      entry_set,
      &self.inner_path,
      self.root_element.to_xml()?.as_bytes(),
    )?;

    if let Some(relationships) = &self.relationships {
      write_entry(zip, entry_set, &self.rels_path, relationships.to_xml()?.as_bytes())?;
    }

    if let Some(part) = &self.style_definitions_part {
      write_entry(
        zip,
        entry_set,
        &part.inner_path,
        part.root_element.to_xml()?.as_bytes(),
      )?;
    }

    Ok(())
  }
}
