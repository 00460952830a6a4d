use largedoc::parts::WordprocessingDocument;

fn main() -> anyhow::Result<()> {
  let mut docx = WordprocessingDocument::create();

  docx.core_properties_mut().title = Some("Demo".to_string());

  docx.add_paragraph_with_style("Demo", "Title");
  docx.add_paragraph_with_style("Tabs and breaks", "Heading1");
  docx.add_paragraph("name:\tlargedoc\nkind:\tdemo");

  docx.save_to_file("/tmp/demo.docx")?;

  Ok(())
}
