use largedoc::parts::WordprocessingDocument;

fn main() -> anyhow::Result<()> {
  let path = std::env::args()
    .nth(1)
    .unwrap_or_else(|| "/tmp/demo.docx".to_string());

  let docx = WordprocessingDocument::new_from_file(&path)?;

  if let Some(title) = docx.core_properties().and_then(|p| p.title.as_deref()) {
    println!("title: {title}");
  }

  for (i, paragraph) in docx.paragraphs().iter().enumerate() {
    let text = paragraph.text();

    println!(
      "{i}: style={} chars={} {:?}",
      paragraph.style.as_deref().unwrap_or("-"),
      text.chars().count(),
      text.chars().take(40).collect::<String>()
    );
  }

  Ok(())
}
