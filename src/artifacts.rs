//! Summary artifacts
//!
//! Persists a finished summary to the output directory as a UTF-8 `.txt`
//! file and a rendered `.pdf`, both named after the upload's base
//! filename. A later upload with the same base name overwrites both.

use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

// A4 geometry in PDF points, 15mm margin, 8mm leading.
const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;
const MARGIN: f32 = 42.52;
const FONT_SIZE: f32 = 12.0;
const LINE_HEIGHT: f32 = 22.68;

/// Wrapped line width in characters, sized for 12pt Helvetica across the
/// printable span of an A4 page.
const MAX_LINE_CHARS: usize = 86;

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to write artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to render summary PDF: {0}")]
    Pdf(#[from] lopdf::Error),
}

/// Writes summary artifacts under a fixed output directory
#[derive(Clone)]
pub struct ArtifactWriter {
    output_dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write the summary verbatim to `<base>.txt`.
    pub fn write_text(&self, base: &str, summary: &str) -> Result<PathBuf, ArtifactError> {
        let path = self.output_dir.join(format!("{}.txt", base));
        std::fs::write(&path, summary)?;
        Ok(path)
    }

    /// Render the summary to `<base>.pdf`.
    ///
    /// Fixed margin and font, lines wrapped to the page width, new pages
    /// appended as the text runs past the bottom margin. Helvetica carries
    /// no Sinhala glyphs; a summary in Sinhala needs an embedded TTF to
    /// render legibly.
    pub fn write_pdf(&self, base: &str, summary: &str) -> Result<PathBuf, ArtifactError> {
        let path = self.output_dir.join(format!("{}.pdf", base));

        let lines = wrap_lines(summary, MAX_LINE_CHARS);
        let lines_per_page = ((PAGE_HEIGHT - 2.0 * MARGIN) / LINE_HEIGHT) as usize;

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        // An empty summary still gets its single page.
        let chunks: Vec<&[String]> = if lines.is_empty() {
            vec![&[]]
        } else {
            lines.chunks(lines_per_page.max(1)).collect()
        };

        for chunk in chunks {
            let mut operations = vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
                Operation::new("TL", vec![LINE_HEIGHT.into()]),
                Operation::new(
                    "Td",
                    vec![MARGIN.into(), (PAGE_HEIGHT - MARGIN - FONT_SIZE).into()],
                ),
            ];
            for line in chunk {
                operations.push(Operation::new("Tj", vec![Object::string_literal(line.as_str())]));
                operations.push(Operation::new("T*", vec![]));
            }
            operations.push(Operation::new("ET", vec![]));

            let content = Content { operations };
            let stream_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => stream_id,
            });
            kids.push(page_id.into());
        }

        let page_count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Producer" => Object::string_literal("lekha-server"),
            "CreationDate" => Object::string_literal(
                chrono::Utc::now().format("D:%Y%m%d%H%M%SZ").to_string(),
            ),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);
        doc.compress();

        doc.save(&path)?;
        Ok(path)
    }
}

/// Split text into wrapped lines at most `max_chars` wide. Paragraph
/// breaks are preserved; words longer than a line are hard-broken.
fn wrap_lines(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();
            let current_len = current.chars().count();

            if current_len > 0 && current_len + 1 + word_len <= max_chars {
                current.push(' ');
                current.push_str(word);
            } else if current_len == 0 && word_len <= max_chars {
                current.push_str(word);
            } else {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                // Hard-break an oversized word across lines.
                let mut rest: Vec<char> = word.chars().collect();
                while rest.len() > max_chars {
                    lines.push(rest.drain(..max_chars).collect());
                }
                current = rest.into_iter().collect();
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_lines_respect_the_width() {
        let text = "one two three four five six seven eight nine ten ".repeat(20);
        for line in wrap_lines(&text, 30) {
            assert!(line.chars().count() <= 30, "line too wide: {:?}", line);
        }
    }

    #[test]
    fn oversized_words_are_hard_broken() {
        let lines = wrap_lines(&"a".repeat(75), 30);
        assert_eq!(lines, vec!["a".repeat(30), "a".repeat(30), "a".repeat(15)]);
    }

    #[test]
    fn paragraph_breaks_are_preserved() {
        let lines = wrap_lines("first\n\nsecond", 30);
        assert_eq!(lines, vec!["first", "", "second"]);
    }

    #[test]
    fn text_artifact_is_written_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path());

        let path = writer.write_text("note", "A short summary.").unwrap();
        assert_eq!(path, dir.path().join("note.txt"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "A short summary.");
    }

    #[test]
    fn text_artifact_is_overwritten_on_reupload() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path());

        writer.write_text("note", "first version").unwrap();
        writer.write_text("note", "second version").unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.path().join("note.txt")).unwrap(),
            "second version"
        );
    }

    #[test]
    fn pdf_artifact_has_a_pdf_header() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path());

        let path = writer.write_pdf("note", "A short summary.").unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn long_summaries_break_across_pages() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path());

        let summary = "line of summary text\n".repeat(100);
        let path = writer.write_pdf("long", &summary).unwrap();

        let doc = Document::load(&path).unwrap();
        assert!(doc.get_pages().len() > 1);
    }

    #[test]
    fn empty_summary_still_renders_one_page() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path());

        let path = writer.write_pdf("empty", "").unwrap();
        let doc = Document::load(&path).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }
}
