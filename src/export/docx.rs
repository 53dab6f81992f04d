use std::io::Cursor;

use docx_rs::{BreakType, Docx, Paragraph, Run, Style, StyleType};

use super::{ExportDocument, RenderError};

const TITLE_STYLE: &str = "Title";
const HEADING_STYLE: &str = "Heading1";

/// Builds a Word document: a title paragraph, then a level-1 heading and a
/// body paragraph per section.
pub fn render(document: &ExportDocument) -> Result<Vec<u8>, RenderError> {
    let mut docx = Docx::new()
        .add_style(
            Style::new(TITLE_STYLE, StyleType::Paragraph)
                .name("Title")
                .size(56)
                .bold(),
        )
        .add_style(
            Style::new(HEADING_STYLE, StyleType::Paragraph)
                .name("Heading 1")
                .size(32)
                .bold(),
        )
        .add_paragraph(
            Paragraph::new()
                .style(TITLE_STYLE)
                .add_run(Run::new().add_text(&document.title)),
        );

    for section in &document.sections {
        docx = docx
            .add_paragraph(
                Paragraph::new()
                    .style(HEADING_STYLE)
                    .add_run(Run::new().add_text(&section.title)),
            )
            .add_paragraph(Paragraph::new().add_run(body_run(&section.content)));
    }

    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|e| RenderError::Docx(e.to_string()))?;

    let bytes = buffer.into_inner();
    if bytes.is_empty() {
        return Err(RenderError::Docx("empty output".to_string()));
    }

    tracing::debug!("Rendered DOCX '{}' ({} bytes)", document.title, bytes.len());

    Ok(bytes)
}

/// One run with a line break between the lines of `content`.
fn body_run(content: &str) -> Run {
    let mut run = Run::new();
    for (i, line) in content.lines().enumerate() {
        if i > 0 {
            run = run.add_break(BreakType::TextWrapping);
        }
        run = run.add_text(line);
    }
    run
}
