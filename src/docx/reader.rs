// src/docx/reader.rs
//
// DOCX files are ZIP archives; the paragraph stream lives in
// word/document.xml. Only body-level paragraphs are consumed: tables,
// headers and footers are ignored.

use super::W_NS;
use crate::model::{ParagraphFormat, RawBlock, StyledRun};
use crate::utils::error::DocxError;
use roxmltree::Node;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

/// Reads the source document into a flat sequence of raw paragraph blocks.
pub fn read_blocks(path: &Path) -> Result<Vec<RawBlock>, DocxError> {
    tracing::info!("Reading question bank: {}", path.display());

    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|_| DocxError::MissingPart("word/document.xml".to_string()))?
        .read_to_string(&mut xml)?;

    let blocks = parse_document_xml(&xml)?;
    tracing::debug!("Read {} body paragraphs", blocks.len());
    Ok(blocks)
}

/// Parses a `word/document.xml` payload into raw blocks.
pub(crate) fn parse_document_xml(xml: &str) -> Result<Vec<RawBlock>, DocxError> {
    let doc = roxmltree::Document::parse(xml)?;
    let body = doc
        .root_element()
        .children()
        .find(|n| n.has_tag_name((W_NS, "body")))
        .ok_or_else(|| DocxError::MissingPart("w:body".to_string()))?;

    Ok(body
        .children()
        .filter(|n| n.has_tag_name((W_NS, "p")))
        .map(read_paragraph)
        .collect())
}

fn read_paragraph(p: Node) -> RawBlock {
    let format = p
        .children()
        .find(|n| n.has_tag_name((W_NS, "pPr")))
        .map(read_paragraph_format)
        .unwrap_or_default();

    let runs = p
        .children()
        .filter(|n| n.has_tag_name((W_NS, "r")))
        .map(read_run)
        .collect();

    RawBlock { runs, format }
}

fn read_paragraph_format(ppr: Node) -> ParagraphFormat {
    let mut format = ParagraphFormat::default();
    for child in ppr.children() {
        if child.has_tag_name((W_NS, "jc")) {
            format.alignment = attr(child, "val");
        } else if child.has_tag_name((W_NS, "spacing")) {
            format.line_spacing = attr_u32(child, "line");
            format.line_rule = attr(child, "lineRule");
            format.space_before = attr_u32(child, "before");
            format.space_after = attr_u32(child, "after");
        }
    }
    format
}

fn read_run(r: Node) -> StyledRun {
    let mut run = StyledRun::default();

    if let Some(rpr) = r.children().find(|n| n.has_tag_name((W_NS, "rPr"))) {
        for child in rpr.children() {
            if child.has_tag_name((W_NS, "b")) {
                run.bold = Some(!val_is_off(child));
            } else if child.has_tag_name((W_NS, "i")) {
                run.italic = Some(!val_is_off(child));
            } else if child.has_tag_name((W_NS, "u")) {
                // w:val is required on w:u in practice; "single" is the
                // conventional default when a producer omits it.
                run.underline = Some(attr(child, "val").unwrap_or_else(|| "single".to_string()));
            } else if child.has_tag_name((W_NS, "sz")) {
                run.font_size = attr_u32(child, "val");
            } else if child.has_tag_name((W_NS, "color")) {
                run.color = attr(child, "val");
            } else if child.has_tag_name((W_NS, "rFonts")) {
                run.font_name = child.attribute((W_NS, "ascii")).map(str::to_string);
            }
        }
    }

    let mut text = String::new();
    for child in r.children() {
        if child.has_tag_name((W_NS, "t")) {
            text.push_str(child.text().unwrap_or(""));
        } else if child.has_tag_name((W_NS, "tab")) {
            text.push('\t');
        } else if child.has_tag_name((W_NS, "br")) || child.has_tag_name((W_NS, "cr")) {
            text.push('\n');
        }
    }
    run.text = text;
    run
}

/// Whether a toggle property (w:b, w:i) carries an explicit "off" value.
fn val_is_off(n: Node) -> bool {
    matches!(n.attribute((W_NS, "val")), Some("0") | Some("false"))
}

fn attr(n: Node, name: &str) -> Option<String> {
    n.attribute((W_NS, name)).map(str::to_string)
}

fn attr_u32(n: Node, name: &str) -> Option<u32> {
    n.attribute((W_NS, name)).and_then(|v| v.parse().ok())
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    fn wrap_body(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{W_NS}"><w:body>{body}</w:body></w:document>"#
        )
    }

    #[test]
    fn reads_runs_with_formatting() {
        let xml = wrap_body(
            r#"<w:p>
                 <w:pPr>
                   <w:spacing w:before="120" w:after="60" w:line="240" w:lineRule="auto"/>
                   <w:jc w:val="center"/>
                 </w:pPr>
                 <w:r>
                   <w:rPr>
                     <w:rFonts w:ascii="Arial" w:hAnsi="Arial"/>
                     <w:b/><w:i w:val="0"/><w:u w:val="single"/>
                     <w:color w:val="FF0000"/><w:sz w:val="28"/>
                   </w:rPr>
                   <w:t xml:space="preserve">Hello </w:t>
                 </w:r>
                 <w:r><w:t>world</w:t></w:r>
               </w:p>"#,
        );

        let blocks = parse_document_xml(&xml).unwrap();
        assert_eq!(blocks.len(), 1);

        let block = &blocks[0];
        assert_eq!(block.format.alignment.as_deref(), Some("center"));
        assert_eq!(block.format.space_before, Some(120));
        assert_eq!(block.format.space_after, Some(60));
        assert_eq!(block.format.line_spacing, Some(240));
        assert_eq!(block.format.line_rule.as_deref(), Some("auto"));

        assert_eq!(block.runs.len(), 2);
        let styled = &block.runs[0];
        assert_eq!(styled.text, "Hello ");
        assert_eq!(styled.bold, Some(true));
        assert_eq!(styled.italic, Some(false));
        assert_eq!(styled.underline.as_deref(), Some("single"));
        assert_eq!(styled.color.as_deref(), Some("FF0000"));
        assert_eq!(styled.font_size, Some(28));
        assert_eq!(styled.font_name.as_deref(), Some("Arial"));

        let plain = &block.runs[1];
        assert_eq!(plain.text, "world");
        assert_eq!(plain.bold, None);
        assert_eq!(plain.font_size, None);
        assert_eq!(block.text(), "Hello world");
    }

    #[test]
    fn tabs_and_breaks_become_whitespace() {
        let xml = wrap_body(r#"<w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t></w:r></w:p>"#);
        let blocks = parse_document_xml(&xml).unwrap();
        assert_eq!(blocks[0].text(), "a\tb\nc");
    }

    #[test]
    fn tables_are_not_consumed() {
        let xml = wrap_body(
            r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
               <w:p><w:r><w:t>outside</w:t></w:r></w:p>"#,
        );
        let blocks = parse_document_xml(&xml).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text(), "outside");
    }

    #[test]
    fn missing_body_is_an_error() {
        let xml = format!(r#"<w:document xmlns:w="{W_NS}"></w:document>"#);
        let err = parse_document_xml(&xml).unwrap_err();
        assert!(matches!(err, DocxError::MissingPart(part) if part == "w:body"));
    }
}
