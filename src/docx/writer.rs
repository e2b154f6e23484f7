// src/docx/writer.rs
//
// Output assembly. The exam is packed as a minimal WordprocessingML
// package: [Content_Types].xml, package/part relationships, styles.xml
// (document defaults), docProps/core.xml and word/document.xml plus any
// embedded media. Body XML is built as a string with escaped values; the
// paragraph/run vocabulary mirrors what the reader consumes.

use crate::model::{ContentBlock, Item, ParagraphFormat, StyledRun, TextBlock};
use crate::utils::error::{DocxError, ImageEmbedError};
use quick_xml::escape::escape;
use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Every output run is forced to this family, overriding whatever the bank
/// used. East-Asian and complex-script slots get the same family so the
/// Vietnamese text renders consistently.
const OUTPUT_FONT: &str = "Times New Roman";

/// Document default size: 13 pt, stored as half-points.
const NORMAL_SIZE_HALF_POINTS: u32 = 26;

/// Question labels ("Câu {n}: ") are 11 pt bold.
const LABEL_SIZE_HALF_POINTS: u32 = 22;

/// Exam title size: 16 pt.
const TITLE_SIZE_HALF_POINTS: u32 = 32;

/// Fixed display width for embedded images: 4 inches in EMUs.
const IMAGE_WIDTH_EMU: u64 = 4 * 914_400;

struct Media {
    rel_id: String,
    file_name: String,
    extension: String,
    bytes: Vec<u8>,
}

/// Builder for the output exam document. Content methods append body XML
/// and collect media parts; `save` packs everything into the DOCX archive.
pub struct ExamDocument {
    body: String,
    media: Vec<Media>,
}

impl ExamDocument {
    pub fn new() -> Self {
        Self {
            body: String::new(),
            media: Vec::new(),
        }
    }

    /// Centered bold heading at the top of the exam.
    pub fn add_title(&mut self, text: &str) {
        let format = ParagraphFormat {
            alignment: Some("center".to_string()),
            ..Default::default()
        };
        let run = StyledRun {
            text: text.to_string(),
            bold: Some(true),
            font_size: Some(TITLE_SIZE_HALF_POINTS),
            ..Default::default()
        };
        self.push_paragraph(&format, std::slice::from_ref(&run));
    }

    /// Question label paragraph, e.g. "Câu 3: ": bold, 11 pt, single
    /// spacing with no space before or after.
    pub fn add_label(&mut self, text: &str) {
        let format = ParagraphFormat {
            alignment: None,
            line_spacing: Some(240),
            line_rule: Some("auto".to_string()),
            space_before: Some(0),
            space_after: Some(0),
        };
        let run = StyledRun {
            text: text.to_string(),
            bold: Some(true),
            font_size: Some(LABEL_SIZE_HALF_POINTS),
            ..Default::default()
        };
        self.push_paragraph(&format, std::slice::from_ref(&run));
    }

    /// Reproduces a captured text block, re-applying its paragraph format
    /// and per-run styling (the font family is intentionally overridden).
    pub fn add_text_block(&mut self, block: &TextBlock) {
        self.push_paragraph(&block.format, &block.runs);
    }

    /// Embeds the referenced image at a fixed 4-inch display width. A
    /// failure is recovered locally: the image is replaced by a visible
    /// placeholder paragraph naming the path, and assembly continues.
    pub fn add_image(&mut self, path: &str) {
        if let Err(e) = self.try_embed_image(path) {
            tracing::warn!("Could not embed image '{}': {}", path, e);
            let placeholder = StyledRun {
                text: format!("[LỖI CHÈN ẢNH: {}] ({})", path, e),
                ..Default::default()
            };
            self.push_paragraph(
                &ParagraphFormat::default(),
                std::slice::from_ref(&placeholder),
            );
        }
    }

    fn try_embed_image(&mut self, path: &str) -> Result<(), ImageEmbedError> {
        let extension = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        if content_type_for(&extension).is_none() {
            return Err(ImageEmbedError::UnsupportedExtension(extension));
        }

        let bytes = fs::read(path)?;
        let (width_px, height_px) = image::image_dimensions(path)?;

        // Scale height to keep the aspect ratio at the fixed display width.
        let cx = IMAGE_WIDTH_EMU;
        let cy = cx * u64::from(height_px) / u64::from(width_px.max(1));

        let index = self.media.len() + 1;
        let rel_id = format!("rId{}", index + 1); // rId1 is styles.xml
        let file_name = format!("image{}.{}", index, extension);

        self.body.push_str(&format!(
            r#"<w:p><w:r><w:drawing><wp:inline distT="0" distB="0" distL="0" distR="0"><wp:extent cx="{cx}" cy="{cy}"/><wp:effectExtent l="0" t="0" r="0" b="0"/><wp:docPr id="{index}" name="Picture {index}"/><wp:cNvGraphicFramePr><a:graphicFrameLocks xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" noChangeAspect="1"/></wp:cNvGraphicFramePr><a:graphic xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture"><pic:pic xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture"><pic:nvPicPr><pic:cNvPr id="{index}" name="{name}"/><pic:cNvPicPr/></pic:nvPicPr><pic:blipFill><a:blip r:embed="{rel_id}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill><pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"#,
            name = escape(&file_name),
        ));

        self.media.push(Media {
            rel_id,
            file_name,
            extension,
            bytes,
        });
        Ok(())
    }

    fn push_paragraph(&mut self, format: &ParagraphFormat, runs: &[StyledRun]) {
        self.body.push_str("<w:p>");
        self.body.push_str(&paragraph_props_xml(format));
        for run in runs {
            self.body.push_str(&run_xml(run));
        }
        self.body.push_str("</w:p>");
    }

    /// Packs the assembled document into a DOCX archive at `path`.
    pub fn save(&self, path: &Path) -> Result<(), DocxError> {
        let file = File::create(path)?;
        let mut zip = ZipWriter::new(file);

        zip.start_file("[Content_Types].xml", SimpleFileOptions::default())?;
        zip.write_all(self.content_types_xml().as_bytes())?;

        zip.start_file("_rels/.rels", SimpleFileOptions::default())?;
        zip.write_all(PACKAGE_RELS.as_bytes())?;

        zip.start_file("docProps/core.xml", SimpleFileOptions::default())?;
        zip.write_all(core_props_xml().as_bytes())?;

        zip.start_file("word/styles.xml", SimpleFileOptions::default())?;
        zip.write_all(styles_xml().as_bytes())?;

        zip.start_file("word/_rels/document.xml.rels", SimpleFileOptions::default())?;
        zip.write_all(self.document_rels_xml().as_bytes())?;

        zip.start_file("word/document.xml", SimpleFileOptions::default())?;
        zip.write_all(self.document_xml().as_bytes())?;

        for media in &self.media {
            zip.start_file(format!("word/media/{}", media.file_name), SimpleFileOptions::default())?;
            zip.write_all(&media.bytes)?;
        }

        zip.finish()?;
        tracing::info!("Saved exam document to {}", path.display());
        Ok(())
    }

    fn document_xml(&self) -> String {
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                "\n",
                r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" "#,
                r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
                r#"xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing">"#,
                r#"<w:body>{}<w:sectPr/></w:body></w:document>"#
            ),
            self.body
        )
    }

    fn content_types_xml(&self) -> String {
        let mut extensions: Vec<&str> = self
            .media
            .iter()
            .map(|m| m.extension.as_str())
            .collect();
        extensions.sort_unstable();
        extensions.dedup();

        let mut defaults = String::new();
        for ext in extensions {
            if let Some(content_type) = content_type_for(ext) {
                defaults.push_str(&format!(
                    r#"<Default Extension="{ext}" ContentType="{content_type}"/>"#
                ));
            }
        }

        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                "\n",
                r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
                r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
                r#"<Default Extension="xml" ContentType="application/xml"/>"#,
                "{}",
                r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
                r#"<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>"#,
                r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#,
                r#"</Types>"#
            ),
            defaults
        )
    }

    fn document_rels_xml(&self) -> String {
        let mut rels = String::from(
            r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
        );
        for media in &self.media {
            rels.push_str(&format!(
                r#"<Relationship Id="{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/{}"/>"#,
                media.rel_id, media.file_name
            ));
        }
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                "\n",
                r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#
            ),
            rels
        )
    }
}

impl Default for ExamDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// Assembles and saves the exam: a title heading, then per selected item an
/// auto-numbered "Câu {n}: " label followed by the item's content blocks.
pub fn write_exam(selected: &[&Item], path: &Path, title: &str) -> Result<(), DocxError> {
    let mut doc = ExamDocument::new();
    doc.add_title(title);

    for (i, item) in selected.iter().enumerate() {
        doc.add_label(&format!("Câu {}: ", i + 1));
        for block in &item.blocks {
            match block {
                ContentBlock::Text(text) => doc.add_text_block(text),
                ContentBlock::Image(img) => doc.add_image(&img.path),
            }
        }
    }

    doc.save(path)
}

fn paragraph_props_xml(format: &ParagraphFormat) -> String {
    let mut props = String::new();

    let has_spacing = format.line_spacing.is_some()
        || format.line_rule.is_some()
        || format.space_before.is_some()
        || format.space_after.is_some();
    if has_spacing {
        props.push_str("<w:spacing");
        if let Some(before) = format.space_before {
            props.push_str(&format!(r#" w:before="{before}""#));
        }
        if let Some(after) = format.space_after {
            props.push_str(&format!(r#" w:after="{after}""#));
        }
        if let Some(line) = format.line_spacing {
            props.push_str(&format!(r#" w:line="{line}""#));
        }
        if let Some(rule) = &format.line_rule {
            props.push_str(&format!(r#" w:lineRule="{}""#, escape(rule)));
        }
        props.push_str("/>");
    }
    if let Some(alignment) = &format.alignment {
        props.push_str(&format!(r#"<w:jc w:val="{}"/>"#, escape(alignment)));
    }

    if props.is_empty() {
        String::new()
    } else {
        format!("<w:pPr>{props}</w:pPr>")
    }
}

fn run_xml(run: &StyledRun) -> String {
    // Element order follows the CT_RPr schema sequence.
    let mut props = format!(
        r#"<w:rFonts w:ascii="{f}" w:hAnsi="{f}" w:eastAsia="{f}" w:cs="{f}"/>"#,
        f = OUTPUT_FONT
    );
    match run.bold {
        Some(true) => props.push_str("<w:b/>"),
        Some(false) => props.push_str(r#"<w:b w:val="0"/>"#),
        None => {}
    }
    match run.italic {
        Some(true) => props.push_str("<w:i/>"),
        Some(false) => props.push_str(r#"<w:i w:val="0"/>"#),
        None => {}
    }
    if let Some(color) = &run.color {
        props.push_str(&format!(r#"<w:color w:val="{}"/>"#, escape(color)));
    }
    if let Some(size) = run.font_size {
        props.push_str(&format!(
            r#"<w:sz w:val="{size}"/><w:szCs w:val="{size}"/>"#
        ));
    }
    if let Some(underline) = &run.underline {
        props.push_str(&format!(r#"<w:u w:val="{}"/>"#, escape(underline)));
    }

    format!(
        r#"<w:r><w:rPr>{}</w:rPr><w:t xml:space="preserve">{}</w:t></w:r>"#,
        props,
        escape(&run.text)
    )
}

fn styles_xml() -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\n",
            r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
            r#"<w:docDefaults><w:rPrDefault><w:rPr>"#,
            r#"<w:rFonts w:ascii="{f}" w:hAnsi="{f}" w:eastAsia="{f}" w:cs="{f}"/>"#,
            r#"<w:sz w:val="{sz}"/><w:szCs w:val="{sz}"/>"#,
            r#"</w:rPr></w:rPrDefault></w:docDefaults>"#,
            r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>"#,
            r#"</w:styles>"#
        ),
        f = OUTPUT_FONT,
        sz = NORMAL_SIZE_HALF_POINTS
    )
}

fn core_props_xml() -> String {
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\n",
            r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
            r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
            r#"<dc:creator>exam_generator</dc:creator>"#,
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">{ts}</dcterms:created>"#,
            r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{ts}</dcterms:modified>"#,
            r#"</cp:coreProperties>"#
        ),
        ts = timestamp
    )
}

const PACKAGE_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    "\n",
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
    r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>"#,
    r#"</Relationships>"#
);

fn content_type_for(extension: &str) -> Option<&'static str> {
    match extension {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}
