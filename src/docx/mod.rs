// src/docx/mod.rs
pub mod reader;
pub mod writer;

/// WordprocessingML main namespace, shared by reader and writer.
pub(crate) const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
