// src/extractors/mod.rs
pub mod items;

// Re-export key extraction types for convenience
#[allow(unused_imports)]
pub use items::ItemExtractor;
