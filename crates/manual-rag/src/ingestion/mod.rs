//! Document ingestion: source walking, chunking, embedding and index build

mod chunker;
mod processor;
mod source;

pub use chunker::{sliding_window, slugify, split_lines, split_sections, title_path, MarkdownChunker};
pub use processor::{IngestPipeline, IngestReport};
pub use source::{DocumentSource, FsDocumentSource};
