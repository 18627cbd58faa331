//! Document ingestion: extraction, chunking, and the pipeline controller

pub mod chunker;
pub mod extractor;
pub mod pipeline;

pub use chunker::{assemble_content, Chunk, TextChunker};
pub use extractor::{ExtractedSegment, TextExtractor};
pub use pipeline::{ClassifyOutcome, IngestionOutcome, IngestionPipeline, IngestionReport};
