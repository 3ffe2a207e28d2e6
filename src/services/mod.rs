pub mod analysis;
pub mod encoding;
pub mod heading;
pub mod llm_service;
pub mod numeral;
pub mod result_store;
pub mod segmenter;

pub use analysis::{AnalysisOutput, AnalysisService};
pub use heading::HeadingPattern;
pub use llm_service::{AnalysisTask, LlmService};
pub use result_store::{BatchKey, ResultStore};
pub use segmenter::{ChapterSegmenter, SegmentOptions, SegmentReport};
