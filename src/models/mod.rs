pub mod analysis;
pub mod chapter;
pub mod loaders;

pub use analysis::{AnalysisResult, AnalysisStatus};
pub use chapter::ChapterRecord;
pub use loaders::{find_chapter, load_chapters, load_digests};
