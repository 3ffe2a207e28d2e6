pub mod chapter_flow;

pub use chapter_flow::ChapterFlow;
