pub mod corpus_layout;

pub use corpus_layout::CorpusLayout;
