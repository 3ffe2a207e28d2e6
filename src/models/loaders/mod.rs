pub mod chapter_loader;
pub mod digest_loader;

pub use chapter_loader::{find_chapter, load_chapters};
pub use digest_loader::load_digests;
