//! 语料目录布局
//!
//! ```text
//! <root>/novel/<name>.txt              原始小说
//! <root>/data/<name>/chapters/*.txt    分章结果（UTF-8）
//! <root>/data/<name>/detail/*.json     分析结果（结构化）
//! <root>/data/<name>/detail/*.txt      分析结果（可读版）
//! <root>/data/<name>/outline/*.txt     阶段大纲
//! ```

use std::path::PathBuf;

/// 某一部小说在磁盘上的全部路径
///
/// 小说名是唯一的全局标识，显式传给每个阶段。
#[derive(Debug, Clone)]
pub struct CorpusLayout {
    root: PathBuf,
    name: String,
}

impl CorpusLayout {
    pub fn new(root: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 原始小说文件
    pub fn source_file(&self) -> PathBuf {
        self.root.join("novel").join(format!("{}.txt", self.name))
    }

    /// 分章输出目录，同时是分析阶段的输入
    pub fn chapters_dir(&self) -> PathBuf {
        self.root.join("data").join(&self.name).join("chapters")
    }

    /// 分析结果目录
    pub fn detail_dir(&self) -> PathBuf {
        self.root.join("data").join(&self.name).join("detail")
    }

    /// 大纲输出目录，输入为分析结果的可读版
    pub fn outline_dir(&self) -> PathBuf {
        self.root.join("data").join(&self.name).join("outline")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_scoped_by_name() {
        let layout = CorpusLayout::new("/work", "盾击");
        assert_eq!(layout.source_file(), PathBuf::from("/work/novel/盾击.txt"));
        assert_eq!(layout.chapters_dir(), PathBuf::from("/work/data/盾击/chapters"));
        assert_eq!(layout.detail_dir(), PathBuf::from("/work/data/盾击/detail"));
        assert_eq!(layout.outline_dir(), PathBuf::from("/work/data/盾击/outline"));
    }
}
