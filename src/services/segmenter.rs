//! 分章服务 - 业务能力层
//!
//! 读取 `novel/<name>.txt`，按标题切分，每章写成一个 UTF-8 文件。
//! 单线程顺序处理，不涉及并发。

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::infrastructure::CorpusLayout;
use crate::services::encoding::{self, EncodingChoice};
use crate::services::heading::HeadingPattern;
use crate::services::numeral;

/// 分章选项
#[derive(Debug, Clone, Copy)]
pub struct SegmentOptions {
    pub encoding: EncodingChoice,
    /// 先按卷切分，并在全书范围内重新编号
    pub volume_mode: bool,
}

/// 切分出的一章
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterSegment {
    /// 文件名（不含扩展名），如 `第12章`
    pub label: String,
    /// 原文中的标题，如 `第十二章`
    pub original_heading: String,
    /// 去除首尾空白后的章节内容，以标题行开头
    pub content: String,
}

/// 分章结果汇总
#[derive(Debug, Clone)]
pub struct SegmentReport {
    pub encoding: &'static str,
    pub output_dir: PathBuf,
    pub chapters: Vec<ChapterSegment>,
}

pub struct ChapterSegmenter {
    pattern: HeadingPattern,
    options: SegmentOptions,
}

impl ChapterSegmenter {
    pub fn new(pattern: HeadingPattern, options: SegmentOptions) -> Self {
        Self { pattern, options }
    }

    /// 切分已解码的文本，丢弃序言和空章节
    pub fn split_text(&self, text: &str) -> Vec<ChapterSegment> {
        if self.options.volume_mode {
            self.split_by_volume(text)
        } else {
            self.pattern
                .split_chapters(text)
                .into_iter()
                .filter_map(|(heading, segment)| {
                    let label = numeral::normalize(heading);
                    // 章节号必须从 1 开始，`第零章` 这类楔子无法被加载，直接跳过
                    if self.pattern.chapter_number_from_file_name(&label) == Some(0) {
                        warn!("章节号为 0，已跳过: {}", heading);
                        return None;
                    }
                    make_segment(label, heading, segment)
                })
                .collect()
        }
    }

    /// 卷模式：卷内再按章切分，章节号在全书范围内连续编号
    fn split_by_volume(&self, text: &str) -> Vec<ChapterSegment> {
        let mut chapters = Vec::new();
        let mut current = 0u32;

        for (_, volume) in self.pattern.split_volumes(text) {
            for (heading, segment) in self.pattern.split_chapters(volume) {
                if let Some(chapter) = make_segment(format!("第{:03}章", current + 1), heading, segment) {
                    current += 1;
                    chapters.push(chapter);
                }
            }
        }

        chapters
    }

    /// 对一部小说执行分章并写入 `data/<name>/chapters/`
    pub fn split_chapters(&self, layout: &CorpusLayout) -> AppResult<SegmentReport> {
        let input_file = layout.source_file();
        info!("📖 开始分章: {}", layout.name());
        if !input_file.exists() {
            return Err(AppError::MissingInput { path: input_file });
        }

        let buffer = fs::read(&input_file).map_err(|e| AppError::persistence(&input_file, e))?;
        let source_encoding = encoding::resolve(&buffer, self.options.encoding);
        info!("使用编码 {} 读取 {}", source_encoding.name(), input_file.display());
        let content = encoding::decode(&buffer, source_encoding);

        let chapters = self.split_text(&content);
        if chapters.is_empty() {
            return Err(AppError::NoChaptersFound { path: input_file });
        }

        let output_dir = layout.chapters_dir();
        fs::create_dir_all(&output_dir).map_err(|e| AppError::persistence(&output_dir, e))?;

        let mut seen = HashSet::new();
        for chapter in &chapters {
            if !seen.insert(chapter.label.as_str()) {
                warn!("章节名重复，后者覆盖前者: {}", chapter.label);
            }
            let file_path = output_dir.join(format!("{}.txt", chapter.label));
            fs::write(&file_path, chapter.content.as_bytes())
                .map_err(|e| AppError::persistence(&file_path, e))?;
            info!("已保存: {}.txt (原章节名: {})", chapter.label, chapter.original_heading);
        }

        info!("✅ 成功分割 {} 个章节！", chapters.len());

        Ok(SegmentReport {
            encoding: source_encoding.name(),
            output_dir,
            chapters,
        })
    }
}

fn make_segment(label: String, heading: &str, segment: &str) -> Option<ChapterSegment> {
    let content = segment.trim();
    if content.is_empty() {
        return None;
    }
    Some(ChapterSegment {
        label,
        original_heading: heading.to_string(),
        content: content.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::load_chapters;
    use encoding_rs::{GBK, UTF_8};

    const NOVEL: &str = "书名\n作者：某人\n\n第一章 开端\n  主角登场。\n\n第二章 相遇\n两人相遇。\n第十二章 转折\n风云突变。\n";

    fn segmenter(volume_mode: bool) -> ChapterSegmenter {
        ChapterSegmenter::new(
            HeadingPattern::new("章节回").unwrap(),
            SegmentOptions {
                encoding: EncodingChoice::Fixed(UTF_8),
                volume_mode,
            },
        )
    }

    fn write_novel(root: &std::path::Path, name: &str, bytes: &[u8]) -> CorpusLayout {
        let layout = CorpusLayout::new(root, name);
        fs::create_dir_all(layout.source_file().parent().unwrap()).unwrap();
        fs::write(layout.source_file(), bytes).unwrap();
        layout
    }

    #[test]
    fn test_split_text_normalizes_labels() {
        let chapters = segmenter(false).split_text(NOVEL);
        let labels: Vec<_> = chapters.iter().map(|c| c.label.as_str()).collect();

        assert_eq!(labels, vec!["第1章", "第2章", "第12章"]);
        assert_eq!(chapters[0].original_heading, "第一章");
        assert_eq!(chapters[0].content, "第一章 开端\n  主角登场。");
    }

    #[test]
    fn test_round_trip_modulo_whitespace() {
        let chapters = segmenter(false).split_text(NOVEL);
        let joined: String = chapters.iter().map(|c| c.content.as_str()).collect();

        let body = &NOVEL[NOVEL.find("第一章").unwrap()..];
        let strip = |s: &str| s.split_whitespace().collect::<String>();
        assert_eq!(strip(&joined), strip(body));
    }

    #[test]
    fn test_chapter_zero_prologue_skipped_and_output_loads() {
        let dir = tempfile::tempdir().unwrap();
        let novel = "第零章 楔子\n引子。\n第一章 开端\n正文。\n";
        let layout = write_novel(dir.path(), "楔子", novel.as_bytes());

        let report = segmenter(false).split_chapters(&layout).unwrap();
        let labels: Vec<_> = report.chapters.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["第1章"]);
        assert!(!layout.chapters_dir().join("第0章.txt").exists());

        let pattern = HeadingPattern::new("章节回").unwrap();
        let loaded = load_chapters(&layout.chapters_dir(), &pattern).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].number(), 1);
    }

    #[test]
    fn test_volume_mode_renumbers_across_volumes() {
        let text = "前言\n第一卷 起\n第一章 甲\n甲文\n第二章 乙\n乙文\n第二卷 承\n第一章 丙\n丙文\n";
        let chapters = segmenter(true).split_text(text);
        let labels: Vec<_> = chapters.iter().map(|c| c.label.as_str()).collect();

        assert_eq!(labels, vec!["第001章", "第002章", "第003章"]);
        assert_eq!(chapters[2].content, "第一章 丙\n丙文");
    }

    #[test]
    fn test_writes_utf8_files_from_gbk_source() {
        let dir = tempfile::tempdir().unwrap();
        let (bytes, _, _) = GBK.encode(NOVEL);
        let layout = write_novel(dir.path(), "测试", &bytes);

        let seg = ChapterSegmenter::new(
            HeadingPattern::new("章节回").unwrap(),
            SegmentOptions {
                encoding: EncodingChoice::Detect,
                volume_mode: false,
            },
        );
        let report = seg.split_chapters(&layout).unwrap();

        assert_eq!(report.encoding, "GBK");
        assert_eq!(report.chapters.len(), 3);
        let second = fs::read_to_string(layout.chapters_dir().join("第2章.txt")).unwrap();
        assert_eq!(second, "第二章 相遇\n两人相遇。");
    }

    #[test]
    fn test_rerun_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let layout = write_novel(dir.path(), "重跑", NOVEL.as_bytes());
        let seg = segmenter(false);

        seg.split_chapters(&layout).unwrap();
        let first = fs::read(layout.chapters_dir().join("第12章.txt")).unwrap();
        seg.split_chapters(&layout).unwrap();
        let second = fs::read(layout.chapters_dir().join("第12章.txt")).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_source_reported() {
        let dir = tempfile::tempdir().unwrap();
        let layout = CorpusLayout::new(dir.path(), "不存在");

        let err = segmenter(false).split_chapters(&layout).unwrap_err();
        assert!(matches!(err, AppError::MissingInput { .. }));
    }

    #[test]
    fn test_no_chapters_reported() {
        let dir = tempfile::tempdir().unwrap();
        let layout = write_novel(dir.path(), "无章", "只有序言，没有章节。".as_bytes());

        let err = segmenter(false).split_chapters(&layout).unwrap_err();
        assert!(matches!(err, AppError::NoChaptersFound { .. }));
        assert!(!layout.chapters_dir().exists());
    }
}
