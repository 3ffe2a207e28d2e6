use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};
use crate::models::chapter::ChapterRecord;
use crate::services::heading::HeadingPattern;

/// 列出目录下所有 `.txt` 文件，按文件名排序
pub(super) fn list_txt_files(dir: &Path) -> AppResult<Vec<(String, PathBuf)>> {
    let entries = fs::read_dir(dir).map_err(|e| AppError::persistence(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| AppError::persistence(dir, e))?.path();
        if path.extension().and_then(|s| s.to_str()) != Some("txt") || !path.is_file() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|s| s.to_str()) {
            files.push((name.to_string(), path));
        }
    }
    files.sort();
    Ok(files)
}

fn read_chapter(
    pattern: &HeadingPattern,
    number: u32,
    file_name: &str,
    path: &Path,
) -> AppResult<ChapterRecord> {
    let content = fs::read_to_string(path).map_err(|e| AppError::persistence(path, e))?;
    if content.trim().is_empty() {
        return Err(AppError::EmptyChapter {
            file: file_name.to_string(),
        });
    }
    let title = pattern.title_from_content(&content);
    Ok(ChapterRecord::new(number, title, content))
}

/// 从章节目录加载全部章节，按章节号升序返回
pub fn load_chapters(input_dir: &Path, pattern: &HeadingPattern) -> AppResult<Vec<ChapterRecord>> {
    if !input_dir.is_dir() {
        return Err(AppError::MissingInput {
            path: input_dir.to_path_buf(),
        });
    }

    let files = list_txt_files(input_dir)?;
    if files.is_empty() {
        return Err(AppError::EmptyCorpus {
            path: input_dir.to_path_buf(),
        });
    }

    let mut chapters: BTreeMap<u32, (String, ChapterRecord)> = BTreeMap::new();
    for (file_name, path) in files {
        let number = pattern
            .chapter_number_from_file_name(&file_name)
            .filter(|n| *n >= 1)
            .ok_or_else(|| AppError::InvalidChapterFile {
                file: file_name.clone(),
            })?;

        let chapter = read_chapter(pattern, number, &file_name, &path)?;
        match chapters.entry(number) {
            Entry::Vacant(slot) => {
                slot.insert((file_name, chapter));
            }
            Entry::Occupied(existing) => {
                return Err(AppError::DuplicateChapter {
                    number,
                    first: existing.get().0.clone(),
                    second: file_name,
                });
            }
        }
    }

    tracing::info!("共找到 {} 个章节", chapters.len());
    Ok(chapters.into_values().map(|(_, chapter)| chapter).collect())
}

/// 按章节号查找单个章节文件
pub fn find_chapter(input_dir: &Path, number: u32, pattern: &HeadingPattern) -> AppResult<ChapterRecord> {
    if !input_dir.is_dir() {
        return Err(AppError::ChapterFileNotFound { number });
    }

    let (file_name, path) = list_txt_files(input_dir)?
        .into_iter()
        .find(|(name, _)| pattern.chapter_number_from_file_name(name) == Some(number))
        .ok_or(AppError::ChapterFileNotFound { number })?;

    read_chapter(pattern, number, &file_name, &path)
}
