//! 分析结果存储 - 业务能力层
//!
//! 每个保存窗口写两份文件：
//! - `<首章>-<末章>章.json`：完整的结构化结果
//! - `<序号>.txt`：按章节号排列的可读版本

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::models::AnalysisResult;

/// 可读版本的首行
pub const TEXT_HEADER: &str = "小说章节分析结果";

/// 出错兜底文件的前缀
pub const ERROR_SAVE_PREFIX: &str = "error_save_";

const STAGING_DIR: &str = ".staging";

/// 一次保存产生的两个文件名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchKey {
    pub json_file: String,
    pub text_file: String,
}

/// 分析结果存储
///
/// 职责：
/// - 写入一个窗口的结果（json + txt）
/// - 出错时写入带 `error_save_` 前缀的兜底文件
/// - 读回全部结构化结果
/// - 重试后整体重写
pub struct ResultStore {
    dir: PathBuf,
}

impl ResultStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 确保输出目录存在
    pub fn ensure_dir(&self) -> AppResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| AppError::persistence(&self.dir, e))
    }

    /// 保存一个窗口，`index` 为本次运行内的递增序号
    pub fn write_window(&self, results: &[AnalysisResult], index: usize) -> AppResult<BatchKey> {
        let key = BatchKey {
            json_file: format!("{}.json", range_name(results)),
            text_file: format!("{}.txt", index),
        };
        write_pair(&self.dir, &key, results)?;
        info!("已保存 {} / {}", key.json_file, key.text_file);
        Ok(key)
    }

    /// 出错时保存本次运行已累积的全部结果
    pub fn write_error_save(&self, results: &[AnalysisResult]) -> AppResult<BatchKey> {
        let merge_name = format!("{}{}", ERROR_SAVE_PREFIX, range_name(results));
        let key = BatchKey {
            json_file: format!("{}.json", merge_name),
            text_file: format!("{}.txt", merge_name),
        };
        write_pair(&self.dir, &key, results)?;
        info!("已保存出错前的结果: {}", key.json_file);
        Ok(key)
    }

    /// 读取目录下全部结构化结果并按章节号合并，同一章以后读到的为准
    ///
    /// 出错兜底文件先读，正常窗口后读，之后成功完成的运行会覆盖兜底结果。
    pub fn load_all(&self) -> AppResult<Vec<AnalysisResult>> {
        if !self.dir.is_dir() {
            return Err(AppError::MissingInput {
                path: self.dir.clone(),
            });
        }

        let (error_saves, windows): (Vec<_>, Vec<_>) = self
            .batch_files(|ext| ext == "json")?
            .into_iter()
            .partition(|path| is_error_save(path));

        let mut merged = BTreeMap::new();
        for path in error_saves.into_iter().chain(windows) {
            let content = fs::read_to_string(&path).map_err(|e| AppError::persistence(&path, e))?;
            let results: Vec<AnalysisResult> =
                serde_json::from_str(&content).map_err(|e| AppError::corrupt_batch(&path, e))?;
            debug!("读取 {}: {} 条结果", path.display(), results.len());
            for result in results {
                merged.insert(result.chapter_number, result);
            }
        }

        Ok(merged.into_values().collect())
    }

    /// 按 `merge_size` 重新分窗并覆盖全部结果文件
    ///
    /// 新文件先写入暂存目录，全部成功后再删除旧文件并移入，
    /// 暂存阶段失败时旧文件保持不变。
    pub fn rewrite(&self, results: &[AnalysisResult], merge_size: usize) -> AppResult<Vec<BatchKey>> {
        let staging = self.dir.join(STAGING_DIR);
        if staging.exists() {
            fs::remove_dir_all(&staging).map_err(|e| AppError::persistence(&staging, e))?;
        }
        fs::create_dir_all(&staging).map_err(|e| AppError::persistence(&staging, e))?;

        let mut sorted = results.to_vec();
        sorted.sort_by_key(|r| r.chapter_number);

        let mut keys = Vec::new();
        for (i, window) in sorted.chunks(merge_size.max(1)).enumerate() {
            let key = BatchKey {
                json_file: format!("{}.json", range_name(window)),
                text_file: format!("{}.txt", i + 1),
            };
            write_pair(&staging, &key, window)?;
            keys.push(key);
        }

        for old in self.batch_files(|ext| ext == "json" || ext == "txt")? {
            fs::remove_file(&old).map_err(|e| AppError::persistence(&old, e))?;
        }

        for key in &keys {
            for name in [&key.json_file, &key.text_file] {
                let target = self.dir.join(name);
                fs::rename(staging.join(name), &target).map_err(|e| AppError::persistence(&target, e))?;
            }
        }
        fs::remove_dir(&staging).map_err(|e| AppError::persistence(&staging, e))?;

        info!("所有结果文件重新生成完成，共 {} 个窗口", keys.len());
        Ok(keys)
    }

    /// 目录下扩展名满足条件的文件，按文件名排序
    fn batch_files(&self, keep: impl Fn(&str) -> bool) -> AppResult<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| AppError::persistence(&self.dir, e))?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| AppError::persistence(&self.dir, e))?.path();
            let matches = path.extension().and_then(|s| s.to_str()).is_some_and(&keep);
            if matches && path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

fn is_error_save(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .is_some_and(|name| name.starts_with(ERROR_SAVE_PREFIX))
}

/// `<首章>-<末章>章`
fn range_name(results: &[AnalysisResult]) -> String {
    let first = results.iter().map(|r| r.chapter_number).min().unwrap_or(0);
    let last = results.iter().map(|r| r.chapter_number).max().unwrap_or(0);
    format!("{}-{}章", first, last)
}

/// 生成可读版本，按章节号排列
pub fn render_text(results: &[AnalysisResult]) -> String {
    let mut sorted: Vec<&AnalysisResult> = results.iter().collect();
    sorted.sort_by_key(|r| r.chapter_number);

    let mut text = format!("{}\n\n", TEXT_HEADER);
    for result in sorted {
        text.push_str(&result.header());
        text.push('\n');
        match (&result.analysis, result.is_failed()) {
            (Some(analysis), false) => text.push_str(analysis),
            _ => {
                text.push_str("分析失败：");
                text.push_str(result.error.as_deref().unwrap_or("未知错误"));
            }
        }
        text.push_str("\n\n");
    }
    text
}

fn write_pair(dir: &Path, key: &BatchKey, results: &[AnalysisResult]) -> AppResult<()> {
    let json_path = dir.join(&key.json_file);
    let json = serde_json::to_string_pretty(results).map_err(|e| AppError::corrupt_batch(&json_path, e))?;
    fs::write(&json_path, json).map_err(|e| AppError::persistence(&json_path, e))?;

    let text_path = dir.join(&key.text_file);
    fs::write(&text_path, render_text(results)).map_err(|e| AppError::persistence(&text_path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use crate::models::ChapterRecord;

    fn ok(number: u32) -> AnalysisResult {
        let chapter = ChapterRecord::new(number, Some(format!("标题{}", number)), "正文");
        AnalysisResult::success(&chapter, format!("分析{}", number))
    }

    fn failed(number: u32) -> AnalysisResult {
        let chapter = ChapterRecord::new(number, None, "正文");
        AnalysisResult::failed(&chapter, &AnalysisError::new("timeout"))
    }

    #[test]
    fn test_render_text_orders_by_chapter() {
        let text = render_text(&[ok(3), failed(1)]);
        let expected = "小说章节分析结果\n\n第1章\n分析失败：timeout\n\n第3章 标题3\n分析3\n\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_write_and_load_window() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path());

        let key = store.write_window(&[ok(1), ok(2), failed(3)], 1).unwrap();
        assert_eq!(key.json_file, "1-3章.json");
        assert_eq!(key.text_file, "1.txt");

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded, vec![ok(1), ok(2), failed(3)]);
    }

    #[test]
    fn test_load_merges_duplicates_last_wins() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path());

        store.write_window(&[failed(1), ok(2)], 1).unwrap();
        // 1-3章.json 排在 1-2章.json 之后
        store.write_window(&[ok(1), ok(3)], 2).unwrap();

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded, vec![ok(1), ok(2), ok(3)]);
    }

    #[test]
    fn test_windows_override_stale_error_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path());

        // 中断的运行留下兜底文件，之后重新分析时第 1 章失败
        store.write_error_save(&[ok(1), ok(2)]).unwrap();
        store.write_window(&[failed(1), ok(2), ok(3)], 1).unwrap();

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded, vec![failed(1), ok(2), ok(3)]);
    }

    #[test]
    fn test_error_save_alone_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path());

        store.write_error_save(&[ok(1), failed(2)]).unwrap();
        assert_eq!(store.load_all().unwrap(), vec![ok(1), failed(2)]);
    }

    #[test]
    fn test_corrupt_batch_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("1-2章.json"), "not json").unwrap();

        let err = ResultStore::new(dir.path()).load_all().unwrap_err();
        assert!(matches!(err, AppError::CorruptBatch { .. }));
    }

    #[test]
    fn test_rewrite_replaces_all_windows() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path());

        store.write_window(&[ok(1), ok(2), ok(3)], 1).unwrap();
        store.write_window(&[ok(4), failed(5)], 2).unwrap();
        store.write_error_save(&[ok(1)]).unwrap();

        let all = vec![ok(5), ok(1), ok(2), ok(3), ok(4)];
        let keys = store.rewrite(&all, 2).unwrap();

        let names: Vec<_> = keys.iter().map(|k| k.json_file.as_str()).collect();
        assert_eq!(names, vec!["1-2章.json", "3-4章.json", "5-5章.json"]);

        let mut on_disk: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        on_disk.sort();
        assert_eq!(
            on_disk,
            vec!["1-2章.json", "1.txt", "2.txt", "3-4章.json", "3.txt", "5-5章.json"]
        );

        assert_eq!(store.load_all().unwrap(), vec![ok(1), ok(2), ok(3), ok(4), ok(5)]);
    }

    #[test]
    fn test_missing_dir_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path().join("detail"));
        assert!(matches!(store.load_all(), Err(AppError::MissingInput { .. })));
    }
}
