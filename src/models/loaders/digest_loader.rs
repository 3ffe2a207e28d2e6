//! 读取分析结果的可读版（`detail/<n>.txt`），作为大纲阶段的输入
//!
//! 每个文件对应一个保存窗口，文件名的数字前缀即窗口序号。
//! 出错兜底文件（`error_save_*`）不参与大纲生成。

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::models::chapter::ChapterRecord;
use crate::models::loaders::chapter_loader::list_txt_files;
use crate::services::result_store::ERROR_SAVE_PREFIX;

/// 文件名开头的十进制数字：`3.txt` → 3
fn leading_number(file_name: &str) -> Option<u32> {
    let digits: String = file_name.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// 加载全部窗口摘要，按序号升序返回
pub fn load_digests(input_dir: &Path) -> AppResult<Vec<ChapterRecord>> {
    if !input_dir.is_dir() {
        return Err(AppError::MissingInput {
            path: input_dir.to_path_buf(),
        });
    }

    let mut digests: BTreeMap<u32, (String, ChapterRecord)> = BTreeMap::new();
    for (file_name, path) in list_txt_files(input_dir)? {
        if file_name.starts_with(ERROR_SAVE_PREFIX) {
            debug!("跳过出错兜底文件: {}", file_name);
            continue;
        }

        let number = leading_number(&file_name)
            .filter(|n| *n >= 1)
            .ok_or_else(|| AppError::InvalidChapterFile {
                file: file_name.clone(),
            })?;

        let content = fs::read_to_string(&path).map_err(|e| AppError::persistence(&path, e))?;
        if content.trim().is_empty() {
            return Err(AppError::EmptyChapter { file: file_name });
        }

        let digest = ChapterRecord::new(number, None, content);
        match digests.entry(number) {
            Entry::Vacant(slot) => {
                slot.insert((file_name, digest));
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

    if digests.is_empty() {
        return Err(AppError::EmptyCorpus {
            path: input_dir.to_path_buf(),
        });
    }

    info!("共找到 {} 份章纲", digests.len());
    Ok(digests.into_values().map(|(_, digest)| digest).collect())
}
