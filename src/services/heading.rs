//! 章节标题匹配规则
//!
//! 标题形如 `第十二章`、`第12回`、`第三百节`，位于行首。
//! 标记字符可配置，默认 `章节回` 三者等价。

use regex::{Match, Regex};

use crate::error::ConfigError;

/// 标题中允许出现的数字字符
const NUMERAL_CLASS: &str = "零〇一二两三四五六七八九十百千万0-9";

/// 编译好的标题匹配规则
#[derive(Debug, Clone)]
pub struct HeadingPattern {
    chapter: Regex,
    volume: Regex,
    file_token: Regex,
    file_prefix: Regex,
    title: Regex,
}

impl HeadingPattern {
    /// 根据章节标记字符构建匹配规则
    pub fn new(markers: &str) -> Result<Self, ConfigError> {
        let markers: String = markers
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| regex::escape(&c.to_string()))
            .collect();
        if markers.is_empty() {
            return Err(ConfigError::EmptyMarkers);
        }

        let build = |pattern: String| {
            Regex::new(&pattern).map_err(|source| ConfigError::InvalidHeadingPattern { source })
        };

        Ok(Self {
            chapter: build(format!("(?m)^第[{NUMERAL_CLASS}]+[{markers}]"))?,
            volume: build(format!("(?m)^第[{NUMERAL_CLASS}]+卷"))?,
            file_token: build(format!("第([0-9]+)[{markers}]"))?,
            file_prefix: build("^([0-9]+)".to_string())?,
            title: build(format!(
                "(?m)^第[{NUMERAL_CLASS}]+[{markers}][ \\t\\x{{3000}}]*([^\\r\\n]+)"
            ))?,
        })
    }

    /// 按章节标题切分，标题行属于其后的片段；第一个标题之前的内容被丢弃
    pub fn split_chapters<'a>(&self, text: &'a str) -> Vec<(&'a str, &'a str)> {
        split_at_matches(&self.chapter, text)
    }

    /// 按卷标题切分，规则同上
    pub fn split_volumes<'a>(&self, text: &'a str) -> Vec<(&'a str, &'a str)> {
        split_at_matches(&self.volume, text)
    }

    /// 从文件名中解析章节号：数字前缀或 `第N章` 字样
    pub fn chapter_number_from_file_name(&self, file_name: &str) -> Option<u32> {
        let stem = file_name.strip_suffix(".txt").unwrap_or(file_name);
        self.file_prefix
            .captures(stem)
            .or_else(|| self.file_token.captures(stem))
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    /// 从章节内容中提取标题后的章节名
    pub fn title_from_content(&self, content: &str) -> Option<String> {
        self.title
            .captures(content)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|title| !title.is_empty())
    }
}

/// 在每个匹配位置之前切分，返回 (匹配文本, 片段)
fn split_at_matches<'a>(pattern: &Regex, text: &'a str) -> Vec<(&'a str, &'a str)> {
    let matches: Vec<Match<'a>> = pattern.find_iter(text).collect();
    matches
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let end = matches.get(i + 1).map_or(text.len(), |next| next.start());
            (m.as_str(), &text[m.start()..end])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern() -> HeadingPattern {
        HeadingPattern::new("章节回").unwrap()
    }

    #[test]
    fn test_split_discards_preface() {
        let text = "序言\n第一章 开端\n内容一\n第二章 继续\n内容二\n";
        let parts = pattern().split_chapters(text);

        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].0, "第一章");
        assert_eq!(parts[0].1, "第一章 开端\n内容一\n");
        assert_eq!(parts[1].0, "第二章");
    }

    #[test]
    fn test_heading_must_start_line() {
        let text = "第1章\n他说到第2章的时候\n第3回 结尾";
        let headings: Vec<_> = pattern().split_chapters(text).into_iter().map(|(h, _)| h).collect();
        assert_eq!(headings, vec!["第1章", "第3回"]);
    }

    #[test]
    fn test_custom_markers() {
        let only_hui = HeadingPattern::new("回").unwrap();
        let text = "第一章 不算\n第一回 算";
        assert_eq!(only_hui.split_chapters(text).len(), 1);
        assert!(HeadingPattern::new("  ").is_err());
    }

    #[test]
    fn test_file_names() {
        let p = pattern();
        assert_eq!(p.chapter_number_from_file_name("第12章.txt"), Some(12));
        assert_eq!(p.chapter_number_from_file_name("第007章.txt"), Some(7));
        assert_eq!(p.chapter_number_from_file_name("15.txt"), Some(15));
        assert_eq!(p.chapter_number_from_file_name("notes.txt"), None);
    }

    #[test]
    fn test_title_from_content() {
        let p = pattern();
        assert_eq!(p.title_from_content("第十二章　风起\n正文"), Some("风起".to_string()));
        assert_eq!(p.title_from_content("第12章 风起 \n正文"), Some("风起".to_string()));
        assert_eq!(p.title_from_content("第12章\n正文"), None);
    }
}
