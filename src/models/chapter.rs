/// 一章小说
///
/// 由分章服务或章节加载器创建，创建后不再修改。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterRecord {
    number: u32,
    title: Option<String>,
    body: String,
}

impl ChapterRecord {
    pub fn new(number: u32, title: Option<String>, body: impl Into<String>) -> Self {
        Self {
            number,
            title,
            body: body.into(),
        }
    }

    /// 章节号，从 1 开始，在一部小说内唯一
    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// 章节全文，以标题行开头
    pub fn body(&self) -> &str {
        &self.body
    }
}
