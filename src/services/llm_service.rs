//! LLM 服务 - 业务能力层
//!
//! 只负责"分析一段文本"能力（单章分析或多章大纲），不关心批次和保存
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Moonshot, GLM, Qwen 等）

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::AnalysisError;
use crate::services::analysis::{AnalysisOutput, AnalysisService};

/// 分析任务类型，决定提示词
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisTask {
    /// 单章分析：情节、人物、伏笔
    Chapter,
    /// 多章章纲合并为阶段大纲
    Outline,
}

impl AnalysisTask {
    fn system_prompt(self) -> &'static str {
        match self {
            Self::Chapter => "你是一名专业的小说分析师，擅长从读者视角拆解和分析小说内容。",
            Self::Outline => "你是一名专业的小说分析师，擅长从章纲中梳理故事脉络和事件发展。",
        }
    }

    /// 构建提示词
    fn build_prompt(self, text: &str) -> String {
        match self {
            Self::Chapter => format!(
                "请从读者的角度分析下面的小说章节，回答要清晰、结构化，简洁但完整。\n\n\
                 **章节内容**：\n{text}\n\n\
                 **要求**：\n\
                 1. 主要情节：概括本章情节，把握剧情走向。\n\
                 2. 人物分析：列出本章出场人物，分析性格特征及相互关系。\n\
                 3. 伏笔：指出可能暗示后续情节的细节。\n\n\
                 请直接给出分析结果，不要复述要求。"
            ),
            Self::Outline => format!(
                "下面是一部小说连续多个章节的分析结果，请把它们整合成这一阶段的大纲。\n\n\
                 **章纲内容**：\n{text}\n\n\
                 **要求**：\n\
                 1. 主要情节：合并各章情节，略去环境、心理、外貌描写。\n\
                 2. 事件脉络：按顺序列出推动剧情的事件，写明起因、经过、高潮、结果。\n\
                 3. 人物分析：合并去重全部人物，区分主角、配角、龙套，说明性格与关系。\n\
                 4. 伏笔：只列出与主角和主要配角相关、前后照应的伏笔。\n\n\
                 请直接给出大纲，不要复述要求。"
            ),
        }
    }
}

/// LLM 服务
///
/// 职责：
/// - 按任务类型把文本组装成提示词
/// - 调用兼容 OpenAI 的接口
/// - 超时、空响应都视为失败
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
    task: AnalysisTask,
}

impl LlmService {
    /// 创建单章分析服务
    pub fn new(config: &Config) -> Self {
        Self::for_task(config, AnalysisTask::Chapter)
    }

    /// 创建阶段大纲服务
    pub fn outline(config: &Config) -> Self {
        Self::for_task(config, AnalysisTask::Outline)
    }

    pub fn for_task(config: &Config, task: AnalysisTask) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
            timeout: config.request_timeout(),
            task,
        }
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（已去除首尾空白）
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
    ) -> Result<String, AnalysisError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.chars().count());

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(request_error)?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(request_error)?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(request_error)?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            request_error(e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| AnalysisError::new(format!("LLM 返回内容为空 (模型: {})", self.model_name)))?;

        Ok(content)
    }
}

#[async_trait]
impl AnalysisService for LlmService {
    async fn analyze(&self, chapter_text: &str) -> Result<AnalysisOutput, AnalysisError> {
        let prompt = self.task.build_prompt(chapter_text);
        let system = self.task.system_prompt();
        let text = tokio::time::timeout(self.timeout, self.send_to_llm(&prompt, Some(system)))
            .await
            .map_err(|_| AnalysisError::new(format!("LLM 请求超时 ({} 秒)", self.timeout.as_secs())))??;
        Ok(AnalysisOutput::new(text))
    }
}

fn request_error(err: OpenAIError) -> AnalysisError {
    AnalysisError::new(format!("LLM API 调用失败: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_chapter() {
        let prompt = AnalysisTask::Chapter.build_prompt("第一章 开端\n主角登场。");
        assert!(prompt.contains("第一章 开端\n主角登场。"));
        assert!(prompt.contains("伏笔"));
    }

    #[test]
    fn test_outline_prompt_differs() {
        let prompt = AnalysisTask::Outline.build_prompt("小说章节分析结果");
        assert!(prompt.contains("**章纲内容**：\n小说章节分析结果"));
        assert!(prompt.contains("事件脉络"));
        assert_ne!(
            AnalysisTask::Outline.system_prompt(),
            AnalysisTask::Chapter.system_prompt()
        );
        assert_eq!(LlmService::outline(&Config::default()).task, AnalysisTask::Outline);
    }

    #[test]
    fn test_new_uses_config() {
        let config = Config {
            llm_model_name: "glm-4-air".to_string(),
            request_timeout_secs: 30,
            ..Config::default()
        };
        let service = LlmService::new(&config);
        assert_eq!(service.model_name, "glm-4-air");
        assert_eq!(service.timeout, Duration::from_secs(30));
        assert_eq!(service.task, AnalysisTask::Chapter);
    }

    /// 测试真实 LLM 调用
    ///
    /// 运行方式：
    /// ```bash
    /// LLM_API_KEY=... cargo test test_analyze_live -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_analyze_live() {
        let _ = tracing_subscriber::fmt::try_init();

        let service = LlmService::new(&Config::from_env());
        let result = service
            .analyze("第一章 开端\n少年背着剑走出山门，回头望了一眼。")
            .await;

        match result {
            Ok(output) => {
                println!("{}", output.text);
                assert!(!output.text.is_empty());
            }
            Err(e) => panic!("LLM 调用失败: {}", e),
        }
    }
}
