//! Prompt text and user-facing strings for newsdigest
//!
//! Prompt wording lives here so the Chinese and English variants stay side by side.

use crate::domain::{flatten_groups, GroupStat, ProcessedGroups};
use crate::infra::config::Language;

/// Titles kept per group to bound the prompt size.
pub const MAX_TITLES_PER_GROUP: usize = 5;

// Chat prompts
pub const SYSTEM_PROMPT_ZH: &str = "你是一个专业的新闻分析助手。请对提供的新闻标题进行分析总结，要求语言精练，但内容充实。请使用Markdown格式输出。";
pub const SYSTEM_PROMPT_EN: &str = "You are a professional news analysis assistant. Analyze and summarize the provided news headlines. Keep the language concise but the content substantive. Format the output as Markdown.";
pub const PREAMBLE_ZH: &str = "请对以下新闻进行简练而充实的总结，按话题分类概括主要内容：\n\n";
pub const PREAMBLE_EN: &str = "Summarize the following news concisely but substantively, grouping the main points by topic:\n\n";

// CLI Messages
pub const MSG_NO_SUMMARY: &str = "No summary produced";
pub const MSG_NO_API_KEY: &str = "No API key configured";
pub const MSG_API_KEY_INSTRUCTION: &str = "Set this environment variable:\n  export NEWSDIGEST_API_KEY=your-key";
pub const MSG_CONFIG_CREATED: &str = "✓ Configuration created";
pub const MSG_CONFIG_EXISTS: &str = "Configuration already present, left untouched";

// Configuration File Content
pub const DEFAULT_CONFIG_CONTENT: &str = r#"# newsdigest configuration
# API key is read from NEWSDIGEST_API_KEY when not set here

base_url: https://api.deepseek.com
model: deepseek-chat
language: zh  # prompt language (zh, en)
"#;

pub fn system_prompt(language: Language) -> &'static str {
    match language {
        Language::Zh => SYSTEM_PROMPT_ZH,
        Language::En => SYSTEM_PROMPT_EN,
    }
}

fn preamble(language: Language) -> &'static str {
    match language {
        Language::Zh => PREAMBLE_ZH,
        Language::En => PREAMBLE_EN,
    }
}

/// Render the user prompt for `groups`, or `None` when there is nothing to summarize.
pub fn render_prompt(groups: &[GroupStat], language: Language) -> Option<String> {
    if groups.is_empty() {
        return None;
    }

    let items = flatten_groups(groups);
    if items.is_empty() {
        return None;
    }

    let processed = ProcessedGroups::from_items(items, MAX_TITLES_PER_GROUP);

    let mut prompt = String::from(preamble(language));
    for (group, items) in processed.iter() {
        prompt.push_str(&format!("【{}】\n", group));
        for item in items {
            prompt.push_str(&format!("- {}\n", item.title));
        }
        prompt.push('\n');
    }

    Some(prompt)
}
