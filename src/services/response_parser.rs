//! 响应解析 - 业务能力层
//!
//! 解析是全函数：任何输入都会得到一个可展示的 `TestPlan`，从不报错。
//!
//! 1. 严格解析整段文本为 JSON 对象
//! 2. 失败则尝试文本中的 ```json 代码块
//! 3. 仍失败则退化为 `{ "raw_text": ... }`

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::models::TestPlan;

fn fenced_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)```(?:json|JSON)?[ \t]*\r?\n(.*?)\r?\n?```").expect("static regex")
    })
}

/// 解析模型输出
pub fn parse(raw_text: &str) -> TestPlan {
    if let Some(map) = parse_object(raw_text) {
        debug!("响应为合法 JSON 对象 ({} 个字段)", map.len());
        return TestPlan::Structured(map);
    }

    if let Some(map) = fenced_block()
        .captures_iter(raw_text)
        .filter_map(|caps| caps.get(1))
        .find_map(|m| parse_object(m.as_str()))
    {
        debug!("从代码块中解析出 JSON 对象 ({} 个字段)", map.len());
        return TestPlan::Structured(map);
    }

    warn!(
        "响应无法解析为 JSON，使用原始文本 ({} 字符)",
        raw_text.chars().count()
    );
    TestPlan::raw(raw_text)
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}
