//! 测试计划
//!
//! 模型输出的结构不做强制校验：能解析成 JSON 对象就原样信任，
//! 否则退化为原始文本。字段的默认值处理放在展示层（`presentation::PlanView`）。

use serde::Serialize;
use serde_json::{Map, Value};

/// 最终交给展示层的测试计划
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TestPlan {
    /// 解析成功的 JSON 对象（字段全部视为可选）
    Structured(Map<String, Value>),
    /// 无法解析时的原始文本
    RawFallback { raw_text: String },
}

impl TestPlan {
    pub fn raw(raw_text: impl Into<String>) -> Self {
        TestPlan::RawFallback {
            raw_text: raw_text.into(),
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, TestPlan::Structured(_))
    }

    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        match self {
            TestPlan::Structured(map) => Some(map),
            TestPlan::RawFallback { .. } => None,
        }
    }

    pub fn raw_text(&self) -> Option<&str> {
        match self {
            TestPlan::Structured(_) => None,
            TestPlan::RawFallback { raw_text } => Some(raw_text),
        }
    }

    /// 转为 JSON 值（原始文本形式为 `{"raw_text": ...}`）
    pub fn to_value(&self) -> Value {
        match self {
            TestPlan::Structured(map) => Value::Object(map.clone()),
            TestPlan::RawFallback { raw_text } => serde_json::json!({ "raw_text": raw_text }),
        }
    }
}
