//! 测试计划的宽松视图
//!
//! 模型可能漏字段、多字段或给错类型，这里统一补默认值：
//! 缺失的字符串为空串，缺失的列表为空列表，单个字符串当作单元素列表。

use serde_json::{Map, Value};

use crate::models::TestPlan;

/// 技术测试用例
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestCaseView {
    pub name: String,
    pub objective: String,
    pub prerequisites: Vec<String>,
    pub implementation_steps: Vec<String>,
    pub expected_results: String,
}

/// 一种测试类型及其用例
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestTypeView {
    pub type_name: String,
    pub description: String,
    pub test_cases: Vec<TestCaseView>,
}

impl TestTypeView {
    /// 类型名中包含 UAT（不区分大小写）即视为 UAT 分组
    pub fn is_uat(&self) -> bool {
        self.type_name.to_uppercase().contains("UAT")
    }
}

/// UAT 用例
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UatCaseView {
    pub test_case_id: String,
    pub test_case_name: String,
    pub test_objective: String,
    pub preconditions: String,
    pub test_steps: Vec<String>,
    pub expected_result: String,
    pub actual_result: String,
    pub status: String,
}

/// 展示用视图
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanView {
    Structured {
        test_types: Vec<TestTypeView>,
        uat_test_cases: Vec<UatCaseView>,
    },
    Raw(String),
}

impl PlanView {
    pub fn from_plan(plan: &TestPlan) -> Self {
        match plan {
            TestPlan::RawFallback { raw_text } => PlanView::Raw(raw_text.clone()),
            TestPlan::Structured(map) => PlanView::Structured {
                test_types: objects(map, "test_types").map(test_type).collect(),
                uat_test_cases: objects(map, "uat_test_cases").map(uat_case).collect(),
            },
        }
    }

    /// 技术测试用例总数（不含 uat_test_cases）
    pub fn test_case_count(&self) -> usize {
        match self {
            PlanView::Structured { test_types, .. } => {
                test_types.iter().map(|t| t.test_cases.len()).sum()
            }
            PlanView::Raw(_) => 0,
        }
    }
}

fn test_type(obj: &Map<String, Value>) -> TestTypeView {
    TestTypeView {
        type_name: text(obj, "type"),
        description: text(obj, "description"),
        test_cases: objects(obj, "test_cases").map(test_case).collect(),
    }
}

fn test_case(obj: &Map<String, Value>) -> TestCaseView {
    TestCaseView {
        name: text(obj, "name"),
        objective: text(obj, "objective"),
        prerequisites: list(obj, "prerequisites"),
        implementation_steps: list(obj, "implementation_steps"),
        expected_results: text(obj, "expected_results"),
    }
}

fn uat_case(obj: &Map<String, Value>) -> UatCaseView {
    UatCaseView {
        test_case_id: text(obj, "test_case_id"),
        test_case_name: text(obj, "test_case_name"),
        test_objective: text(obj, "test_objective"),
        preconditions: text(obj, "preconditions"),
        test_steps: list(obj, "test_steps"),
        expected_result: text(obj, "expected_result"),
        actual_result: text(obj, "actual_result"),
        status: text(obj, "status"),
    }
}

/// 数组字段中的所有对象元素（非对象元素跳过）
fn objects<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
) -> impl Iterator<Item = &'a Map<String, Value>> + 'a {
    obj.get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

fn text(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key).map(scalar_to_string).unwrap_or_default()
}

fn list(obj: &Map<String, Value>, key: &str) -> Vec<String> {
    match obj.get(key) {
        Some(Value::Array(items)) => items.iter().map(scalar_to_string).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => vec![scalar_to_string(other)],
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
