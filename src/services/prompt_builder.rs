//! 提示词构建 - 业务能力层
//!
//! 纯字符串替换：合并文档原样插入模板中唯一的 `{input_document}` 位置，
//! 不做任何转义，也不限制长度。

use crate::models::{CombinedDocument, Prompt};

const PLACEHOLDER: &str = "{input_document}";

/// 要求同时返回 test_types 与 uat_test_cases 的模板
const TEMPLATE_WITH_UAT: &str = r#"
    You are a QA specialist and test automation expert responsible for comprehensive test planning.

    A new feature/requirement or document has been provided that needs thorough testing coverage across multiple technical test types and UAT test cases.

    Feature Document:
    {input_document}

    Instructions:
    1. Analyze the provided feature document thoroughly
    2. Generate a comprehensive test plan focusing on technical test types including:
    - Unit Tests (individual component/function testing)
    - Integration Tests (component interaction testing)
    - UI Tests (user interface testing)
    - API Tests (endpoint and service testing)
    - End-to-End Tests (complete user workflow testing)
    - Performance Tests (load, stress, scalability testing)
    - Security Tests (vulnerability and penetration testing)
    - Database Tests (data integrity and CRUD operations)
    - Contract Tests (API contract validation)
    - Smoke Tests (basic functionality verification)
    3. Generate UAT (User Acceptance Test) cases that focus on business requirements validation
    4. For each test type, provide specific test cases with technical implementation details
    5. Include test frameworks, tools, and automation approaches
    6. Consider edge cases, error scenarios, and boundary conditions

    Return the response in this JSON format:
    {
    "test_types": [
    {
    "type": "string",
    "description": "string", 
    "test_cases": [
    {
    "name": "string",
    "objective": "string",
    "prerequisites": ["string"],
    "implementation_steps": ["string"],
    "expected_results": "string"
    }
    ]
    }
    ],
    "uat_test_cases": [
    {
    "test_case_id": "string",
    "test_case_name": "string",
    "test_objective": "string",
    "preconditions": "string",
    "test_steps": ["string"],
    "expected_result": "string",
    "actual_result": "string",
    "status": "string"
    }
    ]
    }
"#;

/// 只要求 test_types 的模板（UAT 作为其中一种测试类型）
const TEMPLATE_TECHNICAL_ONLY: &str = r#"
You are a QA specialist and test automation expert responsible for comprehensive test planning.

A new feature/requirement or document has been provided that needs thorough testing coverage across multiple technical test types and UAT test cases.

Feature Document:
{input_document}

Instructions:
1. Analyze the provided feature document thoroughly
2. Generate a comprehensive test plan focusing on technical test types including:
   - Unit Tests (individual component/function testing)
   - Integration Tests (component interaction testing)
   - UI Tests (user interface testing)
   - API Tests (endpoint and service testing)
   - End-to-End Tests (complete user workflow testing)
   - Performance Tests (load, stress, scalability testing)
   - Security Tests (vulnerability and penetration testing)
   - Database Tests (data integrity and CRUD operations)
   - Contract Tests (API contract validation)
   - Smoke Tests (basic functionality verification)
   - UAT Tests (User Acceptance Test cases for business requirements validation)
3. For each test type, provide specific test cases with technical implementation details
4. Include test frameworks, tools, and automation approaches
5. Consider edge cases, error scenarios, and boundary conditions

Return the response in this JSON format:
{
"test_types": [
{
"type": "string",
"description": "string", 
"test_cases": [
{
"name": "string",
"objective": "string",
"prerequisites": ["string"],
"implementation_steps": ["string"],
"expected_results": "string"
}
]
}
]
}
"#;

/// 模板选择
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptTemplate {
    #[default]
    WithUat,
    TechnicalOnly,
}

impl PromptTemplate {
    pub fn from_include_uat(include_uat_cases: bool) -> Self {
        if include_uat_cases {
            PromptTemplate::WithUat
        } else {
            PromptTemplate::TechnicalOnly
        }
    }

    fn text(self) -> &'static str {
        match self {
            PromptTemplate::WithUat => TEMPLATE_WITH_UAT,
            PromptTemplate::TechnicalOnly => TEMPLATE_TECHNICAL_ONLY,
        }
    }

    /// 渲染提示词
    pub fn build_prompt(self, combined: &CombinedDocument) -> Prompt {
        build_prompt_with(self.text(), combined.as_str())
    }
}

/// 使用默认模板渲染提示词
pub fn build_prompt(combined: &CombinedDocument) -> Prompt {
    PromptTemplate::default().build_prompt(combined)
}

// 只在模板本身上替换一次，文档里出现的占位符不会被再次展开
fn build_prompt_with(template: &str, document: &str) -> Prompt {
    Prompt::new(template.replacen(PLACEHOLDER, document, 1))
}
