//! 展示会话状态
//!
//! 保存最近一次生成的计划、生成时间、已完成用例与展开的分组。
//! 新计划会清空完成与展开状态；只有 `set_plan` 会替换计划，生成失败时调用方不调用它，已有状态保持不变。

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local};
use tracing::info;

use crate::models::TestPlan;
use crate::presentation::view::PlanView;

/// 用例标识：分组名 + 从 1 开始的序号
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TestCaseKey {
    pub section: String,
    pub index: usize,
}

impl TestCaseKey {
    pub fn new(section: impl Into<String>, index: usize) -> Self {
        Self {
            section: section.into(),
            index,
        }
    }
}

/// 解析 `分组名:序号`，分组名中可以包含冒号
impl FromStr for TestCaseKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (section, index) = s
            .rsplit_once(':')
            .ok_or_else(|| format!("expected SECTION:INDEX, got '{}'", s))?;
        let index: usize = index
            .trim()
            .parse()
            .map_err(|_| format!("invalid test case index in '{}'", s))?;
        if index == 0 || section.trim().is_empty() {
            return Err(format!("expected SECTION:INDEX with INDEX >= 1, got '{}'", s));
        }
        Ok(Self::new(section.trim(), index))
    }
}

impl fmt::Display for TestCaseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.section, self.index)
    }
}

/// 一个用户会话内的展示状态
#[derive(Debug, Clone, Default)]
pub struct PlanSession {
    plan: Option<TestPlan>,
    generated_at: Option<DateTime<Local>>,
    completed: HashSet<TestCaseKey>,
    expanded: HashSet<String>,
}

impl PlanSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plan(&self) -> Option<&TestPlan> {
        self.plan.as_ref()
    }

    pub fn view(&self) -> Option<PlanView> {
        self.plan.as_ref().map(PlanView::from_plan)
    }

    pub fn generated_at(&self) -> Option<DateTime<Local>> {
        self.generated_at
    }

    /// 记录新计划，清空完成与展开状态
    pub fn set_plan(&mut self, plan: TestPlan) {
        self.plan = Some(plan);
        self.generated_at = Some(Local::now());
        self.completed.clear();
        self.expanded.clear();
        info!("✓ 测试计划已更新");
    }

    /// 切换用例完成状态，返回切换后的状态
    pub fn toggle_completed(&mut self, key: TestCaseKey) -> bool {
        if self.completed.remove(&key) {
            false
        } else {
            self.completed.insert(key);
            true
        }
    }

    pub fn is_completed(&self, key: &TestCaseKey) -> bool {
        self.completed.contains(key)
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    /// 切换分组的展开状态
    pub fn toggle_expanded(&mut self, section: &str) -> bool {
        if self.expanded.remove(section) {
            false
        } else {
            self.expanded.insert(section.to_string());
            true
        }
    }

    /// 分组被手动展开，或其中有已完成的用例时视为展开
    pub fn is_expanded(&self, section: &str) -> bool {
        self.expanded.contains(section) || self.completed.iter().any(|k| k.section == section)
    }
}
