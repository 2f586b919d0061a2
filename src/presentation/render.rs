//! 终端输出
//!
//! UAT 分组用 ✅ 标记，技术测试分组用 🔧 标记；
//! 原始文本计划按原样输出。

use std::fmt::Write;

use crate::presentation::session::{PlanSession, TestCaseKey};
use crate::presentation::view::{PlanView, TestCaseView, TestTypeView, UatCaseView};

/// 渲染计划为纯文本
///
/// 给定会话时用会话中的完成状态显示复选框，未展开的分组只列出用例名；
/// 不给会话时输出全部详情
pub fn render_plan(view: &PlanView, session: Option<&PlanSession>) -> String {
    let (test_types, uat_cases) = match view {
        PlanView::Raw(text) => return format!("{}\n", text),
        PlanView::Structured {
            test_types,
            uat_test_cases,
        } => (test_types, uat_test_cases),
    };

    let mut out = String::new();
    if test_types.is_empty() && uat_cases.is_empty() {
        out.push_str("(测试计划为空)\n");
        return out;
    }

    for section in test_types {
        render_section(&mut out, section, session);
    }

    if !uat_cases.is_empty() {
        let _ = writeln!(out, "✅ UAT Test Cases");
        for case in uat_cases {
            render_uat_case(&mut out, case);
        }
    }

    if let Some(session) = session {
        let _ = writeln!(
            out,
            "进度: {}/{} 个用例已完成",
            session.completed_count(),
            view.test_case_count()
        );
    }

    out
}

fn render_section(out: &mut String, section: &TestTypeView, session: Option<&PlanSession>) {
    let icon = if section.is_uat() { "✅" } else { "🔧" };
    let _ = writeln!(out, "{} {}", icon, section.type_name);
    if !section.description.is_empty() {
        let _ = writeln!(out, "   {}", section.description);
    }

    let expanded = session.map_or(true, |s| s.is_expanded(&section.type_name));
    for (i, case) in section.test_cases.iter().enumerate() {
        let key = TestCaseKey::new(section.type_name.clone(), i + 1);
        let done = session.map(|s| s.is_completed(&key)).unwrap_or(false);
        render_case(out, i + 1, case, done, expanded);
    }
    out.push('\n');
}

fn render_case(out: &mut String, number: usize, case: &TestCaseView, done: bool, details: bool) {
    let mark = if done { "[x]" } else { "[ ]" };
    let _ = writeln!(out, "  {} {}. {}", mark, number, case.name);
    if !details {
        return;
    }
    if !case.objective.is_empty() {
        let _ = writeln!(out, "      目标: {}", case.objective);
    }
    render_list(out, "前置条件", &case.prerequisites);
    render_list(out, "实施步骤", &case.implementation_steps);
    if !case.expected_results.is_empty() {
        let _ = writeln!(out, "      预期结果: {}", case.expected_results);
    }
}

fn render_uat_case(out: &mut String, case: &UatCaseView) {
    let _ = writeln!(out, "  [{}] {}", case.test_case_id, case.test_case_name);
    if !case.test_objective.is_empty() {
        let _ = writeln!(out, "      目标: {}", case.test_objective);
    }
    if !case.preconditions.is_empty() {
        let _ = writeln!(out, "      前置条件: {}", case.preconditions);
    }
    render_list(out, "测试步骤", &case.test_steps);
    if !case.expected_result.is_empty() {
        let _ = writeln!(out, "      预期结果: {}", case.expected_result);
    }
    if !case.status.is_empty() {
        let _ = writeln!(out, "      状态: {}", case.status);
    }
}

fn render_list(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "      {}:", title);
    for (i, item) in items.iter().enumerate() {
        let _ = writeln!(out, "        {}. {}", i + 1, item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TestPlan;
    use crate::services::response_parser::parse;

    #[test]
    fn test_raw_text_printed_as_is() {
        let view = PlanView::from_plan(&TestPlan::raw("model said hi"));
        assert_eq!(render_plan(&view, None), "model said hi\n");
    }

    #[test]
    fn test_section_icons_and_checkboxes() {
        let plan = parse(
            r#"{"test_types": [
                {"type": "Unit Tests", "test_cases": [{"name": "a"}, {"name": "b", "implementation_steps": ["run"]}]},
                {"type": "UAT Tests", "test_cases": [{"name": "c"}]}
            ]}"#,
        );
        let mut session = PlanSession::new();
        session.set_plan(plan.clone());
        session.toggle_completed(TestCaseKey::new("Unit Tests", 2));

        let out = render_plan(&PlanView::from_plan(&plan), Some(&session));
        assert!(out.contains("🔧 Unit Tests"));
        assert!(out.contains("✅ UAT Tests"));
        assert!(out.contains("[ ] 1. a"));
        assert!(out.contains("[x] 2. b"));
        assert!(out.contains("        1. run"));
        assert!(out.contains("进度: 1/3"));
    }

    #[test]
    fn test_collapsed_section_lists_names_only() {
        let plan = parse(
            r#"{"test_types": [
                {"type": "Unit Tests", "test_cases": [{"name": "a", "objective": "check a"}]},
                {"type": "API Tests", "test_cases": [{"name": "b", "objective": "check b"}]}
            ]}"#,
        );
        let mut session = PlanSession::new();
        session.set_plan(plan.clone());
        session.toggle_expanded("API Tests");

        let out = render_plan(&PlanView::from_plan(&plan), Some(&session));
        assert!(out.contains("[ ] 1. a"));
        assert!(!out.contains("目标: check a"));
        assert!(out.contains("目标: check b"));

        session.toggle_expanded("API Tests");
        let out = render_plan(&PlanView::from_plan(&plan), Some(&session));
        assert!(!out.contains("目标: check b"));

        let out = render_plan(&PlanView::from_plan(&plan), None);
        assert!(out.contains("目标: check a") && out.contains("目标: check b"));
    }

    #[test]
    fn test_uat_cases_rendered() {
        let plan = parse(
            r#"{"test_types": [], "uat_test_cases": [{"test_case_id": "UAT-1", "test_case_name": "Login", "status": "Not Run"}]}"#,
        );
        let out = render_plan(&PlanView::from_plan(&plan), None);
        assert!(out.contains("✅ UAT Test Cases"));
        assert!(out.contains("[UAT-1] Login"));
        assert!(out.contains("状态: Not Run"));
    }

    #[test]
    fn test_empty_plan() {
        let out = render_plan(&PlanView::from_plan(&parse("{}")), None);
        assert_eq!(out, "(测试计划为空)\n");
    }
}
