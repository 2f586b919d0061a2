//! 展示层：测试计划的视图、会话状态与终端输出

pub mod render;
pub mod session;
pub mod view;

pub use render::render_plan;
pub use session::{PlanSession, TestCaseKey};
pub use view::{PlanView, TestCaseView, TestTypeView, UatCaseView};
