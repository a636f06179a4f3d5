//! タスク定義（ITaskDefinition）

use super::{Action, ExecAction, Principal, RegistrationInfo, TaskSettings, Trigger};

/// タスクの宣言的な内容。actions / triggers は順序を保持する。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Definition {
    pub actions: Vec<Action>,
    /// 複数アクション時に実行主体を指す Principal.id
    pub context: String,
    pub data: String,
    pub principal: Principal,
    pub registration_info: RegistrationInfo,
    pub settings: TaskSettings,
    pub triggers: Vec<Trigger>,
    pub xml_text: String,
}

impl Definition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_action(&mut self, action: impl Into<Action>) -> &mut Self {
        self.actions.push(action.into());
        self
    }

    pub fn add_trigger(&mut self, trigger: impl Into<Trigger>) -> &mut Self {
        self.triggers.push(trigger.into());
        self
    }

    /// プログラム実行アクションを追加する
    pub fn add_exec_action(
        &mut self,
        path: impl Into<String>,
        args: impl Into<String>,
        working_dir: impl Into<String>,
    ) -> &mut Self {
        self.add_action(ExecAction::new(path, args, working_dir))
    }

    /// 最初の実行アクション（一覧表示用）
    pub fn primary_action(&self) -> Option<&Action> {
        self.actions.first()
    }
}
