//! アクション（タスクがトリガー時に行う1ステップ）
//!
//! ネイティブの IAction 階層は判別子（IAction::Type）でディスパッチする閉じた集合なので、
//! 直和型 `Action` として表現する。

use super::ActionType;

/// 全アクション共通の基底フィールド（IAction）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskAction {
    pub id: String,
}

/// プログラム実行（IExecAction）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecAction {
    pub base: TaskAction,
    pub path: String,
    pub args: String,
    pub working_dir: String,
}

/// COM ハンドラ起動（IComHandlerAction）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComHandlerAction {
    pub base: TaskAction,
    pub class_id: String,
    pub data: String,
}

/// メール送信（IEmailAction、OS 側では非推奨）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EmailAction {
    pub base: TaskAction,
    pub server: String,
    pub subject: String,
    pub to: String,
    pub cc: String,
    pub bcc: String,
    pub reply_to: String,
    pub from: String,
    pub body: String,
}

/// メッセージ表示（IShowMessageAction、OS 側では非推奨）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageAction {
    pub base: TaskAction,
    pub title: String,
    pub message: String,
}

impl ExecAction {
    pub const TYPE: ActionType = ActionType::Exec;

    pub fn new(path: impl Into<String>, args: impl Into<String>, working_dir: impl Into<String>) -> Self {
        Self {
            base: TaskAction::default(),
            path: path.into(),
            args: args.into(),
            working_dir: working_dir.into(),
        }
    }
}

impl ComHandlerAction {
    pub const TYPE: ActionType = ActionType::ComHandler;
}

impl EmailAction {
    pub const TYPE: ActionType = ActionType::SendEmail;
}

impl MessageAction {
    pub const TYPE: ActionType = ActionType::ShowMessage;
}

/// アクション（閉じた直和型）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Exec(ExecAction),
    ComHandler(ComHandlerAction),
    SendEmail(EmailAction),
    ShowMessage(MessageAction),
}

impl Action {
    /// バリアントに対応するネイティブ種別
    pub fn action_type(&self) -> ActionType {
        match self {
            Self::Exec(_) => ExecAction::TYPE,
            Self::ComHandler(_) => ComHandlerAction::TYPE,
            Self::SendEmail(_) => EmailAction::TYPE,
            Self::ShowMessage(_) => MessageAction::TYPE,
        }
    }

    /// ネイティブの判別子（IAction::Type の値）
    pub fn type_code(&self) -> i32 {
        self.action_type().as_i32()
    }

    pub fn base(&self) -> &TaskAction {
        match self {
            Self::Exec(a) => &a.base,
            Self::ComHandler(a) => &a.base,
            Self::SendEmail(a) => &a.base,
            Self::ShowMessage(a) => &a.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut TaskAction {
        match self {
            Self::Exec(a) => &mut a.base,
            Self::ComHandler(a) => &mut a.base,
            Self::SendEmail(a) => &mut a.base,
            Self::ShowMessage(a) => &mut a.base,
        }
    }

    pub fn id(&self) -> &str {
        &self.base().id
    }

    /// 一覧表示用の要約
    pub fn summary(&self) -> String {
        match self {
            Self::Exec(a) if a.args.is_empty() => a.path.clone(),
            Self::Exec(a) => format!("{} {}", a.path, a.args),
            Self::ComHandler(a) => format!("COM {}", a.class_id),
            Self::SendEmail(a) => format!("mail to {}: {}", a.to, a.subject),
            Self::ShowMessage(a) => format!("message: {}", a.title),
        }
    }
}

impl From<ExecAction> for Action {
    fn from(a: ExecAction) -> Self {
        Self::Exec(a)
    }
}

impl From<ComHandlerAction> for Action {
    fn from(a: ComHandlerAction) -> Self {
        Self::ComHandler(a)
    }
}

impl From<EmailAction> for Action {
    fn from(a: EmailAction) -> Self {
        Self::SendEmail(a)
    }
}

impl From<MessageAction> for Action {
    fn from(a: MessageAction) -> Self {
        Self::ShowMessage(a)
    }
}
