//! タスクスケジューラサービス用ポート（ITaskService / ITaskFolder / IRegisteredTask をラップ）
//!
//! カタログ型とネイティブ表現の相互変換はアダプタの責務。
//! パスはすべて正規化済み（"\" 始まり）で渡す。

use crate::error::DomainError;
use crate::model::{
    Definition, LogonType, RegisteredTask, RunningTask, ServiceInfo, TaskCreationFlags, TaskFolder,
};

/// RegisterTaskDefinition の引数
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterRequest {
    pub path: String,
    pub definition: Definition,
    pub flags: TaskCreationFlags,
    pub logon_type: LogonType,
    pub user: Option<String>,
    pub password: Option<String>,
    /// 登録タスクに設定する SDDL
    pub sddl: Option<String>,
}

impl RegisterRequest {
    /// 実行主体の設定をそのまま使うリクエスト
    pub fn from_definition(path: impl Into<String>, definition: Definition, flags: TaskCreationFlags) -> Self {
        let logon_type = definition.principal.logon_type;
        let user = definition.principal.account().map(str::to_string);
        Self {
            path: path.into(),
            definition,
            flags,
            logon_type,
            user,
            password: None,
            sddl: None,
        }
    }
}

pub trait TaskServicePort {
    /// 接続先の情報
    fn service_info(&self) -> Result<ServiceInfo, DomainError>;

    /// フォルダを子孫ごと取得
    fn folder(&self, path: &str, include_hidden: bool) -> Result<TaskFolder, DomainError>;

    /// フォルダ作成（親は既存であること）
    fn create_folder(&self, path: &str) -> Result<TaskFolder, DomainError>;

    /// 空フォルダ削除
    fn delete_folder(&self, path: &str) -> Result<(), DomainError>;

    /// 登録済みタスクを取得
    fn task(&self, path: &str) -> Result<RegisteredTask, DomainError>;

    /// 実行中インスタンス一覧
    fn running_tasks(&self, include_hidden: bool) -> Result<Vec<RunningTask>, DomainError>;

    /// タスク定義を登録（作成/更新）
    fn register_task(&self, request: &RegisterRequest) -> Result<RegisteredTask, DomainError>;

    /// タスク削除
    fn delete_task(&self, path: &str) -> Result<(), DomainError>;

    /// 即時実行（非同期）
    fn run_task(&self, path: &str) -> Result<RunningTask, DomainError>;

    /// 実行中インスタンスを全停止
    fn stop_task(&self, path: &str) -> Result<(), DomainError>;

    /// 有効/無効の切り替え
    fn set_enabled(&self, path: &str, enabled: bool) -> Result<(), DomainError>;
}
