//! サービス / フォルダ / 登録済みタスク / 実行中タスク
//!
//! ネイティブオブジェクトへの参照は保持しない。パス（実行中タスクはインスタンスGUID）が
//! ネイティブ環境への検索キーであり、アダプタが呼び出しごとに解決し直す。

use super::{Definition, OleDate, TaskState};

/// 永続化されたタスク定義と、最後に取得した実行状況
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegisteredTask {
    pub name: String,
    pub path: String,
    pub definition: Definition,
    pub enabled: bool,
    pub state: TaskState,
    pub missed_runs: i32,
    pub next_run_time: Option<OleDate>,
    pub last_run_time: Option<OleDate>,
    /// 直近の終了コード / HRESULT
    pub last_task_result: i32,
}

/// 実行中インスタンスのスナップショット（読み取り専用）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunningTask {
    pub current_action: String,
    pub engine_pid: u32,
    pub instance_guid: String,
    pub name: String,
    pub path: String,
    pub state: TaskState,
}

/// フォルダ（階層名前空間のノード）
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskFolder {
    pub name: String,
    pub path: String,
    pub sub_folders: Vec<TaskFolder>,
    pub registered_tasks: Vec<RegisteredTask>,
}

impl TaskFolder {
    pub fn is_root(&self) -> bool {
        self.path == "\\"
    }
}

/// 接続先サービスの情報
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServiceInfo {
    pub target_server: String,
    pub connected_user: String,
    pub connected_domain: String,
    /// 上位16bit がメジャー、下位16bit がマイナー
    pub highest_version: u32,
}

impl ServiceInfo {
    pub fn highest_version_parts(&self) -> (u16, u16) {
        ((self.highest_version >> 16) as u16, (self.highest_version & 0xffff) as u16)
    }
}

/// タスクスケジューラ全体のスナップショット
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskService {
    pub info: ServiceInfo,
    pub root_folder: TaskFolder,
    pub running_tasks: Vec<RunningTask>,
    /// ルート以下の全登録タスク（前順）
    pub registered_tasks: Vec<RegisteredTask>,
}
