//! 実行ポリシー（ITaskSettings / IIdleSettings / INetworkSettings）
//!
//! Default は ITaskService::NewTask 直後のネイティブ既定値に合わせる。

use super::{Compatibility, InstancesPolicy};

/// アイドル条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdleSettings {
    pub idle_duration: String,
    pub restart_on_idle: bool,
    pub stop_on_idle_end: bool,
    pub wait_timeout: String,
}

impl Default for IdleSettings {
    fn default() -> Self {
        Self {
            idle_duration: "PT10M".into(),
            restart_on_idle: false,
            stop_on_idle_end: true,
            wait_timeout: "PT1H".into(),
        }
    }
}

/// ネットワーク条件（プロファイル指定）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetworkSettings {
    pub id: String,
    pub name: String,
}

/// タスクの実行ポリシー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSettings {
    pub allow_demand_start: bool,
    pub allow_hard_terminate: bool,
    pub compatibility: Compatibility,
    pub delete_expired_task_after: String,
    pub disallow_start_if_on_batteries: bool,
    pub enabled: bool,
    pub execution_time_limit: String,
    pub hidden: bool,
    pub idle_settings: IdleSettings,
    pub multiple_instances: InstancesPolicy,
    pub network_settings: NetworkSettings,
    /// 0（最高）〜10（最低）
    pub priority: i32,
    pub restart_count: i32,
    pub restart_interval: String,
    pub run_only_if_idle: bool,
    pub run_only_if_network_available: bool,
    pub start_when_available: bool,
    pub stop_if_going_on_batteries: bool,
    pub wake_to_run: bool,
}

impl Default for TaskSettings {
    fn default() -> Self {
        Self {
            allow_demand_start: true,
            allow_hard_terminate: true,
            compatibility: Compatibility::V2,
            delete_expired_task_after: String::new(),
            disallow_start_if_on_batteries: true,
            enabled: true,
            execution_time_limit: "PT72H".into(),
            hidden: false,
            idle_settings: IdleSettings::default(),
            multiple_instances: InstancesPolicy::IgnoreNew,
            network_settings: NetworkSettings::default(),
            priority: 7,
            restart_count: 0,
            restart_interval: String::new(),
            run_only_if_idle: false,
            run_only_if_network_available: false,
            start_when_available: false,
            stop_if_going_on_batteries: true,
            wake_to_run: false,
        }
    }
}
