//! 実行主体（IPrincipal）

use super::{LogonType, RunLevel};

/// タスクを実行する ID と特権
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Principal {
    pub display_name: String,
    pub group_id: String,
    pub id: String,
    pub logon_type: LogonType,
    pub run_level: RunLevel,
    pub user_id: String,
}

impl Principal {
    /// SYSTEM で最上位特権（サービスアカウント）
    pub fn system() -> Self {
        Self {
            user_id: "SYSTEM".into(),
            logon_type: LogonType::ServiceAccount,
            run_level: RunLevel::Highest,
            ..Self::default()
        }
    }

    /// 登録時に渡すユーザー名。グループ指定なら group_id を使う。
    pub fn account(&self) -> Option<&str> {
        let account = if self.logon_type == LogonType::Group {
            self.group_id.as_str()
        } else {
            self.user_id.as_str()
        };
        if account.is_empty() {
            None
        } else {
            Some(account)
        }
    }
}
