//! 接続設定・アプリ設定

use crate::{path::normalize_task_path, DomainError};

/// ITaskService::Connect に渡す接続先。未指定はローカル/現在のユーザー。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectionConfig {
    pub server: Option<String>,
    pub user: Option<String>,
    pub domain: Option<String>,
    pub password: Option<String>,
}

impl ConnectionConfig {
    pub fn local() -> Self {
        Self::default()
    }

    pub fn is_local(&self) -> bool {
        self.server.is_none()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        for (field, value) in [
            ("server", &self.server),
            ("user", &self.user),
            ("domain", &self.domain),
        ] {
            if let Some(v) = value {
                if v.trim().is_empty() {
                    return Err(DomainError::ValidationError(format!(
                        "{field} must not be blank"
                    )));
                }
            }
        }
        if self.password.is_some() && self.user.is_none() {
            return Err(DomainError::ValidationError(
                "password requires user".into(),
            ));
        }
        Ok(())
    }

    /// 指定された項目だけ上書きする（CLI 引数 > 設定ファイル）
    pub fn merge(&mut self, other: ConnectionConfig) {
        if other.server.is_some() {
            self.server = other.server;
        }
        if other.user.is_some() {
            self.user = other.user;
        }
        if other.domain.is_some() {
            self.domain = other.domain;
        }
        if other.password.is_some() {
            self.password = other.password;
        }
    }
}

/// アプリ全体の設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub connection: ConnectionConfig,
    /// パス省略時に使うフォルダ
    pub default_folder: String,
    /// 隠しタスクも列挙するか
    pub include_hidden: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::default(),
            default_folder: "\\".into(),
            include_hidden: false,
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), DomainError> {
        self.connection.validate()?;
        if normalize_task_path(&self.default_folder).is_none() {
            return Err(DomainError::ValidationError(format!(
                "invalid default_folder: {}",
                self.default_folder
            )));
        }
        Ok(())
    }

    pub fn normalize(&mut self) {
        if let Some(folder) = normalize_task_path(&self.default_folder) {
            self.default_folder = folder;
        }
    }
}
