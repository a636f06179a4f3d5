//! CLI 用ランタイム配線。
//! 設定ファイルと CLI 引数から接続先を決め、アダプタとユースケースを組み立てる。

use crate::paths;
use std::path::{Path, PathBuf};
use tm_adapter_fs::{FsConfigRepository, JsonDefinitionStore};
use tm_adapter_task::TaskSchedulerAdapter;
use tm_app::{TaskAdminDeps, TaskAdminService};
use tm_domain::model::{AppConfig, ConnectionConfig};
use tm_domain::port::driven::ConfigRepository;
use tm_domain::DomainError;
use tracing::debug;

/// CLI 引数から渡される起動オプション
#[derive(Debug, Clone, Default)]
pub struct RuntimeOptions {
    /// 明示指定された設定ファイル（存在しなければエラー）
    pub config_path: Option<PathBuf>,
    /// 設定ファイルより優先する接続設定
    pub connection: ConnectionConfig,
}

/// CLI実行ファイル用の依存関係
pub struct CliRuntime {
    config: AppConfig,
    config_path: PathBuf,
    scheduler: TaskSchedulerAdapter,
    store: JsonDefinitionStore,
}

impl CliRuntime {
    pub fn new(options: RuntimeOptions) -> Result<Self, DomainError> {
        let explicit = options.config_path.is_some();
        let config_path = options
            .config_path
            .unwrap_or_else(paths::default_config_path);
        let repo = FsConfigRepository::new(&config_path);
        let config = resolve_config(&repo, explicit, options.connection)?;
        debug!(
            config = %config_path.display(),
            server = config.connection.server.as_deref().unwrap_or("(local)"),
            "runtime configured"
        );
        Ok(Self {
            scheduler: TaskSchedulerAdapter::new(config.connection.clone()),
            store: JsonDefinitionStore::new(),
            config,
            config_path,
        })
    }

    /// アプリケーションサービス取得
    pub fn app(&self) -> TaskAdminService<'_> {
        TaskAdminService::new(TaskAdminDeps {
            scheduler: &self.scheduler,
            store: &self.store,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// パス省略時のフォルダ
    pub fn default_folder(&self) -> &str {
        &self.config.default_folder
    }

    /// 引数と設定の OR で隠しタスクを含めるか決める
    pub fn include_hidden(&self, requested: bool) -> bool {
        requested || self.config.include_hidden
    }
}

/// 設定ファイル → CLI 引数の順に重ねて検証する。
/// 既定パスにファイルが無ければ既定値、明示指定で無ければエラー。
pub fn resolve_config(
    repo: &dyn ConfigRepository,
    explicit: bool,
    overrides: ConnectionConfig,
) -> Result<AppConfig, DomainError> {
    let mut config = if repo.exists() {
        repo.load()?
    } else if explicit {
        return Err(DomainError::ConfigLoadFailed(
            "config file does not exist".into(),
        ));
    } else {
        AppConfig::default()
    };
    config.connection.merge(overrides);
    config.validate()?;
    config.normalize();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubRepo(Option<AppConfig>);

    impl ConfigRepository for StubRepo {
        fn load(&self) -> Result<AppConfig, DomainError> {
            self.0
                .clone()
                .ok_or_else(|| DomainError::ConfigLoadFailed("missing".into()))
        }

        fn exists(&self) -> bool {
            self.0.is_some()
        }
    }

    #[test]
    fn missing_default_config_falls_back_to_defaults() {
        let cfg = resolve_config(&StubRepo(None), false, ConnectionConfig::default()).unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let err = resolve_config(&StubRepo(None), true, ConnectionConfig::default()).unwrap_err();
        assert!(matches!(err, DomainError::ConfigLoadFailed(_)));
    }

    #[test]
    fn cli_flags_override_file_values() {
        let mut file = AppConfig::default();
        file.connection.server = Some("from-file".into());
        file.connection.user = Some("svc".into());
        let overrides = ConnectionConfig {
            server: Some("from-flag".into()),
            ..ConnectionConfig::default()
        };
        let cfg = resolve_config(&StubRepo(Some(file)), false, overrides).unwrap();
        assert_eq!(cfg.connection.server.as_deref(), Some("from-flag"));
        assert_eq!(cfg.connection.user.as_deref(), Some("svc"));
    }

    #[test]
    fn merged_result_is_validated() {
        let overrides = ConnectionConfig {
            password: Some("secret".into()),
            ..ConnectionConfig::default()
        };
        let err = resolve_config(&StubRepo(None), false, overrides).unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }

    #[test]
    fn runtime_reads_explicit_config_file() {
        let dir = std::env::temp_dir().join(format!(
            "tm-composition-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        let path = dir.join("config.json");
        let mut cfg = AppConfig::default();
        cfg.default_folder = "\\Ops".into();
        cfg.include_hidden = true;
        FsConfigRepository::new(&path).save(&cfg).unwrap();

        let runtime = CliRuntime::new(RuntimeOptions {
            config_path: Some(path.clone()),
            connection: ConnectionConfig::default(),
        })
        .unwrap();
        assert_eq!(runtime.config_path(), path.as_path());
        assert_eq!(runtime.default_folder(), "\\Ops");
        assert!(runtime.include_hidden(false));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
