//! ファイルシステムアダプター（タスク定義のJSON保存 / 設定ファイル読み込み）
//! serde の DTO を介してカタログ型と相互変換する。
mod dto;

use dto::{ConfigDto, DefinitionDto};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tm_domain::error::DomainError;
use tm_domain::model::{AppConfig, Definition};
use tm_domain::port::driven::{ConfigRepository, DefinitionStore};
use tracing::debug;

/// 定義を整形済み JSON 文字列にする（表示用）
pub fn definition_to_json(definition: &Definition) -> Result<String, DomainError> {
    serde_json::to_string_pretty(&DefinitionDto::from(definition))
        .map_err(|e| DomainError::IoError(format!("serialize definition: {e}")))
}

/// JSON 文字列から定義を読む。未知の列挙名は ValidationError。
pub fn definition_from_json(text: &str) -> Result<Definition, DomainError> {
    let dto: DefinitionDto = serde_json::from_str(text)
        .map_err(|e| DomainError::ValidationError(format!("parse definition: {e}")))?;
    Definition::try_from(dto)
}

/// タスク定義を JSON ファイルとして保存/読み込みする
#[derive(Debug, Default, Clone)]
pub struct JsonDefinitionStore;

impl JsonDefinitionStore {
    pub fn new() -> Self {
        Self
    }
}

impl DefinitionStore for JsonDefinitionStore {
    fn load(&self, path: &Path) -> Result<Definition, DomainError> {
        let text = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DomainError::NotFound(path.display().to_string())
            } else {
                DomainError::IoError(format!("read {}: {e}", path.display()))
            }
        })?;
        debug!(path = %path.display(), bytes = text.len(), "definition loaded");
        definition_from_json(&text)
    }

    fn save(&self, path: &Path, definition: &Definition) -> Result<(), DomainError> {
        let mut json = definition_to_json(definition)?;
        json.push('\n');
        write_atomic(path, json.as_bytes())?;
        debug!(path = %path.display(), "definition saved");
        Ok(())
    }
}

/// 設定ファイル（config.json）リポジトリ
#[derive(Debug, Clone)]
pub struct FsConfigRepository {
    config_path: PathBuf,
}

impl FsConfigRepository {
    pub fn new(config_path: impl AsRef<Path>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
        }
    }

    /// ルートディレクトリ配下の `config\config.json` を使う
    pub fn in_root(root: impl AsRef<Path>) -> Self {
        Self::new(root.as_ref().join("config").join("config.json"))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// 設定を保存する（初期ファイル生成用）
    pub fn save(&self, config: &AppConfig) -> Result<(), DomainError> {
        let dto = ConfigDto::from(config);
        let mut json = serde_json::to_string_pretty(&dto)
            .map_err(|e| DomainError::IoError(format!("serialize config: {e}")))?;
        json.push('\n');
        write_atomic(&self.config_path, json.as_bytes())
    }
}

impl ConfigRepository for FsConfigRepository {
    fn load(&self) -> Result<AppConfig, DomainError> {
        let buf = fs::read_to_string(&self.config_path)
            .map_err(|e| DomainError::ConfigLoadFailed(format!("read config: {e}")))?;
        let dto: ConfigDto =
            serde_json::from_str(&buf).map_err(|e| DomainError::ConfigLoadFailed(e.to_string()))?;
        AppConfig::try_from(dto).map_err(|e| DomainError::ConfigLoadFailed(e.to_string()))
    }

    fn exists(&self) -> bool {
        self.config_path.is_file()
    }
}

fn ensure_parent_dir(path: &Path) -> Result<(), DomainError> {
    let Some(dir) = path.parent() else {
        return Ok(());
    };
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|e| DomainError::IoError(format!("create_dir_all: {e}")))
}

/// 一時ファイルに書いてから rename で置き換える
fn write_atomic(path: &Path, data: &[u8]) -> Result<(), DomainError> {
    ensure_parent_dir(path)?;
    let tmp_path = path.with_extension(format!("tmp.{}", unique_suffix()));
    {
        let mut f = fs::File::create(&tmp_path)
            .map_err(|e| DomainError::IoError(format!("create temp file: {e}")))?;
        f.write_all(data)
            .map_err(|e| DomainError::IoError(format!("write temp file: {e}")))?;
        let _ = f.sync_all();
    }
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(DomainError::IoError(format!("rename temp file: {e}")));
    }
    Ok(())
}

fn unique_suffix() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("{}.{}", std::process::id(), nanos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tm_domain::model::{
        Action, BootTrigger, ComHandlerAction, Compatibility, CustomTrigger, DailyTrigger,
        DaysOfMonth, DaysOfWeek, EmailAction, EventTrigger, IdleSettings, IdleTrigger,
        InstancesPolicy, LogonTrigger, LogonType, MessageAction, MonthlyDowTrigger,
        MonthlyTrigger, MonthsOfYear, NetworkSettings, Principal, RegistrationInfo,
        RegistrationTrigger, RepetitionPattern, RunLevel, SessionStateChange,
        SessionStateChangeTrigger, TaskAction, TaskSettings, TaskTrigger, TimeTrigger, Trigger,
        WeeklyTrigger, WeeksOfMonth,
    };

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tm-adapter-fs-{name}-{}", unique_suffix()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// 全アクション・全トリガー種別と、既定値から外した全項目を持つ定義
    fn sample_definition() -> Definition {
        let mut def = Definition::new();
        def.registration_info = RegistrationInfo {
            author: "ops".into(),
            date: "2024-01-01T00:00:00".into(),
            description: "nightly backup".into(),
            documentation: "see runbook".into(),
            security_descriptor: "D:(A;;FA;;;BA)".into(),
            source: "tm".into(),
            uri: "\\Ops\\Backup".into(),
            version: "1.2".into(),
        };
        def.principal = Principal {
            display_name: "Backup account".into(),
            group_id: String::new(),
            id: "Author".into(),
            logon_type: LogonType::Password,
            run_level: RunLevel::Highest,
            user_id: "CORP\\backup".into(),
        };
        def.settings = TaskSettings {
            allow_demand_start: false,
            allow_hard_terminate: false,
            compatibility: Compatibility::V2_4,
            delete_expired_task_after: "P30D".into(),
            disallow_start_if_on_batteries: false,
            enabled: false,
            execution_time_limit: "PT2H".into(),
            hidden: true,
            idle_settings: IdleSettings {
                idle_duration: "PT20M".into(),
                restart_on_idle: true,
                stop_on_idle_end: false,
                wait_timeout: "PT2H".into(),
            },
            multiple_instances: InstancesPolicy::Queue,
            network_settings: NetworkSettings {
                id: "{11111111-2222-3333-4444-555555555555}".into(),
                name: "corp".into(),
            },
            priority: 4,
            restart_count: 3,
            restart_interval: "PT10M".into(),
            run_only_if_idle: true,
            run_only_if_network_available: true,
            start_when_available: true,
            stop_if_going_on_batteries: false,
            wake_to_run: true,
        };
        def.context = "Author".into();
        def.data = "opaque-data".into();
        def.xml_text = "<Task/>".into();

        def.add_exec_action("C:\\tools\\backup.exe", "/full", "C:\\tools")
            .add_action(ComHandlerAction {
                base: TaskAction { id: "handler".into() },
                class_id: "{00000000-0000-0000-0000-000000000001}".into(),
                data: "payload".into(),
            })
            .add_action(EmailAction {
                base: TaskAction { id: "mail".into() },
                server: "smtp.example.com".into(),
                subject: "done".into(),
                to: "ops@example.com".into(),
                cc: "lead@example.com".into(),
                bcc: "audit@example.com".into(),
                reply_to: "noreply@example.com".into(),
                from: "tm@example.com".into(),
                body: "backup finished".into(),
            })
            .add_action(MessageAction {
                base: TaskAction { id: "popup".into() },
                title: "Backup".into(),
                message: "finished".into(),
            })
            .add_trigger(EventTrigger {
                delay: "PT30S".into(),
                subscription: "<QueryList/>".into(),
                value_queries: [("code".to_string(), "Event/System/EventID".to_string())]
                    .into_iter()
                    .collect(),
                ..EventTrigger::default()
            })
            .add_trigger(TimeTrigger {
                base: TaskTrigger {
                    end_boundary: "2025-01-01T00:00:00".into(),
                    execution_time_limit: "PT1H".into(),
                    id: "once".into(),
                    ..TaskTrigger::starting_at("2024-06-01T09:00:00")
                },
                random_delay: "PT1M".into(),
            })
            .add_trigger(DailyTrigger {
                base: TaskTrigger {
                    repetition: RepetitionPattern {
                        duration: "P1D".into(),
                        interval: "PT1H".into(),
                        stop_at_duration_end: true,
                    },
                    ..TaskTrigger::starting_at("2024-01-01T02:00:00")
                },
                days_interval: 2,
                random_delay: "PT5M".into(),
            })
            .add_trigger(WeeklyTrigger {
                base: TaskTrigger {
                    enabled: false,
                    ..TaskTrigger::default()
                },
                days_of_week: DaysOfWeek::MONDAY | DaysOfWeek::FRIDAY,
                weeks_interval: 2,
                random_delay: String::new(),
            })
            .add_trigger(MonthlyTrigger {
                days_of_month: DaysOfMonth::day(1).unwrap() | DaysOfMonth::LAST,
                months_of_year: MonthsOfYear::ALL,
                run_on_last_day_of_month: true,
                ..MonthlyTrigger::default()
            })
            .add_trigger(MonthlyDowTrigger {
                days_of_week: DaysOfWeek::SUNDAY,
                weeks_of_month: WeeksOfMonth::FIRST | WeeksOfMonth::THIRD,
                months_of_year: MonthsOfYear::JANUARY | MonthsOfYear::JULY,
                run_on_last_week_of_month: true,
                random_delay: "PT2M".into(),
                ..MonthlyDowTrigger::default()
            })
            .add_trigger(IdleTrigger::default())
            .add_trigger(RegistrationTrigger {
                delay: "PT1M".into(),
                ..RegistrationTrigger::default()
            })
            .add_trigger(BootTrigger {
                delay: "PT3M".into(),
                ..BootTrigger::default()
            })
            .add_trigger(LogonTrigger {
                delay: "PT15S".into(),
                user_id: "CORP\\alice".into(),
                ..LogonTrigger::default()
            })
            .add_trigger(SessionStateChangeTrigger {
                delay: "PT5S".into(),
                state_change: SessionStateChange::SessionLock,
                user_id: "alice".into(),
                ..SessionStateChangeTrigger::default()
            })
            .add_trigger(CustomTrigger {
                base: TaskTrigger {
                    id: "wnf".into(),
                    ..TaskTrigger::default()
                },
            });
        def
    }

    #[test]
    fn store_preserves_every_field() {
        let dir = temp_dir("store");
        let path = dir.join("backup.json");
        let store = JsonDefinitionStore::new();
        let def = sample_definition();

        store.save(&path, &def).unwrap();
        let loaded = store.load(&path).unwrap();
        assert_eq!(loaded, def);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn enums_are_written_by_name() {
        let json = definition_to_json(&sample_definition()).unwrap();
        assert!(json.contains("\"type\": \"Exec\""));
        assert!(json.contains("\"type\": \"ComHandler\""));
        assert!(json.contains("\"type\": \"Daily\""));
        assert!(json.contains("\"logon_type\": \"Password\""));
        assert!(json.contains("\"state_change\": \"SessionLock\""));
        assert!(json.contains("\"multiple_instances\": \"Queue\""));
        assert!(json.contains("\"type\": \"MonthlyDOW\""));
    }

    #[test]
    fn unknown_names_are_validation_errors() {
        let err = definition_from_json(r#"{"actions":[{"type":"Launch","path":"x"}]}"#).unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));

        let err = definition_from_json(r#"{"principal":{"logon_type":"Magic","run_level":"Lua"}}"#)
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }

    #[test]
    fn sparse_json_uses_native_defaults() {
        let def = definition_from_json(
            r#"{"triggers":[{"type":"Logon"}],"actions":[{"type":"Exec","path":"notepad.exe"}]}"#,
        )
        .unwrap();
        assert_eq!(def.settings, Definition::default().settings);
        assert_eq!(def.principal.logon_type, LogonType::None);
        assert_eq!(def.principal.run_level, RunLevel::Lua);
        assert!(def.triggers[0].is_enabled());
        match &def.actions[0] {
            Action::Exec(exec) => assert_eq!(exec.path, "notepad.exe"),
            other => panic!("unexpected action: {other:?}"),
        }
        assert!(matches!(def.triggers[0], Trigger::Logon(_)));
    }

    #[test]
    fn sample_covers_every_variant() {
        let def = sample_definition();
        let mut action_kinds: Vec<_> = def.actions.iter().map(|a| a.action_type()).collect();
        action_kinds.dedup();
        assert_eq!(action_kinds.len(), 4);
        let mut trigger_kinds: Vec<_> = def.triggers.iter().map(|t| t.trigger_type()).collect();
        trigger_kinds.dedup();
        assert_eq!(trigger_kinds.len(), 12);
    }

    #[test]
    fn repetition_without_interval_survives_round_trip() {
        let mut def = Definition::new();
        def.add_trigger(TimeTrigger {
            base: TaskTrigger {
                repetition: RepetitionPattern {
                    duration: "P1D".into(),
                    interval: String::new(),
                    stop_at_duration_end: true,
                },
                ..TaskTrigger::starting_at("2024-01-01T00:00:00")
            },
            ..TimeTrigger::default()
        });
        let json = definition_to_json(&def).unwrap();
        assert!(json.contains("\"repetition\""));
        assert_eq!(definition_from_json(&json).unwrap(), def);
    }

    #[test]
    fn missing_state_change_uses_default() {
        let def = definition_from_json(r#"{"triggers":[{"type":"SessionStateChange"}]}"#).unwrap();
        match &def.triggers[0] {
            Trigger::SessionStateChange(t) => {
                assert_eq!(t.state_change, SessionStateChange::default())
            }
            other => panic!("unexpected trigger: {other:?}"),
        }

        let err = definition_from_json(r#"{"triggers":[{"type":"SessionStateChange","state_change":"Reboot"}]}"#)
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let dir = temp_dir("missing");
        let err = JsonDefinitionStore::new()
            .load(&dir.join("absent.json"))
            .unwrap_err();
        assert!(err.is_not_found());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn config_defaults_when_fields_missing() {
        let dir = temp_dir("config-defaults");
        let repo = FsConfigRepository::in_root(&dir);
        assert!(!repo.exists());

        ensure_parent_dir(repo.config_path()).unwrap();
        fs::write(repo.config_path(), "{}").unwrap();
        assert!(repo.exists());
        let cfg = repo.load().unwrap();
        assert_eq!(cfg, AppConfig::default());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn config_round_trip_normalizes_folder() {
        let dir = temp_dir("config-save");
        let repo = FsConfigRepository::in_root(&dir);
        let mut cfg = AppConfig::default();
        cfg.connection.server = Some("build-01".into());
        cfg.default_folder = "/Ops/Nightly/".into();
        cfg.include_hidden = true;
        repo.save(&cfg).unwrap();

        let loaded = repo.load().unwrap();
        assert_eq!(loaded.connection.server.as_deref(), Some("build-01"));
        assert_eq!(loaded.default_folder, "\\Ops\\Nightly");
        assert!(loaded.include_hidden);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn invalid_config_is_load_failure() {
        let dir = temp_dir("config-invalid");
        let repo = FsConfigRepository::in_root(&dir);
        ensure_parent_dir(repo.config_path()).unwrap();
        fs::write(
            repo.config_path(),
            r#"{"connection":{"password":"secret"}}"#,
        )
        .unwrap();
        assert!(matches!(
            repo.load().unwrap_err(),
            DomainError::ConfigLoadFailed(_)
        ));
        let _ = fs::remove_dir_all(&dir);
    }
}
