//! tm-app: アプリケーション層のファサード。
//! タスクスケジューラポートと定義ストアを組み合わせて、
//! 一覧・実行・有効化・エクスポート/インポートなどのユースケースを実装する。

use std::path::Path;
use tm_domain::model::{
    Action, Definition, RegisteredTask, RunningTask, ServiceInfo, TaskCreationFlags,
    TaskFolder, TaskService, TriggerType,
};
use tm_domain::path::{normalize_task_path, split_task_path};
use tm_domain::port::driven::{DefinitionStore, RegisterRequest, TaskServicePort};
use tm_domain::service::{collect_tasks, verify_tree};
use tm_domain::DomainError;
use tracing::{debug, info};

/// 1タスクあたりのアクション上限（ネイティブ側の制限）
pub const MAX_ACTIONS: usize = 32;

/// インポート時のオプション
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOptions {
    /// 既存タスクを上書きする
    pub overwrite: bool,
    /// 無効状態で登録する
    pub disabled: bool,
    /// 検証のみ（登録しない）
    pub validate_only: bool,
}

impl ImportOptions {
    pub fn creation_flags(&self) -> TaskCreationFlags {
        let mut flags = if self.overwrite {
            TaskCreationFlags::CREATE_OR_UPDATE
        } else {
            TaskCreationFlags::CREATE
        };
        if self.disabled {
            flags |= TaskCreationFlags::DISABLE;
        }
        if self.validate_only {
            flags |= TaskCreationFlags::VALIDATE_ONLY;
        }
        flags
    }
}

pub struct TaskAdminDeps<'a> {
    pub scheduler: &'a dyn TaskServicePort,
    pub store: &'a dyn DefinitionStore,
}

pub struct TaskAdminService<'a> {
    deps: TaskAdminDeps<'a>,
}

impl<'a> TaskAdminService<'a> {
    pub fn new(deps: TaskAdminDeps<'a>) -> Self {
        Self { deps }
    }

    pub fn service_info(&self) -> Result<ServiceInfo, DomainError> {
        self.deps.scheduler.service_info()
    }

    /// サービス全体のスナップショット
    pub fn snapshot(&self, include_hidden: bool) -> Result<TaskService, DomainError> {
        let info = self.deps.scheduler.service_info()?;
        let root_folder = self.deps.scheduler.folder("\\", include_hidden)?;
        verify_tree(&root_folder)?;
        let running_tasks = self.deps.scheduler.running_tasks(include_hidden)?;
        let registered_tasks = collect_tasks(&root_folder);
        debug!(
            tasks = registered_tasks.len(),
            running = running_tasks.len(),
            "snapshot taken"
        );
        Ok(TaskService {
            info,
            root_folder,
            running_tasks,
            registered_tasks,
        })
    }

    /// フォルダツリー
    pub fn folder_tree(&self, folder: &str, include_hidden: bool) -> Result<TaskFolder, DomainError> {
        let folder = require_path(folder)?;
        self.deps.scheduler.folder(&folder, include_hidden)
    }

    /// フォルダ内のタスク一覧（recursive なら子孫も）
    pub fn list_tasks(
        &self,
        folder: &str,
        recursive: bool,
        include_hidden: bool,
    ) -> Result<Vec<RegisteredTask>, DomainError> {
        let tree = self.folder_tree(folder, include_hidden)?;
        if recursive {
            Ok(collect_tasks(&tree))
        } else {
            Ok(tree.registered_tasks)
        }
    }

    pub fn show_task(&self, path: &str) -> Result<RegisteredTask, DomainError> {
        let path = require_path(path)?;
        self.deps.scheduler.task(&path)
    }

    pub fn running_tasks(&self, include_hidden: bool) -> Result<Vec<RunningTask>, DomainError> {
        self.deps.scheduler.running_tasks(include_hidden)
    }

    pub fn run_task(&self, path: &str) -> Result<RunningTask, DomainError> {
        let path = require_path(path)?;
        let running = self.deps.scheduler.run_task(&path)?;
        info!(task = %path, instance = %running.instance_guid, "task started");
        Ok(running)
    }

    pub fn stop_task(&self, path: &str) -> Result<(), DomainError> {
        let path = require_path(path)?;
        self.deps.scheduler.stop_task(&path)?;
        info!(task = %path, "task stopped");
        Ok(())
    }

    pub fn set_enabled(&self, path: &str, enabled: bool) -> Result<(), DomainError> {
        let path = require_path(path)?;
        self.deps.scheduler.set_enabled(&path, enabled)?;
        info!(task = %path, enabled, "task enabled state changed");
        Ok(())
    }

    pub fn delete_task(&self, path: &str) -> Result<(), DomainError> {
        let path = require_path(path)?;
        self.deps.scheduler.delete_task(&path)?;
        info!(task = %path, "task deleted");
        Ok(())
    }

    /// 登録済みタスクの定義をファイルへ書き出す
    pub fn export_task(&self, path: &str, file: &Path) -> Result<RegisteredTask, DomainError> {
        let task = self.show_task(path)?;
        self.deps.store.save(file, &task.definition)?;
        info!(task = %task.path, file = %file.display(), "task exported");
        Ok(task)
    }

    /// ファイルの定義を検証して登録する。validate_only なら登録結果は返らない。
    pub fn import_task(
        &self,
        file: &Path,
        path: &str,
        options: ImportOptions,
    ) -> Result<Option<RegisteredTask>, DomainError> {
        let path = require_task_path(path)?;
        let definition = self.deps.store.load(file)?;
        let request = RegisterRequest::from_definition(path.clone(), definition, options.creation_flags());
        let registered = self.register(&request)?;
        if options.validate_only {
            info!(task = %path, "definition validated by service");
            return Ok(None);
        }
        info!(task = %registered.path, file = %file.display(), "task imported");
        Ok(Some(registered))
    }

    /// 定義をそのまま登録する
    pub fn register(&self, request: &RegisterRequest) -> Result<RegisteredTask, DomainError> {
        validate_definition(&request.definition)?;
        let path = require_task_path(&request.path)?;
        let mut request = request.clone();
        request.path = path;
        let registered = self.deps.scheduler.register_task(&request)?;
        info!(task = %registered.path, flags = request.flags.bits(), "task registered");
        Ok(registered)
    }

    pub fn create_folder(&self, path: &str) -> Result<TaskFolder, DomainError> {
        let path = require_task_path(path)?;
        let folder = self.deps.scheduler.create_folder(&path)?;
        info!(folder = %folder.path, "folder created");
        Ok(folder)
    }

    pub fn delete_folder(&self, path: &str) -> Result<(), DomainError> {
        let path = require_task_path(path)?;
        self.deps.scheduler.delete_folder(&path)?;
        info!(folder = %path, "folder deleted");
        Ok(())
    }
}

/// 登録前の構造検証（期間・日時文字列は解釈せずそのまま渡す）
pub fn validate_definition(definition: &Definition) -> Result<(), DomainError> {
    if definition.actions.is_empty() {
        return Err(DomainError::ValidationError(
            "definition must contain at least one action".into(),
        ));
    }
    if definition.actions.len() > MAX_ACTIONS {
        return Err(DomainError::ValidationError(format!(
            "definition has {} actions (max {})",
            definition.actions.len(),
            MAX_ACTIONS
        )));
    }
    for action in &definition.actions {
        match action {
            Action::Exec(exec) if exec.path.trim().is_empty() => {
                return Err(DomainError::ValidationError(
                    "exec action requires a path".into(),
                ));
            }
            Action::ComHandler(handler) if handler.class_id.trim().is_empty() => {
                return Err(DomainError::ValidationError(
                    "COM handler action requires a class id".into(),
                ));
            }
            _ => {}
        }
    }
    for trigger in &definition.triggers {
        if trigger.trigger_type() == TriggerType::Custom {
            return Err(DomainError::ValidationError(
                "custom triggers cannot be created through the API".into(),
            ));
        }
    }
    Ok(())
}

fn require_path(path: &str) -> Result<String, DomainError> {
    normalize_task_path(path)
        .ok_or_else(|| DomainError::ValidationError(format!("invalid task path: {path}")))
}

/// ルート以外のパス（タスク名/フォルダ名を含む）
fn require_task_path(path: &str) -> Result<String, DomainError> {
    let path = require_path(path)?;
    let (_, name) = split_task_path(&path);
    if name.is_empty() {
        return Err(DomainError::ValidationError(
            "a name is required (root is not allowed)".into(),
        ));
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use tm_domain::model::{
        BootTrigger, CustomTrigger, DailyTrigger, ExecAction, TaskState,
    };

    #[derive(Default)]
    struct StubScheduler {
        tasks: RefCell<BTreeMap<String, RegisteredTask>>,
        requests: RefCell<Vec<RegisterRequest>>,
        calls: RefCell<Vec<String>>,
    }

    impl StubScheduler {
        fn with_task(path: &str) -> Self {
            let stub = Self::default();
            let mut definition = Definition::new();
            definition.add_exec_action("C:\\tools\\backup.exe", "--full", "C:\\tools");
            definition.add_trigger(BootTrigger::default());
            let (_, name) = split_task_path(path);
            stub.tasks.borrow_mut().insert(
                path.to_string(),
                RegisteredTask {
                    name: name.to_string(),
                    path: path.to_string(),
                    definition,
                    enabled: true,
                    state: TaskState::Ready,
                    ..RegisteredTask::default()
                },
            );
            stub
        }
    }

    impl TaskServicePort for StubScheduler {
        fn service_info(&self) -> Result<ServiceInfo, DomainError> {
            Ok(ServiceInfo {
                target_server: "LOCALHOST".into(),
                highest_version: (1 << 16) | 6,
                ..ServiceInfo::default()
            })
        }

        fn folder(&self, path: &str, _include_hidden: bool) -> Result<TaskFolder, DomainError> {
            if path != "\\" {
                return Err(DomainError::NotFound(path.into()));
            }
            Ok(TaskFolder {
                name: "\\".into(),
                path: "\\".into(),
                sub_folders: vec![],
                registered_tasks: self.tasks.borrow().values().cloned().collect(),
            })
        }

        fn create_folder(&self, path: &str) -> Result<TaskFolder, DomainError> {
            self.calls.borrow_mut().push(format!("mkdir {path}"));
            let (_, name) = split_task_path(path);
            Ok(TaskFolder {
                name: name.into(),
                path: path.into(),
                ..TaskFolder::default()
            })
        }

        fn delete_folder(&self, path: &str) -> Result<(), DomainError> {
            self.calls.borrow_mut().push(format!("rmdir {path}"));
            Ok(())
        }

        fn task(&self, path: &str) -> Result<RegisteredTask, DomainError> {
            self.tasks
                .borrow()
                .get(path)
                .cloned()
                .ok_or_else(|| DomainError::NotFound(path.into()))
        }

        fn running_tasks(&self, _include_hidden: bool) -> Result<Vec<RunningTask>, DomainError> {
            Ok(vec![])
        }

        fn register_task(&self, request: &RegisterRequest) -> Result<RegisteredTask, DomainError> {
            self.requests.borrow_mut().push(request.clone());
            let (_, name) = split_task_path(&request.path);
            Ok(RegisteredTask {
                name: name.into(),
                path: request.path.clone(),
                definition: request.definition.clone(),
                enabled: !request.flags.contains(TaskCreationFlags::DISABLE),
                ..RegisteredTask::default()
            })
        }

        fn delete_task(&self, path: &str) -> Result<(), DomainError> {
            self.tasks
                .borrow_mut()
                .remove(path)
                .map(|_| ())
                .ok_or_else(|| DomainError::NotFound(path.into()))
        }

        fn run_task(&self, path: &str) -> Result<RunningTask, DomainError> {
            let task = self.task(path)?;
            Ok(RunningTask {
                instance_guid: "{00000000-0000-0000-0000-000000000001}".into(),
                name: task.name,
                path: task.path,
                state: TaskState::Running,
                ..RunningTask::default()
            })
        }

        fn stop_task(&self, path: &str) -> Result<(), DomainError> {
            self.calls.borrow_mut().push(format!("stop {path}"));
            Ok(())
        }

        fn set_enabled(&self, path: &str, enabled: bool) -> Result<(), DomainError> {
            let mut tasks = self.tasks.borrow_mut();
            let task = tasks
                .get_mut(path)
                .ok_or_else(|| DomainError::NotFound(path.into()))?;
            task.enabled = enabled;
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        files: RefCell<BTreeMap<PathBuf, Definition>>,
    }

    impl DefinitionStore for MemoryStore {
        fn load(&self, path: &Path) -> Result<Definition, DomainError> {
            self.files
                .borrow()
                .get(path)
                .cloned()
                .ok_or_else(|| DomainError::IoError(format!("missing {}", path.display())))
        }

        fn save(&self, path: &Path, definition: &Definition) -> Result<(), DomainError> {
            self.files
                .borrow_mut()
                .insert(path.to_path_buf(), definition.clone());
            Ok(())
        }
    }

    fn service<'a>(scheduler: &'a StubScheduler, store: &'a MemoryStore) -> TaskAdminService<'a> {
        TaskAdminService::new(TaskAdminDeps { scheduler, store })
    }

    #[test]
    fn snapshot_flattens_registered_tasks() {
        let scheduler = StubScheduler::with_task("\\Nightly");
        let store = MemoryStore::default();
        let snapshot = service(&scheduler, &store).snapshot(false).unwrap();
        assert_eq!(snapshot.info.target_server, "LOCALHOST");
        assert_eq!(snapshot.registered_tasks.len(), 1);
        assert_eq!(snapshot.registered_tasks[0].path, "\\Nightly");
    }

    #[test]
    fn show_task_normalizes_path() {
        let scheduler = StubScheduler::with_task("\\Nightly");
        let store = MemoryStore::default();
        let task = service(&scheduler, &store).show_task("Nightly").unwrap();
        assert_eq!(task.name, "Nightly");
        assert!(service(&scheduler, &store).show_task("..").is_err());
    }

    #[test]
    fn export_then_import_registers_same_definition() {
        let scheduler = StubScheduler::with_task("\\Nightly");
        let store = MemoryStore::default();
        let svc = service(&scheduler, &store);
        let file = PathBuf::from("nightly.json");

        let exported = svc.export_task("\\Nightly", &file).unwrap();
        let imported = svc
            .import_task(
                &file,
                "\\Copies\\Nightly",
                ImportOptions {
                    overwrite: true,
                    disabled: true,
                    validate_only: false,
                },
            )
            .unwrap()
            .unwrap();

        assert_eq!(imported.definition, exported.definition);
        assert!(!imported.enabled);
        let requests = scheduler.requests.borrow();
        assert_eq!(requests[0].path, "\\Copies\\Nightly");
        assert_eq!(
            requests[0].flags,
            TaskCreationFlags::CREATE_OR_UPDATE | TaskCreationFlags::DISABLE
        );
    }

    #[test]
    fn import_validate_only_returns_none() {
        let scheduler = StubScheduler::with_task("\\Nightly");
        let store = MemoryStore::default();
        let svc = service(&scheduler, &store);
        let file = PathBuf::from("nightly.json");
        svc.export_task("\\Nightly", &file).unwrap();

        let result = svc
            .import_task(
                &file,
                "\\Check",
                ImportOptions {
                    validate_only: true,
                    ..ImportOptions::default()
                },
            )
            .unwrap();
        assert!(result.is_none());
        assert!(scheduler.requests.borrow()[0]
            .flags
            .contains(TaskCreationFlags::VALIDATE_ONLY));
    }

    #[test]
    fn import_rejects_root_path() {
        let scheduler = StubScheduler::default();
        let store = MemoryStore::default();
        let err = service(&scheduler, &store)
            .import_task(Path::new("x.json"), "\\", ImportOptions::default())
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }

    #[test]
    fn import_rejects_invalid_definition_before_registering() {
        let scheduler = StubScheduler::default();
        let store = MemoryStore::default();
        let file = PathBuf::from("empty.json");
        store.save(&file, &Definition::new()).unwrap();

        let err = service(&scheduler, &store)
            .import_task(&file, "\\Empty", ImportOptions::default())
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
        assert!(scheduler.requests.borrow().is_empty());
    }

    #[test]
    fn register_normalizes_request_path() {
        let scheduler = StubScheduler::default();
        let store = MemoryStore::default();
        let mut definition = Definition::new();
        definition.add_exec_action("a.exe", "", "");
        let request = RegisterRequest::from_definition(
            "Ops/Cleanup",
            definition,
            TaskCreationFlags::CREATE,
        );

        let registered = service(&scheduler, &store).register(&request).unwrap();
        assert_eq!(registered.path, "\\Ops\\Cleanup");
        assert_eq!(scheduler.requests.borrow()[0].path, "\\Ops\\Cleanup");
    }

    #[test]
    fn import_options_default_to_create() {
        assert_eq!(ImportOptions::default().creation_flags(), TaskCreationFlags::CREATE);
    }

    #[test]
    fn validate_definition_checks_action_count_and_custom_triggers() {
        let empty = Definition::new();
        assert!(validate_definition(&empty).is_err());

        let mut no_path = Definition::new();
        no_path.add_exec_action(" ", "", "");
        assert!(validate_definition(&no_path).is_err());

        let mut too_many = Definition::new();
        for i in 0..=MAX_ACTIONS {
            too_many.add_exec_action(format!("{i}.exe"), "", "");
        }
        assert!(validate_definition(&too_many).is_err());

        let mut custom = Definition::new();
        custom.add_action(ExecAction::new("a.exe", "", ""));
        custom.add_trigger(CustomTrigger::default());
        assert!(validate_definition(&custom).is_err());

        let mut ok = Definition::new();
        ok.add_action(ExecAction::new("a.exe", "", ""));
        ok.add_trigger(DailyTrigger {
            days_interval: 2,
            random_delay: "PT1H".into(),
            ..DailyTrigger::default()
        });
        assert!(validate_definition(&ok).is_ok());
    }

    #[test]
    fn run_and_toggle_delegate_to_port() {
        let scheduler = StubScheduler::with_task("\\Nightly");
        let store = MemoryStore::default();
        let svc = service(&scheduler, &store);

        let running = svc.run_task("\\Nightly").unwrap();
        assert_eq!(running.state, TaskState::Running);

        svc.set_enabled("\\Nightly", false).unwrap();
        assert!(!scheduler.tasks.borrow()["\\Nightly"].enabled);

        svc.stop_task("/Nightly").unwrap();
        svc.create_folder("Backup").unwrap();
        svc.delete_folder("\\Backup").unwrap();
        assert_eq!(
            *scheduler.calls.borrow(),
            vec!["stop \\Nightly", "mkdir \\Backup", "rmdir \\Backup"]
        );

        svc.delete_task("\\Nightly").unwrap();
        assert!(svc.show_task("\\Nightly").unwrap_err().is_not_found());
    }

    #[test]
    fn list_tasks_of_missing_folder_is_not_found() {
        let scheduler = StubScheduler::default();
        let store = MemoryStore::default();
        let err = service(&scheduler, &store)
            .list_tasks("\\Missing", true, false)
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
