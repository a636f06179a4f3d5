//! tm-adapter-task: Windows タスクスケジューラ（ITaskService）の COM アダプタ。
//! ネイティブオブジェクトとカタログ型の相互変換を行い、TaskServicePort を実装する。
//!
//! ネイティブ参照は保持せず、呼び出しごとに接続してパスで解決し直す。

#[cfg(windows)]
mod com;
#[cfg(windows)]
mod read;
#[cfg(windows)]
mod write;

use tm_domain::model::{
    ConnectionConfig, RegisteredTask, RunningTask, ServiceInfo, TaskCreationFlags, TaskFolder,
};
use tm_domain::port::driven::{RegisterRequest, TaskServicePort};
use tm_domain::DomainError;

#[cfg(windows)]
use com::{bstr, com_error, variant_bool, with_task_service};
#[cfg(windows)]
use windows::core::VARIANT;
#[cfg(windows)]
use tm_domain::model::{TaskState, TASK_ENUM_HIDDEN};
#[cfg(windows)]
use tm_domain::path::split_task_path;
#[cfg(windows)]
use tracing::{debug, info};

/// タスクスケジューラアダプター
/// 接続設定（ローカル/リモート、資格情報）を保持する。
#[derive(Debug, Clone, Default)]
pub struct TaskSchedulerAdapter {
    connection: ConnectionConfig,
}

impl TaskSchedulerAdapter {
    pub fn new(connection: ConnectionConfig) -> Self {
        Self { connection }
    }

    /// ローカルマシン、現在のユーザーで接続する
    pub fn local() -> Self {
        Self::new(ConnectionConfig::local())
    }

    pub fn connection(&self) -> &ConnectionConfig {
        &self.connection
    }
}

/// 登録呼び出しが失敗扱いでも、検証のみの成功（HRESULT が成功値）なら true
#[cfg_attr(not(windows), allow(dead_code))]
pub(crate) fn validated_without_task(hresult: i32, flags: TaskCreationFlags) -> bool {
    hresult >= 0 && flags.contains(TaskCreationFlags::VALIDATE_ONLY)
}

#[cfg(not(windows))]
fn unsupported<T>(operation: &str) -> Result<T, DomainError> {
    Err(DomainError::Unsupported(format!(
        "{operation}: Task Scheduler is only available on Windows"
    )))
}

impl TaskServicePort for TaskSchedulerAdapter {
    fn service_info(&self) -> Result<ServiceInfo, DomainError> {
        #[cfg(windows)]
        {
            with_task_service(&self.connection, |service, _root| unsafe {
                Ok(read::read_service_info(service))
            })
        }

        #[cfg(not(windows))]
        {
            unsupported("service_info")
        }
    }

    fn folder(&self, path: &str, include_hidden: bool) -> Result<TaskFolder, DomainError> {
        #[cfg(windows)]
        {
            with_task_service(&self.connection, |service, _root| unsafe {
                let folder = service
                    .GetFolder(&bstr(path))
                    .map_err(|e| com_error(&format!("GetFolder({path})"), e))?;
                read::read_folder(&folder, include_hidden)
            })
        }

        #[cfg(not(windows))]
        {
            let _ = (path, include_hidden);
            unsupported("folder")
        }
    }

    /// 親フォルダの CreateFolder を呼ぶ（SDDL は親から継承）
    fn create_folder(&self, path: &str) -> Result<TaskFolder, DomainError> {
        #[cfg(windows)]
        {
            with_task_service(&self.connection, |service, _root| unsafe {
                let (parent, name) = split_task_path(path);
                let parent = service
                    .GetFolder(&bstr(parent))
                    .map_err(|e| com_error(&format!("GetFolder({parent})"), e))?;
                let created = parent
                    .CreateFolder(&bstr(name), &VARIANT::new())
                    .map_err(|e| com_error(&format!("CreateFolder({path})"), e))?;
                info!(path, "folder created");
                read::read_folder(&created, false)
            })
        }

        #[cfg(not(windows))]
        {
            let _ = path;
            unsupported("create_folder")
        }
    }

    fn delete_folder(&self, path: &str) -> Result<(), DomainError> {
        #[cfg(windows)]
        {
            with_task_service(&self.connection, |service, _root| unsafe {
                let (parent, name) = split_task_path(path);
                let parent = service
                    .GetFolder(&bstr(parent))
                    .map_err(|e| com_error(&format!("GetFolder({parent})"), e))?;
                parent
                    .DeleteFolder(&bstr(name), 0)
                    .map_err(|e| com_error(&format!("DeleteFolder({path})"), e))?;
                info!(path, "folder deleted");
                Ok(())
            })
        }

        #[cfg(not(windows))]
        {
            let _ = path;
            unsupported("delete_folder")
        }
    }

    fn task(&self, path: &str) -> Result<RegisteredTask, DomainError> {
        #[cfg(windows)]
        {
            with_task_service(&self.connection, |_service, root| unsafe {
                let task = root
                    .GetTask(&bstr(path))
                    .map_err(|e| com_error(&format!("GetTask({path})"), e))?;
                read::read_registered_task(&task)
            })
        }

        #[cfg(not(windows))]
        {
            let _ = path;
            unsupported("task")
        }
    }

    fn running_tasks(&self, include_hidden: bool) -> Result<Vec<RunningTask>, DomainError> {
        #[cfg(windows)]
        {
            with_task_service(&self.connection, |service, _root| unsafe {
                let flags = if include_hidden { TASK_ENUM_HIDDEN } else { 0 };
                let running = service
                    .GetRunningTasks(flags)
                    .map_err(|e| com_error("ITaskService::GetRunningTasks", e))?;
                let count = running
                    .Count()
                    .map_err(|e| com_error("IRunningTaskCollection::Count", e))?;
                let mut tasks = Vec::with_capacity(count.max(0) as usize);
                for i in 1..=count {
                    let task = running
                        .get_Item(&VARIANT::from(i))
                        .map_err(|e| com_error("IRunningTaskCollection::Item", e))?;
                    tasks.push(read::read_running_task(&task));
                }
                debug!(count = tasks.len(), "running tasks enumerated");
                Ok(tasks)
            })
        }

        #[cfg(not(windows))]
        {
            let _ = include_hidden;
            unsupported("running_tasks")
        }
    }

    /// 定義を NewTask から組み立て直して登録する。
    /// 検証のみ（VALIDATE_ONLY）のときは登録せず、リクエスト内容をそのまま返す。
    fn register_task(&self, request: &RegisterRequest) -> Result<RegisteredTask, DomainError> {
        #[cfg(windows)]
        {
            with_task_service(&self.connection, |service, _root| unsafe {
                let (parent, name) = split_task_path(&request.path);
                let folder = service
                    .GetFolder(&bstr(parent))
                    .map_err(|e| com_error(&format!("GetFolder({parent})"), e))?;
                match write::register(service, &folder, name, request)? {
                    Some(task) => {
                        info!(path = %task.path, "task registered");
                        Ok(task)
                    }
                    None => Ok(RegisteredTask {
                        name: name.to_string(),
                        path: request.path.clone(),
                        definition: request.definition.clone(),
                        enabled: request.definition.settings.enabled,
                        state: TaskState::Unknown,
                        ..RegisteredTask::default()
                    }),
                }
            })
        }

        #[cfg(not(windows))]
        {
            let _ = request;
            unsupported("register_task")
        }
    }

    fn delete_task(&self, path: &str) -> Result<(), DomainError> {
        #[cfg(windows)]
        {
            with_task_service(&self.connection, |service, _root| unsafe {
                let (parent, name) = split_task_path(path);
                let folder = service
                    .GetFolder(&bstr(parent))
                    .map_err(|e| com_error(&format!("GetFolder({parent})"), e))?;
                folder
                    .DeleteTask(&bstr(name), 0)
                    .map_err(|e| com_error(&format!("DeleteTask({path})"), e))?;
                info!(path, "task deleted");
                Ok(())
            })
        }

        #[cfg(not(windows))]
        {
            let _ = path;
            unsupported("delete_task")
        }
    }

    fn run_task(&self, path: &str) -> Result<RunningTask, DomainError> {
        #[cfg(windows)]
        {
            with_task_service(&self.connection, |_service, root| unsafe {
                let task = root
                    .GetTask(&bstr(path))
                    .map_err(|e| com_error(&format!("GetTask({path})"), e))?;
                let running = task
                    .Run(&VARIANT::new())
                    .map_err(|e| com_error(&format!("Run({path})"), e))?;
                Ok(read::read_running_task(&running))
            })
        }

        #[cfg(not(windows))]
        {
            let _ = path;
            unsupported("run_task")
        }
    }

    fn stop_task(&self, path: &str) -> Result<(), DomainError> {
        #[cfg(windows)]
        {
            with_task_service(&self.connection, |_service, root| unsafe {
                let task = root
                    .GetTask(&bstr(path))
                    .map_err(|e| com_error(&format!("GetTask({path})"), e))?;
                task.Stop(0)
                    .map_err(|e| com_error(&format!("Stop({path})"), e))
            })
        }

        #[cfg(not(windows))]
        {
            let _ = path;
            unsupported("stop_task")
        }
    }

    fn set_enabled(&self, path: &str, enabled: bool) -> Result<(), DomainError> {
        #[cfg(windows)]
        {
            with_task_service(&self.connection, |_service, root| unsafe {
                let task = root
                    .GetTask(&bstr(path))
                    .map_err(|e| com_error(&format!("GetTask({path})"), e))?;
                task.SetEnabled(variant_bool(enabled))
                    .map_err(|e| com_error(&format!("SetEnabled({path})"), e))
            })
        }

        #[cfg(not(windows))]
        {
            let _ = (path, enabled);
            unsupported("set_enabled")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_creation() {
        let adapter = TaskSchedulerAdapter::new(ConnectionConfig {
            server: Some("build-01".into()),
            ..ConnectionConfig::default()
        });
        assert_eq!(adapter.connection().server.as_deref(), Some("build-01"));
        assert!(TaskSchedulerAdapter::local().connection().is_local());
    }

    #[test]
    fn validate_only_success_is_recognized_by_hresult() {
        let validate = TaskCreationFlags::CREATE | TaskCreationFlags::VALIDATE_ONLY;
        assert!(validated_without_task(0, validate));
        assert!(validated_without_task(1, validate));
        // E_POINTER や E_ACCESSDENIED は検証のみでもエラー
        assert!(!validated_without_task(0x8000_4003_u32 as i32, validate));
        assert!(!validated_without_task(0x8007_0005_u32 as i32, validate));
        assert!(!validated_without_task(0, TaskCreationFlags::CREATE));
    }

    #[cfg(not(windows))]
    mod non_windows {
        use super::*;
        use tm_domain::model::{Definition, TaskCreationFlags};

        fn assert_unsupported<T: std::fmt::Debug>(result: Result<T, DomainError>) {
            match result {
                Err(DomainError::Unsupported(msg)) => assert!(msg.contains("Windows")),
                other => panic!("expected Unsupported, got {other:?}"),
            }
        }

        #[test]
        fn every_operation_reports_unsupported() {
            let adapter = TaskSchedulerAdapter::local();
            assert_unsupported(adapter.service_info());
            assert_unsupported(adapter.folder("\\", false));
            assert_unsupported(adapter.create_folder("\\Ops"));
            assert_unsupported(adapter.delete_folder("\\Ops"));
            assert_unsupported(adapter.task("\\Backup"));
            assert_unsupported(adapter.running_tasks(true));
            assert_unsupported(adapter.delete_task("\\Backup"));
            assert_unsupported(adapter.run_task("\\Backup"));
            assert_unsupported(adapter.stop_task("\\Backup"));
            assert_unsupported(adapter.set_enabled("\\Backup", false));
        }

        #[test]
        fn register_reports_unsupported() {
            let adapter = TaskSchedulerAdapter::local();
            let request = RegisterRequest::from_definition(
                "\\Backup",
                Definition::new(),
                TaskCreationFlags::CREATE_OR_UPDATE,
            );
            assert_unsupported(adapter.register_task(&request));
        }
    }
}
