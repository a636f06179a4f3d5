//! tm: Windows タスクスケジューラの管理用 CLI。
//! フォルダ/タスクの参照、実行・停止、有効化、定義のエクスポート/インポートを行う。

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tm_composition::cli::{CliRuntime, RuntimeOptions};
use tm_composition::domain::model::{
    ActionType, Compatibility, InstancesPolicy, LogonType, RegisteredTask, RunLevel,
    RunningTask, SessionStateChange, TaskCreationFlags, TaskFolder, TaskService, TaskState,
    TriggerType,
};
use tm_composition::domain::service::{find_folder, walk_folders};
use tm_composition::error::{failure_message, Result};
use tm_composition::{definition_to_json, init_tracing, write_lifecycle_line};
use tm_composition::{ConnectionConfig, ImportOptions};

#[derive(Parser, Debug)]
#[command(name = "tm", version, about = "Windows Task Scheduler management CLI")]
struct Cli {
    /// 設定ファイル（既定: %ProgramData%\Taskmaster\config\config.json）
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// 接続先サーバー（既定: ローカル）
    #[arg(long, global = true)]
    server: Option<String>,
    /// 接続ユーザー
    #[arg(long, global = true)]
    user: Option<String>,
    /// 接続ユーザーのドメイン
    #[arg(long, global = true)]
    domain: Option<String>,
    /// 接続ユーザーのパスワード
    #[arg(long, global = true)]
    password: Option<String>,
    /// 詳細ログ（RUST_LOG 未設定時は debug）
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 接続先サービスの情報と件数
    Info {
        /// 隠しタスクも数える
        #[arg(long, default_value_t = false)]
        hidden: bool,
    },
    /// フォルダツリーを表示
    Tree {
        /// 起点フォルダ（既定: 設定の default_folder）
        folder: Option<String>,
        /// 隠しタスクも表示
        #[arg(long, default_value_t = false)]
        hidden: bool,
    },
    /// タスク一覧
    List {
        /// 対象フォルダ（既定: 設定の default_folder）
        folder: Option<String>,
        /// サブフォルダも含める
        #[arg(short, long, default_value_t = false)]
        recursive: bool,
        /// 隠しタスクも表示
        #[arg(long, default_value_t = false)]
        hidden: bool,
    },
    /// タスクの詳細
    Show {
        /// タスクのパス（例: \Microsoft\Windows\Defrag\ScheduledDefrag）
        path: String,
        /// JSON形式で出力
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// 実行中インスタンス一覧
    Running {
        /// 隠しタスクも表示
        #[arg(long, default_value_t = false)]
        hidden: bool,
    },
    /// タスクを即時実行
    Run { path: String },
    /// 実行中インスタンスを停止
    Stop { path: String },
    /// タスクを有効化
    Enable { path: String },
    /// タスクを無効化
    Disable { path: String },
    /// タスクを削除
    Delete { path: String },
    /// タスク定義を JSON ファイルへ書き出す
    Export { path: String, file: PathBuf },
    /// JSON ファイルの定義を登録
    Import {
        file: PathBuf,
        path: String,
        /// 既存タスクを上書き
        #[arg(long, default_value_t = false)]
        overwrite: bool,
        /// 無効状態で登録
        #[arg(long, default_value_t = false)]
        disabled: bool,
        /// サービス側で検証のみ行う
        #[arg(long, default_value_t = false)]
        validate_only: bool,
    },
    /// フォルダを作成
    Mkdir { path: String },
    /// 空フォルダを削除
    Rmdir { path: String },
    /// ネイティブの列挙値一覧
    Codes,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if let Err(err) = run(cli) {
        write_lifecycle_line("tm", &format!("failed: {err}"));
        eprintln!("tm failed: {}", failure_message(&*err));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // 接続不要のコマンド
    if let Command::Codes = cli.command {
        print_codes();
        return Ok(());
    }

    let runtime = CliRuntime::new(RuntimeOptions {
        config_path: cli.config,
        connection: ConnectionConfig {
            server: cli.server,
            user: cli.user,
            domain: cli.domain,
            password: cli.password,
        },
    })?;
    let app = runtime.app();

    match cli.command {
        Command::Info { hidden } => {
            let snapshot = app.snapshot(runtime.include_hidden(hidden))?;
            print_info(&snapshot, runtime.default_folder());
        }

        Command::Tree { folder, hidden } => {
            let folder = folder.unwrap_or_else(|| runtime.default_folder().to_string());
            let tree = app.folder_tree(&folder, runtime.include_hidden(hidden))?;
            print_tree(&tree, 0);
        }

        Command::List {
            folder,
            recursive,
            hidden,
        } => {
            let folder = folder.unwrap_or_else(|| runtime.default_folder().to_string());
            let tasks = app.list_tasks(&folder, recursive, runtime.include_hidden(hidden))?;
            println!("{} task(s) in {}:", tasks.len(), folder);
            for task in &tasks {
                println!(
                    "  {:<10} {:<5} next={:<19} {}",
                    task.state.as_str(),
                    if task.enabled { "on" } else { "off" },
                    format_time(task.next_run_time),
                    task.path
                );
            }
        }

        Command::Show { path, json } => {
            let task = app.show_task(&path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&task_json(&task)?)?);
            } else {
                print_task(&task);
            }
        }

        Command::Running { hidden } => {
            let running = app.running_tasks(runtime.include_hidden(hidden))?;
            println!("{} running instance(s):", running.len());
            for task in &running {
                print_running(task);
            }
        }

        Command::Run { path } => {
            let running = app.run_task(&path)?;
            println!("Started {}", running.path);
            print_running(&running);
        }

        Command::Stop { path } => {
            app.stop_task(&path)?;
            println!("Stopped {path}");
        }

        Command::Enable { path } => {
            app.set_enabled(&path, true)?;
            println!("Enabled {path}");
        }

        Command::Disable { path } => {
            app.set_enabled(&path, false)?;
            println!("Disabled {path}");
        }

        Command::Delete { path } => {
            app.delete_task(&path)?;
            write_lifecycle_line("tm", &format!("deleted task {path}"));
            println!("Deleted {path}");
        }

        Command::Export { path, file } => {
            let task = app.export_task(&path, &file)?;
            println!("Exported {} -> {}", task.path, file.display());
        }

        Command::Import {
            file,
            path,
            overwrite,
            disabled,
            validate_only,
        } => {
            let options = ImportOptions {
                overwrite,
                disabled,
                validate_only,
            };
            match app.import_task(&file, &path, options)? {
                Some(task) => {
                    write_lifecycle_line("tm", &format!("imported task {}", task.path));
                    println!("Registered {} ({})", task.path, task.state);
                }
                None => println!("Definition is valid: {}", file.display()),
            }
        }

        Command::Mkdir { path } => {
            let folder = app.create_folder(&path)?;
            println!("Created folder {}", folder.path);
        }

        Command::Rmdir { path } => {
            app.delete_folder(&path)?;
            println!("Deleted folder {path}");
        }

        Command::Codes => print_codes(),
    }

    Ok(())
}

fn format_time(value: Option<tm_composition::domain::model::OleDate>) -> String {
    value.map(|t| t.to_string()).unwrap_or_else(|| "-".to_string())
}

fn print_tree(folder: &TaskFolder, depth: usize) {
    let indent = "  ".repeat(depth);
    let name = if folder.is_root() { "\\" } else { folder.name.as_str() };
    println!("{indent}{name}/");
    for task in &folder.registered_tasks {
        println!("{indent}  {} [{}]", task.name, task.state);
    }
    for child in &folder.sub_folders {
        print_tree(child, depth + 1);
    }
}

fn print_info(snapshot: &TaskService, default_folder: &str) {
    let info = &snapshot.info;
    let (major, minor) = info.highest_version_parts();
    println!("Server:           {}", info.target_server);
    println!("Connected user:   {}", info.connected_user);
    println!("Connected domain: {}", info.connected_domain);
    println!("Highest version:  {major}.{minor}");
    println!("Folders:          {}", walk_folders(&snapshot.root_folder).len());
    println!("Tasks:            {}", snapshot.registered_tasks.len());
    println!("Running:          {}", snapshot.running_tasks.len());
    println!("{}", default_folder_line(snapshot, default_folder));
}

/// 既定フォルダの直下タスク数（存在しなければその旨）
fn default_folder_line(snapshot: &TaskService, default_folder: &str) -> String {
    match find_folder(&snapshot.root_folder, default_folder) {
        Some(folder) => format!(
            "Default folder:   {} ({} task(s))",
            folder.path,
            folder.registered_tasks.len()
        ),
        None => format!("Default folder:   {default_folder} (missing)"),
    }
}

fn print_running(task: &RunningTask) {
    println!(
        "  {} pid={} state={} action={} {}",
        task.instance_guid, task.engine_pid, task.state, task.current_action, task.path
    );
}

fn print_task(task: &RegisteredTask) {
    let def = &task.definition;
    println!("Path:          {}", task.path);
    println!("State:         {}", task.state);
    println!("Enabled:       {}", task.enabled);
    println!("Last run:      {}", format_time(task.last_run_time));
    println!("Last result:   0x{:08x}", task.last_task_result as u32);
    println!("Next run:      {}", format_time(task.next_run_time));
    println!("Missed runs:   {}", task.missed_runs);
    if !def.registration_info.author.is_empty() {
        println!("Author:        {}", def.registration_info.author);
    }
    if !def.registration_info.description.is_empty() {
        println!("Description:   {}", def.registration_info.description);
    }
    let account = def.principal.account().unwrap_or("(default)");
    println!(
        "Principal:     {} logon={} level={}",
        account, def.principal.logon_type, def.principal.run_level
    );
    println!("Triggers ({}):", def.triggers.len());
    for trigger in &def.triggers {
        let state = if trigger.is_enabled() { "" } else { " (disabled)" };
        println!("  - {}{}", trigger.summary(), state);
    }
    println!("Actions ({}):", def.actions.len());
    for action in &def.actions {
        println!("  - {}", action.summary());
    }
}

/// 状態と定義をまとめた JSON
fn task_json(task: &RegisteredTask) -> Result<serde_json::Value> {
    let definition: serde_json::Value = serde_json::from_str(&definition_to_json(&task.definition)?)?;
    Ok(serde_json::json!({
        "name": task.name,
        "path": task.path,
        "enabled": task.enabled,
        "state": task.state.as_str(),
        "missed_runs": task.missed_runs,
        "last_run_time": task.last_run_time.map(|t| t.to_string()),
        "next_run_time": task.next_run_time.map(|t| t.to_string()),
        "last_task_result": task.last_task_result,
        "definition": definition,
    }))
}

fn print_codes() {
    fn section<T: Copy + std::fmt::Display>(title: &str, values: &[T], code: impl Fn(T) -> i32) {
        println!("{title}:");
        for value in values {
            println!("  {:>3}  {}", code(*value), value);
        }
    }

    section("TASK_STATE", TaskState::all(), TaskState::as_i32);
    section("TASK_RUNLEVEL_TYPE", RunLevel::all(), RunLevel::as_i32);
    section("TASK_ACTION_TYPE", ActionType::all(), ActionType::as_i32);
    section("TASK_LOGON_TYPE", LogonType::all(), LogonType::as_i32);
    section("TASK_COMPATIBILITY", Compatibility::all(), Compatibility::as_i32);
    section("TASK_INSTANCES_POLICY", InstancesPolicy::all(), InstancesPolicy::as_i32);
    section("TASK_TRIGGER_TYPE2", TriggerType::all(), TriggerType::as_i32);
    section(
        "TASK_SESSION_STATE_CHANGE_TYPE",
        SessionStateChange::all(),
        SessionStateChange::as_i32,
    );
    println!("TASK_CREATION:");
    for (name, flag) in TaskCreationFlags::NAMED {
        println!("  0x{:02x}  {}", flag.bits(), name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_connection_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "tm", "list", "\\Ops", "--recursive", "--server", "build-01", "--user", "svc", "-v",
        ])
        .unwrap();
        assert_eq!(cli.server.as_deref(), Some("build-01"));
        assert_eq!(cli.user.as_deref(), Some("svc"));
        assert!(cli.verbose);
        match cli.command {
            Command::List {
                folder, recursive, ..
            } => {
                assert_eq!(folder.as_deref(), Some("\\Ops"));
                assert!(recursive);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn import_flags_parse() {
        let cli = Cli::try_parse_from([
            "tm", "import", "backup.json", "\\Backup", "--overwrite", "--validate-only",
        ])
        .unwrap();
        match cli.command {
            Command::Import {
                file,
                path,
                overwrite,
                disabled,
                validate_only,
            } => {
                assert_eq!(file, PathBuf::from("backup.json"));
                assert_eq!(path, "\\Backup");
                assert!(overwrite && validate_only && !disabled);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn info_accepts_hidden_flag() {
        let cli = Cli::try_parse_from(["tm", "info", "--hidden"]).unwrap();
        assert!(matches!(cli.command, Command::Info { hidden: true }));
    }

    #[test]
    fn default_folder_line_looks_up_folder_case_insensitively() {
        let ops = TaskFolder {
            name: "Ops".into(),
            path: "\\Ops".into(),
            registered_tasks: vec![RegisteredTask {
                name: "Backup".into(),
                path: "\\Ops\\Backup".into(),
                ..RegisteredTask::default()
            }],
            ..TaskFolder::default()
        };
        let snapshot = TaskService {
            root_folder: TaskFolder {
                name: "\\".into(),
                path: "\\".into(),
                sub_folders: vec![ops],
                ..TaskFolder::default()
            },
            ..TaskService::default()
        };
        assert_eq!(
            default_folder_line(&snapshot, "\\ops"),
            "Default folder:   \\Ops (1 task(s))"
        );
        assert_eq!(
            default_folder_line(&snapshot, "\\Missing"),
            "Default folder:   \\Missing (missing)"
        );
    }

    #[test]
    fn task_json_embeds_definition() {
        let mut task = RegisteredTask {
            name: "Backup".into(),
            path: "\\Backup".into(),
            enabled: true,
            state: TaskState::Ready,
            ..RegisteredTask::default()
        };
        task.definition.add_exec_action("backup.exe", "", "");
        let value = task_json(&task).unwrap();
        assert_eq!(value["state"], "Ready");
        assert_eq!(value["next_run_time"], serde_json::Value::Null);
        assert_eq!(value["definition"]["actions"][0]["type"], "Exec");
        assert_eq!(value["definition"]["actions"][0]["path"], "backup.exe");
    }
}
