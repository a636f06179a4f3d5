//! ログユーティリティ
//!
//! - ライフサイクル行: 起動/終了など、tracing 初期化前後を問わず残したい1行ログ
//! - tracing: stderr へのフォーマット出力（RUST_LOG で上書き可能）

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tm_domain::model::civil_from_days;

/// ライフサイクルログのファイル名
pub const LIFECYCLE_LOG_FILE: &str = "tm-lifecycle.log";

/// UTCのRFC3339（ミリ秒付き）。例: 2025-01-15T10:30:00.123Z
pub fn utc_rfc3339_millis() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format_utc_millis(now.as_secs(), now.subsec_millis())
}

fn format_utc_millis(secs: u64, millis: u32) -> String {
    let (year, month, day, hour, minute, second) = unix_seconds_to_utc_components(secs);
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
        year, month, day, hour, minute, second, millis
    )
}

/// UTCタイムスタンプ付きのライフサイクル行を作成する。
pub fn lifecycle_line(component: &str, message: &str) -> String {
    let timestamp = utc_rfc3339_millis();
    format!("[{}] [{}] {}\n", timestamp, component, message)
}

/// アプリのデータルート（%ProgramData%\Taskmaster）
pub fn program_data_root() -> PathBuf {
    let base = std::env::var("ProgramData").unwrap_or_else(|_| "C:\\ProgramData".to_string());
    PathBuf::from(base).join("Taskmaster")
}

/// ライフサイクルログの既定出力先（先頭から順に試す）
pub fn default_lifecycle_log_paths() -> Vec<PathBuf> {
    vec![
        program_data_root().join("logs").join(LIFECYCLE_LOG_FILE),
        std::env::temp_dir().join(LIFECYCLE_LOG_FILE),
    ]
}

/// 指定された出力先のうち、書き込み可能な最初の場所にログを書き込む。
/// 書き込めた場所を返す。
pub fn write_line_to_paths(line: &str, paths: &[PathBuf]) -> Option<PathBuf> {
    for path in paths {
        if let Some(dir) = path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
            if file.write_all(line.as_bytes()).is_ok() {
                let _ = file.flush();
                return Some(path.clone());
            }
        }
    }
    None
}

/// 既定の出力先にライフサイクル行を書き込む
pub fn write_lifecycle_line(component: &str, message: &str) {
    let line = lifecycle_line(component, message);
    let _ = write_line_to_paths(&line, &default_lifecycle_log_paths());
}

/// 指定ファイルにライフサイクル行を書き込む（失敗は無視）
pub fn write_lifecycle_line_to(path: &Path, component: &str, message: &str) {
    let line = lifecycle_line(component, message);
    let _ = write_line_to_paths(&line, &[path.to_path_buf()]);
}

/// tracing の既定フィルタ
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

/// tracing サブスクライバを初期化する（stderr 出力）。
/// RUST_LOG があればそちらを優先。二重初期化は無視する。
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .compact()
        .try_init()
        .ok();
}

fn unix_seconds_to_utc_components(secs: u64) -> (i32, u32, u32, u32, u32, u32) {
    let days = (secs / 86_400) as i64;
    let rem = (secs % 86_400) as i64;
    let hour = (rem / 3_600) as u32;
    let minute = ((rem % 3_600) / 60) as u32;
    let second = (rem % 60) as u32;
    let (year, month, day) = civil_from_days(days);
    (year, month, day, hour, minute, second)
}
