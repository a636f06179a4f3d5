//! 既定のファイル配置

use std::path::PathBuf;

/// 設定ファイルの既定パス（%ProgramData%\Taskmaster\config\config.json）
pub fn default_config_path() -> PathBuf {
    tm_log_utils::program_data_root()
        .join("config")
        .join("config.json")
}
