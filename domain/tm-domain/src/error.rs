//! ドメインエラー型
//!
//! 標準ライブラリのみ使用（外部エラーハンドリングクレートなし）
//!
//! カタログ自体は検証も I/O も行わない。ここで定義するのは
//! カタログを読み書きする協調者（COMアダプタ等）が返すエラー。

use std::fmt;

/// 「見つからない」を示す HRESULT（ERROR_FILE_NOT_FOUND / ERROR_PATH_NOT_FOUND）
pub const HRESULT_NOT_FOUND: [u32; 2] = [0x8007_0002, 0x8007_0003];

/// アクセス拒否（E_ACCESSDENIED）
pub const HRESULT_ACCESS_DENIED: u32 = 0x8007_0005;

/// ドメイン層のエラー型
/// 各バリアントは特定の失敗シナリオを表現
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// COM 初期化失敗
    ComInitFailed(String),

    /// タスクスケジューラサービスへの接続失敗
    ConnectFailed(String),

    /// タスク/フォルダが見つからない
    NotFound(String),

    /// アクセス拒否（管理者権限不足など）
    AccessDenied(String),

    /// ネイティブ呼び出しの失敗
    NativeCall {
        context: String,
        hresult: u32,
        message: String,
    },

    /// カタログに存在しないネイティブ数値コード
    UnknownCode { kind: &'static str, value: i32 },

    /// バリデーションエラー
    ValidationError(String),

    /// 設定ファイルの読み込み失敗
    ConfigLoadFailed(String),

    /// ファイルI/Oエラー
    IoError(String),

    /// 非対応プラットフォーム
    Unsupported(String),
}

impl DomainError {
    /// HRESULT から適切なバリアントへ振り分ける
    pub fn from_hresult(context: impl Into<String>, hresult: u32, message: impl Into<String>) -> Self {
        let context = context.into();
        if HRESULT_NOT_FOUND.contains(&hresult) {
            Self::NotFound(context)
        } else if hresult == HRESULT_ACCESS_DENIED {
            Self::AccessDenied(context)
        } else {
            Self::NativeCall {
                context,
                hresult,
                message: message.into(),
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ComInitFailed(msg) => {
                write!(f, "COM initialization failed: {}", msg)
            }
            Self::ConnectFailed(msg) => {
                write!(f, "Task Scheduler connection failed: {}", msg)
            }
            Self::NotFound(what) => {
                write!(f, "Not found: {}", what)
            }
            Self::AccessDenied(what) => {
                write!(f, "Access denied: {}", what)
            }
            Self::NativeCall {
                context,
                hresult,
                message,
            } => {
                write!(f, "{} failed (0x{:08x}): {}", context, hresult, message)
            }
            Self::UnknownCode { kind, value } => {
                write!(f, "Unknown {} code: {}", kind, value)
            }
            Self::ValidationError(msg) => {
                write!(f, "Validation error: {}", msg)
            }
            Self::ConfigLoadFailed(msg) => {
                write!(f, "Configuration load failed: {}", msg)
            }
            Self::IoError(msg) => {
                write!(f, "IO error: {}", msg)
            }
            Self::Unsupported(msg) => {
                write!(f, "Unsupported: {}", msg)
            }
        }
    }
}

impl std::error::Error for DomainError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_hresult_maps_well_known_codes() {
        assert!(DomainError::from_hresult("GetTask", 0x8007_0002, "x").is_not_found());
        assert!(DomainError::from_hresult("GetFolder", 0x8007_0003, "x").is_not_found());
        assert_eq!(
            DomainError::from_hresult("RegisterTaskDefinition", 0x8007_0005, "denied"),
            DomainError::AccessDenied("RegisterTaskDefinition".into())
        );
        assert_eq!(
            DomainError::from_hresult("Run", 0x8004_1326, "disabled"),
            DomainError::NativeCall {
                context: "Run".into(),
                hresult: 0x8004_1326,
                message: "disabled".into(),
            }
        );
    }

    #[test]
    fn display_includes_hresult_in_hex() {
        let e = DomainError::NativeCall {
            context: "Run".into(),
            hresult: 0x8004_1326,
            message: "The task is disabled.".into(),
        };
        assert_eq!(e.to_string(), "Run failed (0x80041326): The task is disabled.");
    }
}
