//! Taskmaster ドメイン層
//!
//! Windows タスクスケジューラのオブジェクトモデルを型付きで写したカタログ。
//! 外部依存ゼロでRust標準ライブラリのみ使用。
//! ヘキサゴナルアーキテクチャの最内層。

pub mod error;   // ドメインエラー定義
pub mod model;   // タスク定義・トリガー・アクション等の値型
pub mod path;    // タスクパス正規化ユーティリティ
pub mod port;    // ポート（driven）
pub mod service; // ドメインサービス

pub use error::DomainError; // エラー型を再エクスポート
