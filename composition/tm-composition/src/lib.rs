//! tm-composition: 実行ファイル向けのランタイムを組み立てるコンポジションルート。
//! ドメイン／アプリケーション／各種アダプタをここで配線し、apps/* はこのクレートだけに依存する。

pub mod cli;
pub mod error;
pub mod paths;

// apps/* が内側レイヤーの型に触れる必要がある場合は、ここから辿れるようにする。
pub use tm_app as app;
pub use tm_domain as domain;

pub use tm_app::{ImportOptions, TaskAdminService};
pub use tm_domain::model::{AppConfig, ConnectionConfig};
pub use tm_domain::DomainError;

// ログ
pub use tm_log_utils::{init_tracing, write_lifecycle_line};

// 定義の JSON 表示
pub use tm_adapter_fs::definition_to_json;
