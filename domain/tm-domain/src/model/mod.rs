//! ドメインモデル
//!
//! 標準ライブラリのみ使用（外部依存なし）
//! タスクスケジューラのオブジェクトモデルを値型として定義する

mod action;       // アクション（Exec / ComHandler / SendEmail / ShowMessage）
mod calendar;     // 曜日・月などのビットマスク
mod codes;        // ネイティブ列挙値・フラグ
mod config;       // 接続設定・アプリ設定
mod definition;   // タスク定義
mod principal;    // 実行主体
mod registration; // 登録情報
mod settings;     // 実行ポリシー
mod task;         // サービス / フォルダ / 登録済み・実行中タスク
mod time;         // DATE 型
mod trigger;      // トリガー

pub use action::*;
pub use calendar::*;
pub use codes::*;
pub use config::*;
pub use definition::*;
pub use principal::*;
pub use registration::*;
pub use settings::*;
pub use task::*;
pub use time::*;
pub use trigger::*;
