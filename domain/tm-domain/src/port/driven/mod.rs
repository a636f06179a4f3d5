//! 駆動ポート（出力インターフェース）。
//!
//! ドメインが外部に求める機能を定義する。
//! インフラ層のアダプタが実装する。

mod config_repository;
mod definition_store;
mod task_service;

pub use config_repository::*;
pub use definition_store::*;
pub use task_service::*;
