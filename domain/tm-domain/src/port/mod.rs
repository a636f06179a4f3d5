//! ポート定義
//!
//! driven: ドメインが外部（OS サービス・ファイル）に求める機能

pub mod driven;
