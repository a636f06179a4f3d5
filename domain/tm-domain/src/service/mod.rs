//! ドメインサービス

pub mod folder_tree;

pub use folder_tree::*;
