//! フォルダツリーの走査・検証
//!
//! 不変条件: パスは一意、ルートは "\" で親を持たない、子のパスは「親\名前」。

use crate::error::DomainError;
use crate::model::{RegisteredTask, TaskFolder};
use crate::path::{join_task_path, same_task_path};
use std::collections::BTreeSet;

/// 前順でフォルダを列挙する（自身を含む）
pub fn walk_folders(root: &TaskFolder) -> Vec<&TaskFolder> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(folder) = stack.pop() {
        out.push(folder);
        // 先頭の子から処理されるよう逆順に積む
        for child in folder.sub_folders.iter().rev() {
            stack.push(child);
        }
    }
    out
}

/// パスでフォルダを探す（大文字小文字無視）
pub fn find_folder<'a>(root: &'a TaskFolder, path: &str) -> Option<&'a TaskFolder> {
    walk_folders(root)
        .into_iter()
        .find(|f| same_task_path(&f.path, path))
}

/// 配下の全タスク（前順）
pub fn collect_tasks(root: &TaskFolder) -> Vec<RegisteredTask> {
    walk_folders(root)
        .into_iter()
        .flat_map(|f| f.registered_tasks.iter().cloned())
        .collect()
}

/// ツリーの不変条件を検証する
pub fn verify_tree(root: &TaskFolder) -> Result<(), DomainError> {
    if !root.is_root() {
        return Err(DomainError::ValidationError(format!(
            "root folder path must be \\, got {}",
            root.path
        )));
    }

    let mut seen = BTreeSet::new();
    let mut stack = vec![root];
    while let Some(folder) = stack.pop() {
        if !seen.insert(folder.path.to_ascii_lowercase()) {
            return Err(DomainError::ValidationError(format!(
                "duplicate folder path: {}",
                folder.path
            )));
        }
        for child in &folder.sub_folders {
            let expected = join_task_path(&folder.path, &child.name);
            if !same_task_path(&expected, &child.path) {
                return Err(DomainError::ValidationError(format!(
                    "folder {} is not under {}",
                    child.path, folder.path
                )));
            }
            stack.push(child);
        }
    }
    Ok(())
}
