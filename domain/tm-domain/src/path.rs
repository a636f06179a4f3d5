//! タスクパス正規化ユーティリティ（stdのみ）
//!
//! タスクスケジューラのパスは "\" 区切りで、ルートは "\"。

const ROOT: &str = "\\";
const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*', '\0'];

/// タスク/フォルダのパスを正規化する。
/// "/" は "\" に変換し、先頭 "\" を補い、連続区切りと末尾区切りを除く。
/// "." / ".." や使用不可文字を含む場合は None。
pub fn normalize_task_path(path: &str) -> Option<String> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return None;
    }

    let s = trimmed.replace('/', ROOT);
    let mut parts: Vec<&str> = Vec::new();
    for part in s.split('\\') {
        if part.is_empty() {
            continue;
        }
        if part == "." || part == ".." || part.contains(INVALID_CHARS) {
            return None;
        }
        if part.trim() != part {
            return None;
        }
        parts.push(part);
    }

    if parts.is_empty() {
        return Some(ROOT.to_string());
    }
    Some(format!("{ROOT}{}", parts.join(ROOT)))
}

/// (親フォルダ, 名前) に分割する。ルート直下なら親は "\"。
/// 正規化済みのパスを前提とする。
pub fn split_task_path(path: &str) -> (&str, &str) {
    match path.rfind('\\') {
        Some(0) => (ROOT, &path[1..]),
        Some(idx) => (&path[..idx], &path[idx + 1..]),
        None => (ROOT, path),
    }
}

/// フォルダと名前を連結する
pub fn join_task_path(folder: &str, name: &str) -> String {
    let folder = folder.trim_end_matches('\\');
    let name = name.trim_start_matches('\\');
    if folder.is_empty() {
        format!("{ROOT}{name}")
    } else {
        format!("{folder}{ROOT}{name}")
    }
}

/// 大文字小文字を無視したパス比較（ネイティブ側は区別しない）
pub fn same_task_path(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_adds_root_and_collapses_separators() {
        assert_eq!(normalize_task_path("MyTask").as_deref(), Some("\\MyTask"));
        assert_eq!(
            normalize_task_path("//Microsoft\\\\Windows/Defrag/").as_deref(),
            Some("\\Microsoft\\Windows\\Defrag")
        );
        assert_eq!(normalize_task_path("\\").as_deref(), Some("\\"));
        assert_eq!(normalize_task_path(" \\Folder ").as_deref(), Some("\\Folder"));
    }

    #[test]
    fn normalize_rejects_invalid_segments() {
        assert_eq!(normalize_task_path(""), None);
        assert_eq!(normalize_task_path("\\a\\..\\b"), None);
        assert_eq!(normalize_task_path("\\a\\.\\b"), None);
        assert_eq!(normalize_task_path("\\a?b"), None);
        assert_eq!(normalize_task_path("C:\\task"), None);
        assert_eq!(normalize_task_path("\\ padded \\x"), None);
    }

    #[test]
    fn split_and_join() {
        assert_eq!(split_task_path("\\Task"), ("\\", "Task"));
        assert_eq!(split_task_path("\\A\\B\\Task"), ("\\A\\B", "Task"));
        assert_eq!(join_task_path("\\", "Task"), "\\Task");
        assert_eq!(join_task_path("\\A\\B", "Task"), "\\A\\B\\Task");
        assert_eq!(join_task_path("\\A\\", "\\Task"), "\\A\\Task");
    }

    #[test]
    fn comparison_ignores_case() {
        assert!(same_task_path("\\Microsoft\\Windows", "\\microsoft\\WINDOWS"));
    }
}
