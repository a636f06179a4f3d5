//! 実行ファイル向けのエラー表示

use std::error::Error;
use tm_domain::DomainError;

pub type Result<T> = std::result::Result<T, Box<dyn Error + Send + Sync>>;

/// 利用者向けの失敗メッセージ（対処のヒント付き）
pub fn failure_message(err: &(dyn Error + 'static)) -> String {
    let hint = match err.downcast_ref::<DomainError>() {
        Some(DomainError::AccessDenied(_)) => {
            Some("run from an elevated prompt or pass --user/--password")
        }
        Some(DomainError::NotFound(_)) => {
            Some("task paths start at the root folder, e.g. \\Folder\\Task")
        }
        Some(DomainError::ConnectFailed(_)) => Some("check --server and the credentials"),
        Some(DomainError::Unsupported(_)) => Some("the Task Scheduler API is only available on Windows"),
        _ => None,
    };
    match hint {
        Some(hint) => format!("{err} (hint: {hint})"),
        None => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_carry_a_hint() {
        let err: Box<dyn Error + Send + Sync> = DomainError::NotFound("\\Backup".into()).into();
        let message = failure_message(err.as_ref());
        assert!(message.starts_with("Not found: \\Backup (hint:"));

        let denied = DomainError::AccessDenied("\\Ops".into());
        assert!(failure_message(&denied).contains("--user/--password"));
    }

    #[test]
    fn other_errors_are_shown_as_is() {
        fn fails() -> Result<()> {
            Err(DomainError::ValidationError("bad path".into()).into())
        }
        let err = fails().unwrap_err();
        assert_eq!(failure_message(err.as_ref()), err.to_string());

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        assert_eq!(failure_message(&io), "disk full");
    }
}
