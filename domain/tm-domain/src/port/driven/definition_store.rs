//! タスク定義の保存先ポート（エクスポート/インポート）

use crate::error::DomainError;
use crate::model::Definition;
use std::path::Path;

pub trait DefinitionStore {
    fn load(&self, path: &Path) -> Result<Definition, DomainError>;

    fn save(&self, path: &Path, definition: &Definition) -> Result<(), DomainError>;
}
