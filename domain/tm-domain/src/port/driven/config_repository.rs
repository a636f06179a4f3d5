//! 設定リポジトリポート

use crate::error::DomainError;
use crate::model::AppConfig;

pub trait ConfigRepository {
    fn load(&self) -> Result<AppConfig, DomainError>;

    fn exists(&self) -> bool;
}
