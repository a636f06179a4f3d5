//! 登録情報（IRegistrationInfo）

/// 作成者などのメタデータ
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegistrationInfo {
    pub author: String,
    pub date: String,
    pub description: String,
    pub documentation: String,
    /// SDDL 文字列
    pub security_descriptor: String,
    pub source: String,
    pub uri: String,
    pub version: String,
}
