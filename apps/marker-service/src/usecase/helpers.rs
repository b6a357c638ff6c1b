//! ユースケース層の共通ヘルパー

use mapmark_infra::InfraError;

use crate::error::CoreError;

/// リポジトリの `Result<Option<T>, InfraError>` を `Result<T, CoreError>` に変換する
///
/// ```ignore
/// let user = self.user_repo.find_by_id(&user_id).await.or_not_found("User")?;
/// ```
pub(crate) trait FindResultExt<T> {
    /// `None` の場合は `CoreError::NotFound`、`InfraError` の場合は `CoreError::Database` を返す
    fn or_not_found(self, entity_name: &str) -> Result<T, CoreError>;
}

impl<T> FindResultExt<T> for Result<Option<T>, InfraError> {
    fn or_not_found(self, entity_name: &str) -> Result<T, CoreError> {
        self?.ok_or_else(|| not_found(entity_name))
    }
}

/// `"<entity> not found"` 形式の NotFound エラーを作る
pub(crate) fn not_found(entity_name: &str) -> CoreError {
    CoreError::NotFound(format!("{} not found", entity_name))
}
