//! # 値オブジェクト
//!
//! 申請・マーカー・ユーザーが共有する検証付きの値を定義する。
//! すべて生成時に検証され、不正な値は [`DomainError::Validation`] になる。

use crate::DomainError;

define_validated_string! {
    /// 申請・マーカーのタイトル（1〜255 文字）
    pub struct Title {
        label: "タイトル",
        max_length: 255,
    }
}

define_validated_string! {
    /// ユーザー名
    ///
    /// ID プロバイダにユーザー名がない場合はメールアドレスが入るため PII 扱い。
    pub struct UserName {
        label: "ユーザー名",
        max_length: 255,
        pii: true,
    }
}

/// 説明文の最大文字数（DB: `TEXT`、アプリ側で制限）
const MAX_DESCRIPTION_LENGTH: usize = 5000;

/// 説明文（値オブジェクト）
///
/// 空文字列を許容する。既存クライアントは任意入力のテキスト欄をそのまま送る。
/// 改行とタブ以外の制御文字（NUL を含む）は不可。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Description(String);

impl Description {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_string();

        if value
            .chars()
            .any(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t'))
        {
            return Err(DomainError::Validation(
                "説明に制御文字は使用できません".to_string(),
            ));
        }

        if value.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(DomainError::Validation(format!(
                "説明は {} 文字以内である必要があります",
                MAX_DESCRIPTION_LENGTH
            )));
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 緯度経度（値オブジェクト）
///
/// # 不変条件
///
/// - 緯度は -90 〜 90、経度は -180 〜 180
/// - NaN / 無限大は不可
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    latitude:  f64,
    longitude: f64,
}

impl LatLng {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, DomainError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(DomainError::Validation(format!(
                "緯度は -90〜90 の範囲である必要があります: {latitude}"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(DomainError::Validation(format!(
                "経度は -180〜180 の範囲である必要があります: {longitude}"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// 座標未指定時の既定値 (0, 0)
    pub fn origin() -> Self {
        Self {
            latitude:  0.0,
            longitude: 0.0,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// URL の最大長（DB: `VARCHAR(2048)`）
const MAX_URL_LENGTH: usize = 2048;

/// 外部リソースの URL（値オブジェクト）
///
/// 地図 URL、バナー画像、ギャラリー画像に使う。
/// `http` / `https` の絶対 URL のみを受け付ける。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceUrl(String);

impl ResourceUrl {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_string();

        if value.is_empty() {
            return Err(DomainError::Validation("URL は必須です".to_string()));
        }

        if value.chars().any(char::is_control) {
            return Err(DomainError::Validation(
                "URL に制御文字は使用できません".to_string(),
            ));
        }

        if value.len() > MAX_URL_LENGTH {
            return Err(DomainError::Validation(format!(
                "URL は {} 文字以内である必要があります",
                MAX_URL_LENGTH
            )));
        }

        let parsed = url::Url::parse(&value)
            .map_err(|e| DomainError::Validation(format!("URL の形式が不正です: {e}")))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(DomainError::Validation(format!(
                "URL のスキームは http または https である必要があります: {}",
                parsed.scheme()
            )));
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ResourceUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
