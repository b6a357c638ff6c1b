//! # 投稿記録・承認記録
//!
//! 「誰がどの申請を出したか」「誰の申請が承認されたか」を表す追記専用の記録。
//! 申請が削除された後も残り、ユーザーの投稿履歴として参照される。

use chrono::{DateTime, Utc};

use crate::{request::RequestId, user::UserId};

/// 投稿記録
///
/// 申請の作成と同一トランザクションで記録される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    user_id:      UserId,
    request_id:   RequestId,
    submitted_at: DateTime<Utc>,
}

impl Submission {
    pub fn new(user_id: UserId, request_id: RequestId, submitted_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            request_id,
            submitted_at,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }
}

/// 承認記録
///
/// 存在する場合、対応する申請はもう承認待ちではない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSubmission {
    user_id:     UserId,
    request_id:  RequestId,
    approved_at: DateTime<Utc>,
}

impl ValidSubmission {
    pub fn new(user_id: UserId, request_id: RequestId, approved_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            request_id,
            approved_at,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    pub fn approved_at(&self) -> DateTime<Utc> {
        self.approved_at
    }
}
