use chrono::{DateTime, Utc};

use crate::models::SourceFile;

/// Outcome of the retention check for one uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionDecision {
    /// Upload confirmed and the file is old enough to delete
    Delete { age_days: i64 },
    /// The original stays on disk
    Retain { age_days: i64, reason: RetainReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetainReason {
    UploadUnconfirmed,
    TooYoung,
}

impl RetentionDecision {
    pub fn age_days(&self) -> i64 {
        match self {
            RetentionDecision::Delete { age_days } | RetentionDecision::Retain { age_days, .. } => {
                *age_days
            }
        }
    }

    pub fn should_delete(&self) -> bool {
        matches!(self, RetentionDecision::Delete { .. })
    }
}

/// Age-based deletion rule for originals.
///
/// Age is measured from the file's last modification, not from its upload,
/// in whole days rounded down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    min_age_days: u32,
}

impl RetentionPolicy {
    pub fn new(min_age_days: u32) -> Self {
        RetentionPolicy { min_age_days }
    }

    pub fn min_age_days(&self) -> u32 {
        self.min_age_days
    }

    pub fn evaluate(&self, file: &SourceFile, upload_confirmed: bool, now: DateTime<Utc>) -> RetentionDecision {
        let age_days = file.age_days(now);
        if !upload_confirmed {
            RetentionDecision::Retain {
                age_days,
                reason: RetainReason::UploadUnconfirmed,
            }
        } else if age_days >= i64::from(self.min_age_days) {
            RetentionDecision::Delete { age_days }
        } else {
            RetentionDecision::Retain {
                age_days,
                reason: RetainReason::TooYoung,
            }
        }
    }

    /// True iff the upload is confirmed and the file is at least the minimum age
    pub fn should_delete(&self, file: &SourceFile, upload_confirmed: bool, now: DateTime<Utc>) -> bool {
        self.evaluate(file, upload_confirmed, now).should_delete()
    }
}
