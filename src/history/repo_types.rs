use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Lifecycle marker of an analysis record. Only `Active -> Cleared` is ever written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(into = "i16", try_from = "i16")]
#[repr(i16)]
pub enum AnalysisStatus {
    Active = 0,
    Reserved = 1,
    Cleared = 2,
}

impl From<AnalysisStatus> for i16 {
    fn from(s: AnalysisStatus) -> Self {
        s as i16
    }
}

impl TryFrom<i16> for AnalysisStatus {
    type Error = String;

    fn try_from(v: i16) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Self::Active),
            1 => Ok(Self::Reserved),
            2 => Ok(Self::Cleared),
            other => Err(format!("invalid analysis status {other}")),
        }
    }
}

/// Analysis record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub id: Uuid,
    pub user_id: Uuid,
    pub record_id: String, // unix millis at creation
    pub image_urls: Vec<String>,
    pub analysis_result: serde_json::Value,
    pub suggestions: Option<String>,
    pub status: AnalysisStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewAnalysis {
    pub user_id: Uuid,
    pub image_urls: Vec<String>,
    pub analysis_result: serde_json::Value,
    pub suggestions: Option<String>,
}

impl NewAnalysis {
    pub fn into_record(self, now: OffsetDateTime) -> Analysis {
        Analysis {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            record_id: (now.unix_timestamp_nanos() / 1_000_000).to_string(),
            image_urls: self.image_urls,
            analysis_result: self.analysis_result,
            suggestions: self.suggestions,
            status: AnalysisStatus::Active,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn status_serializes_as_number() {
        assert_eq!(serde_json::to_string(&AnalysisStatus::Cleared).unwrap(), "2");
        let s: AnalysisStatus = serde_json::from_str("0").unwrap();
        assert_eq!(s, AnalysisStatus::Active);
        assert!(serde_json::from_str::<AnalysisStatus>("7").is_err());
    }

    #[test]
    fn record_id_is_millis() {
        let now = datetime!(2024-05-01 12:00:00.250 UTC);
        let rec = NewAnalysis {
            user_id: Uuid::new_v4(),
            image_urls: vec!["data:image/png;base64,AAAA".into()],
            analysis_result: serde_json::json!("report"),
            suggestions: None,
        }
        .into_record(now);
        assert_eq!(rec.record_id, "1714564800250");
        assert_eq!(rec.status, AnalysisStatus::Active);
    }
}
