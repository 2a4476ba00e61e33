use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::{info, warn};
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::{
        helpers::{parse_datetime, parse_method},
        models::{AttendanceId, AttendanceRecord, AttendanceStatus, AttendanceSubmission},
        Database,
    },
    ports::{AttendanceSubmitter, SubmitError},
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    Date,
    Subject,
    Status,
}

impl SortKey {
    fn column(&self) -> &'static str {
        match self {
            SortKey::Date => "recorded_at",
            SortKey::Subject => "subject",
            SortKey::Status => "status",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Filters and ordering for the attendance history view.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    /// Matched as a substring of the `YYYY-MM-DD` date, so `2025-01` selects a month.
    pub date: Option<String>,
    pub subject: Option<String>,
    pub sort_by: SortKey,
    pub order: SortOrder,
}

fn row_to_record(row: &Row) -> Result<AttendanceRecord> {
    let method: String = row.get("method")?;
    let status: String = row.get("status")?;
    let recorded_at: String = row.get("recorded_at")?;

    Ok(AttendanceRecord {
        id: AttendanceId(row.get("id")?),
        class_id: row.get("class_id")?,
        subject: row.get("subject")?,
        method: parse_method(&method)?,
        status: AttendanceStatus::parse(&status)?,
        timestamp: parse_datetime(&recorded_at, "recorded_at")?,
    })
}

impl Database {
    pub async fn insert_attendance_record(
        &self,
        submission: &AttendanceSubmission,
    ) -> Result<AttendanceRecord> {
        let record = AttendanceRecord::from_submission(
            AttendanceId(Uuid::new_v4().to_string()),
            submission.clone(),
        );
        let row = record.clone();

        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO attendance_records (id, class_id, subject, method, status, recorded_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    row.id.as_str(),
                    row.class_id,
                    row.subject,
                    row.method.as_str(),
                    row.status.as_str(),
                    row.timestamp.to_rfc3339(),
                ],
            )
            .with_context(|| "failed to insert attendance record")?;
            Ok(())
        })
        .await?;

        Ok(record)
    }

    pub async fn list_attendance_records(
        &self,
        query: HistoryQuery,
    ) -> Result<Vec<AttendanceRecord>> {
        self.execute(move |conn| {
            let mut filters = Vec::new();
            let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

            if let Some(date) = query.date.filter(|value| !value.trim().is_empty()) {
                filters.push("instr(substr(recorded_at, 1, 10), ?) > 0");
                params_vec.push(Box::new(date.trim().to_string()));
            }
            if let Some(subject) = query.subject.filter(|value| !value.trim().is_empty()) {
                filters.push("subject = ?");
                params_vec.push(Box::new(subject));
            }

            let where_clause = if filters.is_empty() {
                String::new()
            } else {
                format!("WHERE {}", filters.join(" AND "))
            };

            let sql = format!(
                "SELECT id, class_id, subject, method, status, recorded_at
                 FROM attendance_records
                 {}
                 ORDER BY {} {}, recorded_at DESC",
                where_clause,
                query.sort_by.column(),
                query.order.keyword()
            );

            let params_refs: Vec<&dyn rusqlite::ToSql> =
                params_vec.iter().map(|b| b.as_ref()).collect();

            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params_refs.as_slice())?;
            let mut records = Vec::new();
            while let Some(row) = rows.next()? {
                records.push(row_to_record(row)?);
            }

            Ok(records)
        })
        .await
    }

    /// Number of classes attended (present or late) per class id.
    pub async fn attended_counts(&self) -> Result<HashMap<String, u32>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT class_id, COUNT(*) FROM attendance_records GROUP BY class_id",
            )?;
            let mut rows = stmt.query([])?;
            let mut counts = HashMap::new();
            while let Some(row) = rows.next()? {
                let class_id: String = row.get(0)?;
                let count: i64 = row.get(1)?;
                let count = u32::try_from(count)
                    .map_err(|_| anyhow!("attendance count {count} out of range"))?;
                counts.insert(class_id, count);
            }
            Ok(counts)
        })
        .await
    }
}

#[async_trait]
impl AttendanceSubmitter for Database {
    async fn submit(&self, submission: &AttendanceSubmission) -> Result<AttendanceId, SubmitError> {
        if submission.class_id.trim().is_empty() {
            return Err(SubmitError::Rejected("missing class id".into()));
        }

        match self.insert_attendance_record(submission).await {
            Ok(record) => {
                info!(
                    "Recorded attendance {} for {} via {}",
                    record.id,
                    record.class_id,
                    record.method.as_str()
                );
                Ok(record.id)
            }
            Err(err) => {
                warn!("Attendance insert failed: {err:#}");
                Err(SubmitError::Unavailable(err.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CaptureMethod;
    use chrono::{TimeZone, Utc};

    fn submission(
        class_id: &str,
        subject: &str,
        method: CaptureMethod,
        status: AttendanceStatus,
        day: u32,
    ) -> AttendanceSubmission {
        AttendanceSubmission {
            class_id: class_id.into(),
            subject: subject.into(),
            method,
            status,
            timestamp: Utc.with_ymd_and_hms(2025, 1, day, 10, 5, 0).unwrap(),
        }
    }

    async fn seeded() -> Database {
        let db = Database::in_memory().unwrap();
        for s in [
            submission("CS301", "Advanced Data Structures", CaptureMethod::Qr, AttendanceStatus::Present, 5),
            submission("CS302", "Database Management", CaptureMethod::Face, AttendanceStatus::Present, 3),
            submission("CS303", "Software Engineering", CaptureMethod::Gps, AttendanceStatus::Late, 2),
            submission("CS301", "Advanced Data Structures", CaptureMethod::Face, AttendanceStatus::Late, 12),
        ] {
            db.insert_attendance_record(&s).await.unwrap();
        }
        db
    }

    #[tokio::test]
    async fn lists_newest_first_by_default() {
        let db = seeded().await;
        let records = db.list_attendance_records(HistoryQuery::default()).await.unwrap();

        let days: Vec<_> = records
            .iter()
            .map(|r| r.timestamp.format("%Y-%m-%d").to_string())
            .collect();
        assert_eq!(
            days,
            vec!["2025-01-12", "2025-01-05", "2025-01-03", "2025-01-02"]
        );
    }

    #[tokio::test]
    async fn filters_by_date_substring_and_subject() {
        let db = seeded().await;

        let by_date = db
            .list_attendance_records(HistoryQuery {
                date: Some("2025-01-0".into()),
                ..HistoryQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(by_date.len(), 3);

        let by_subject = db
            .list_attendance_records(HistoryQuery {
                subject: Some("Advanced Data Structures".into()),
                sort_by: SortKey::Date,
                order: SortOrder::Asc,
                ..HistoryQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(by_subject.len(), 2);
        assert_eq!(by_subject[0].method, CaptureMethod::Qr);
        assert_eq!(by_subject[1].status, AttendanceStatus::Late);
    }

    #[tokio::test]
    async fn sorts_by_subject_ascending() {
        let db = seeded().await;
        let records = db
            .list_attendance_records(HistoryQuery {
                sort_by: SortKey::Subject,
                order: SortOrder::Asc,
                ..HistoryQuery::default()
            })
            .await
            .unwrap();

        assert_eq!(records[0].subject, "Advanced Data Structures");
        assert_eq!(records[3].subject, "Software Engineering");
    }

    #[tokio::test]
    async fn counts_attendance_per_class() {
        let db = seeded().await;
        let counts = db.attended_counts().await.unwrap();
        assert_eq!(counts.get("CS301"), Some(&2));
        assert_eq!(counts.get("CS302"), Some(&1));
        assert_eq!(counts.get("CS999"), None);
    }

    #[tokio::test]
    async fn submitter_rejects_blank_class_and_stores_valid_records() {
        let db = Database::in_memory().unwrap();

        let blank = submission(" ", "Nothing", CaptureMethod::Qr, AttendanceStatus::Present, 1);
        assert!(matches!(
            db.submit(&blank).await,
            Err(SubmitError::Rejected(_))
        ));

        let valid = submission("CS301", "Advanced Data Structures", CaptureMethod::Gps, AttendanceStatus::Present, 1);
        let id = db.submit(&valid).await.unwrap();

        let records = db.list_attendance_records(HistoryQuery::default()).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, id);
        assert_eq!(records[0].method, CaptureMethod::Gps);
    }
}
