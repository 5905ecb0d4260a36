// 试卷回顾快照存储
// 以试卷 ID 为键保存最近一次成功加载的回顾数据，主数据源不可用时作为兜底

use crate::error::Result;
use crate::models::PaperReview;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// 快照列表项（不含回顾正文）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotEntry {
    pub id: String,
    pub paper_id: String,
    pub title: String,
    pub saved_at: DateTime<Utc>,
}

/// SQLite 快照存储
#[derive(Clone)]
pub struct SnapshotStore {
    conn: Arc<Mutex<Connection>>,
}

impl SnapshotStore {
    /// 打开（必要时创建）快照数据库
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.initialize()?;
        Ok(store)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 初始化表结构
    fn initialize(&self) -> Result<()> {
        let conn = self.lock();
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS review_snapshots (
                id TEXT PRIMARY KEY,
                paper_id TEXT NOT NULL UNIQUE,
                title TEXT NOT NULL,
                payload TEXT NOT NULL,
                saved_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_review_snapshots_saved_at ON review_snapshots(saved_at);
        ",
        )?;
        Ok(())
    }

    /// 保存或覆盖某份试卷的快照
    pub fn save(&self, review: &PaperReview) -> Result<()> {
        let payload = serde_json::to_string(review)?;
        let conn = self.lock();

        conn.execute(
            "INSERT INTO review_snapshots (id, paper_id, title, payload, saved_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(paper_id) DO UPDATE SET
                title = excluded.title,
                payload = excluded.payload,
                saved_at = excluded.saved_at",
            rusqlite::params![
                Uuid::new_v4().to_string(),
                review.paper_id,
                review.title,
                payload,
                Utc::now().to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    pub fn load(&self, paper_id: &str) -> Result<Option<PaperReview>> {
        let conn = self.lock();
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload FROM review_snapshots WHERE paper_id = ?",
                rusqlite::params![paper_id],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    /// 删除快照，返回是否存在过
    pub fn delete(&self, paper_id: &str) -> Result<bool> {
        let conn = self.lock();
        let affected = conn.execute(
            "DELETE FROM review_snapshots WHERE paper_id = ?",
            rusqlite::params![paper_id],
        )?;
        Ok(affected > 0)
    }

    /// 按保存时间倒序列出快照
    pub fn list(&self) -> Result<Vec<SnapshotEntry>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, paper_id, title, saved_at FROM review_snapshots ORDER BY saved_at DESC",
        )?;

        let rows = stmt.query_map([], |row| Self::row_to_entry(row))?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }

        Ok(entries)
    }

    fn row_to_entry(row: &Row) -> rusqlite::Result<SnapshotEntry> {
        let saved_at: String = row.get(3)?;
        let saved_at = DateTime::parse_from_rfc3339(&saved_at)
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
            })?
            .with_timezone(&Utc);

        Ok(SnapshotEntry {
            id: row.get(0)?,
            paper_id: row.get(1)?,
            title: row.get(2)?,
            saved_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{QuestionType, ReviewQuestion, UserAnswer};

    fn review(paper_id: &str, title: &str) -> PaperReview {
        PaperReview {
            paper_id: paper_id.to_string(),
            title: title.to_string(),
            questions: vec![ReviewQuestion {
                question_id: "q1".to_string(),
                question_type: QuestionType::FillBlank,
                title: "2+2=?".to_string(),
                options: Vec::new(),
                correct_answer: "4".to_string(),
                user_answer: Some(UserAnswer::Text("4".to_string())),
                explanation: None,
                server_correct: None,
                ai_score: None,
            }],
            submitted_at: None,
        }
    }

    #[test]
    fn test_save_load_and_overwrite() {
        let store = SnapshotStore::open_in_memory().unwrap();
        assert!(store.load("p1").unwrap().is_none());

        store.save(&review("p1", "第一次")).unwrap();
        store.save(&review("p1", "第二次")).unwrap();

        let loaded = store.load("p1").unwrap().unwrap();
        assert_eq!(loaded.title, "第二次");
        assert_eq!(loaded.questions.len(), 1);
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_and_list() {
        let store = SnapshotStore::open_in_memory().unwrap();
        store.save(&review("p1", "一")).unwrap();
        store.save(&review("p2", "二")).unwrap();

        assert!(store.delete("p1").unwrap());
        assert!(!store.delete("p1").unwrap());

        let entries = store.list().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].paper_id, "p2");
        assert_eq!(entries[0].title, "二");
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("snapshots.db");

        let store = SnapshotStore::open(&path).unwrap();
        store.save(&review("p1", "一")).unwrap();
        drop(store);

        let reopened = SnapshotStore::open(&path).unwrap();
        assert!(reopened.load("p1").unwrap().is_some());
    }
}
