use crate::domain::action_log::ActionLog;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// 时间戳统一存储格式
pub(super) const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

// ==========================================
// ActionLogRepository - 操作日志仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
pub struct ActionLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ActionLogRepository {
    /// 创建新的操作日志仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    pub(super) fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入操作日志
    ///
    /// # 返回
    /// - `Ok(action_id)`: 成功插入,返回action_id
    /// - `Err(...)`: 数据库错误
    pub fn insert(&self, log: &ActionLog) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        insert_with(&conn, log)?;
        Ok(log.action_id.clone())
    }

    /// 批量插入操作日志（单事务）
    pub fn batch_insert(&self, logs: &[ActionLog]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        for log in logs {
            insert_with(&tx, log)?;
        }

        tx.commit()?;
        Ok(logs.len())
    }
}

fn insert_with(conn: &Connection, log: &ActionLog) -> rusqlite::Result<usize> {
    conn.execute(
        r#"
        INSERT INTO action_log (
            action_id, action_type, action_ts, actor, entity_id, payload_json, detail
        ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            log.action_id,
            log.action_type,
            log.action_ts.format(TS_FORMAT).to_string(),
            log.actor,
            log.entity_id,
            log.payload_json.as_ref().map(|v| v.to_string()),
            log.detail,
        ],
    )
}
