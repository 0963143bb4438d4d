// ==========================================
// 仓储订单调配优化系统 - 库存数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: warehouse 表 CRUD + 台账预留的原子提交
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::warehouse::Warehouse;
use crate::engine::ledger::CapacityLedger;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};
use tracing::{info, instrument};

// ==========================================
// InventoryRepository - 库存仓储
// ==========================================
pub struct InventoryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl InventoryRepository {
    /// 创建新的库存仓储实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        let repo = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        repo.init_schema()?;
        Ok(repo)
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let repo = Self { conn };
        repo.init_schema()?;
        Ok(repo)
    }

    /// 共享底层连接（供 ConfigManager 等复用同一数据库）
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 初始化 warehouse 表（幂等）
    fn init_schema(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS warehouse (
                warehouse_id  TEXT PRIMARY KEY,
                name          TEXT NOT NULL,
                location      TEXT NOT NULL DEFAULT '',
                capacity      INTEGER NOT NULL,
                current_stock INTEGER NOT NULL,
                storage_cost  REAL NOT NULL,
                latitude      REAL NOT NULL,
                longitude     REAL NOT NULL,
                updated_at    TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    // ==========================================
    // 写入
    // ==========================================

    /// 批量写入（插入或覆盖）仓库记录
    ///
    /// 单事务执行: 全部成功或全部回滚
    #[instrument(skip(self, warehouses), fields(count = warehouses.len()))]
    pub fn upsert_warehouses(&self, warehouses: &[Warehouse]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let now = Utc::now().to_rfc3339();
        for warehouse in warehouses {
            tx.execute(
                "INSERT INTO warehouse
                    (warehouse_id, name, location, capacity, current_stock,
                     storage_cost, latitude, longitude, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT (warehouse_id) DO UPDATE SET
                    name = excluded.name,
                    location = excluded.location,
                    capacity = excluded.capacity,
                    current_stock = excluded.current_stock,
                    storage_cost = excluded.storage_cost,
                    latitude = excluded.latitude,
                    longitude = excluded.longitude,
                    updated_at = excluded.updated_at",
                params![
                    warehouse.warehouse_id,
                    warehouse.name,
                    warehouse.location,
                    warehouse.capacity,
                    warehouse.current_stock,
                    warehouse.storage_cost,
                    warehouse.latitude,
                    warehouse.longitude,
                    now,
                ],
            )?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(warehouses.len())
    }

    /// 提交台账预留: 将本轮出库量扣减到 current_stock
    ///
    /// 原子性: 单事务执行;任一仓库库存不足则整体回滚,
    /// 外部观察不到部分提交
    #[instrument(skip(self, ledger), fields(total_reserved = ledger.total_reserved()))]
    pub fn commit_reservations(&self, ledger: &CapacityLedger) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let now = Utc::now().to_rfc3339();
        let reservations = ledger.reservations();
        for reservation in &reservations {
            let updated = tx.execute(
                "UPDATE warehouse
                 SET current_stock = current_stock - ?2, updated_at = ?3
                 WHERE warehouse_id = ?1 AND current_stock >= ?2",
                params![reservation.warehouse_id, reservation.quantity, now],
            )?;
            if updated == 0 {
                // 事务随 tx 丢弃整体回滚
                return Err(RepositoryError::StockCommitConflict {
                    warehouse_id: reservation.warehouse_id.clone(),
                    quantity: reservation.quantity,
                });
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        info!(committed = reservations.len(), "库存预留提交完成");
        Ok(reservations.len())
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 加载全部仓库（按 warehouse_id 升序）
    pub fn load_warehouses(&self) -> RepositoryResult<Vec<Warehouse>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT warehouse_id, name, location, capacity, current_stock,
                    storage_cost, latitude, longitude
             FROM warehouse
             ORDER BY warehouse_id",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(Warehouse {
                warehouse_id: row.get(0)?,
                name: row.get(1)?,
                location: row.get(2)?,
                capacity: row.get(3)?,
                current_stock: row.get(4)?,
                storage_cost: row.get(5)?,
                latitude: row.get(6)?,
                longitude: row.get(7)?,
            })
        })?;

        let mut warehouses = Vec::new();
        for row in rows {
            warehouses.push(row?);
        }
        Ok(warehouses)
    }

    /// 按仓库号查询
    pub fn find_by_id(&self, warehouse_id: &str) -> RepositoryResult<Option<Warehouse>> {
        let conn = self.get_conn()?;
        let warehouse = conn
            .query_row(
                "SELECT warehouse_id, name, location, capacity, current_stock,
                        storage_cost, latitude, longitude
                 FROM warehouse
                 WHERE warehouse_id = ?1",
                params![warehouse_id],
                |row| {
                    Ok(Warehouse {
                        warehouse_id: row.get(0)?,
                        name: row.get(1)?,
                        location: row.get(2)?,
                        capacity: row.get(3)?,
                        current_stock: row.get(4)?,
                        storage_cost: row.get(5)?,
                        latitude: row.get(6)?,
                        longitude: row.get(7)?,
                    })
                },
            )
            .optional()?;
        Ok(warehouse)
    }
}
