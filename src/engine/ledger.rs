// ==========================================
// 仓储订单调配优化系统 - 库存容量台账
// ==========================================
// 职责: 单轮求解内的仓库库存事务视图
// 红线: 台账是本轮唯一可变资源;变更仅在本轮可见,
//       对外要么整体提交 (InventoryRepository) 要么整体丢弃
// ==========================================

use crate::domain::warehouse::Warehouse;
use crate::engine::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// StockReservation - 出库预留记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockReservation {
    pub warehouse_id: String,
    pub quantity: i64,
}

// ==========================================
// CapacityLedger - 库存容量台账
// ==========================================
// BTreeMap 保证遍历顺序确定（提交与报表的确定性依赖于此）
#[derive(Debug, Clone)]
pub struct CapacityLedger {
    entries: BTreeMap<String, LedgerEntry>,
}

#[derive(Debug, Clone)]
struct LedgerEntry {
    stock_at_start: i64, // 本轮起始库存（快照,不再变化）
    reserved: i64,       // 本轮已预留出库数量
}

impl CapacityLedger {
    /// 基于仓库快照建账
    pub fn new(warehouses: &[Warehouse]) -> Self {
        let entries = warehouses
            .iter()
            .map(|w| {
                (
                    w.warehouse_id.clone(),
                    LedgerEntry {
                        stock_at_start: w.current_stock.max(0),
                        reserved: 0,
                    },
                )
            })
            .collect();

        Self { entries }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 预留指定数量
    ///
    /// # 返回
    /// - `Ok(())`: 预留成功
    /// - `Err(InsufficientStock)`: 剩余不足,台账不变
    /// - `Err(UnknownWarehouse)`: 仓库不在快照内
    pub fn reserve(&mut self, warehouse_id: &str, quantity: i64) -> EngineResult<()> {
        let entry = self
            .entries
            .get_mut(warehouse_id)
            .ok_or_else(|| EngineError::UnknownWarehouse(warehouse_id.to_string()))?;

        let remaining = entry.stock_at_start - entry.reserved;
        if quantity > remaining {
            return Err(EngineError::InsufficientStock {
                warehouse_id: warehouse_id.to_string(),
                requested: quantity,
                remaining,
            });
        }

        entry.reserved += quantity;
        Ok(())
    }

    /// 预留不超过 `want` 的最大可用数量
    ///
    /// # 返回
    /// 实际预留数量（剩余为 0 时返回 0,不视为错误）
    pub fn try_reserve_up_to(&mut self, warehouse_id: &str, want: i64) -> EngineResult<i64> {
        let entry = self
            .entries
            .get_mut(warehouse_id)
            .ok_or_else(|| EngineError::UnknownWarehouse(warehouse_id.to_string()))?;

        let remaining = entry.stock_at_start - entry.reserved;
        let granted = want.max(0).min(remaining);
        entry.reserved += granted;
        Ok(granted)
    }

    /// 剩余可预留数量
    pub fn remaining(&self, warehouse_id: &str) -> Option<i64> {
        self.entries
            .get(warehouse_id)
            .map(|e| e.stock_at_start - e.reserved)
    }

    /// 本轮已预留数量
    pub fn reserved(&self, warehouse_id: &str) -> Option<i64> {
        self.entries.get(warehouse_id).map(|e| e.reserved)
    }

    /// 本轮起始库存
    pub fn stock_at_start(&self, warehouse_id: &str) -> Option<i64> {
        self.entries.get(warehouse_id).map(|e| e.stock_at_start)
    }

    /// 仓库是否已耗尽
    pub fn is_exhausted(&self, warehouse_id: &str) -> bool {
        self.remaining(warehouse_id).map_or(true, |r| r <= 0)
    }

    /// 本轮预留总量
    pub fn total_reserved(&self) -> i64 {
        self.entries.values().map(|e| e.reserved).sum()
    }

    /// 全部非零预留记录（按 warehouse_id 升序,供提交与报表）
    pub fn reservations(&self) -> Vec<StockReservation> {
        self.entries
            .iter()
            .filter(|(_, e)| e.reserved > 0)
            .map(|(id, e)| StockReservation {
                warehouse_id: id.clone(),
                quantity: e.reserved,
            })
            .collect()
    }
}
