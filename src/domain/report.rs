// ==========================================
// 仓储订单调配优化系统 - 结果报表模型
// ==========================================
// 用途: 结果聚合层产出,展示层只读消费
// 不承载任何决策逻辑
// ==========================================

use crate::domain::allocation::Allocation;
use crate::domain::types::{OptimizeMode, OrderStatus};
use serde::{Deserialize, Serialize};

// ==========================================
// OrderFulfillment - 单订单履约情况
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderFulfillment {
    pub order_id: String,
    pub requested: i64,            // 需求数量
    pub allocated: i64,            // 已分配数量
    pub fulfillment_ratio: f64,    // allocated / requested
    pub status: OrderStatus,       // 派生终态
    pub reason: Option<String>,    // 未满足/部分满足原因代码
}

impl OrderFulfillment {
    /// 缺口数量（件）
    pub fn shortfall(&self) -> i64 {
        (self.requested - self.allocated).max(0)
    }
}

// ==========================================
// WarehouseUtilization - 单仓库利用情况
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseUtilization {
    pub warehouse_id: String,
    pub stock_at_start: i64,    // 本轮起始库存
    pub allocated: i64,         // 本轮分配出库数量
    pub remaining: i64,         // 剩余库存
    pub utilization_ratio: f64, // allocated / stock_at_start
}

// ==========================================
// RunSummary - 单轮求解汇总
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    // ===== 运行元信息 =====
    pub run_id: String,                 // 本轮运行 ID（UUID）
    pub mode_requested: OptimizeMode,   // 请求的求解模式
    pub mode_used: OptimizeMode,        // 实际使用的求解模式
    pub degraded: bool,                 // 精确求解超时回退标记
    pub fallback_reason: Option<String>, // 回退原因代码
    pub solve_time_ms: u64,             // 求解耗时（毫秒）

    // ===== 总量统计 =====
    pub total_cost: f64,      // 所有分配记录成本合计
    pub total_demand: i64,    // 需求总量（件）
    pub total_allocated: i64, // 分配总量（件）

    // ===== 订单统计 =====
    pub order_count: usize,
    pub fulfilled_count: usize,
    pub partial_count: usize,
    pub unmet_count: usize,

    // ===== 明细 =====
    pub order_fulfillment: Vec<OrderFulfillment>,
    pub warehouse_utilization: Vec<WarehouseUtilization>,
}

// ==========================================
// OptimizeOutcome - 引擎对外输出
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizeOutcome {
    pub allocations: Vec<Allocation>,          // 全部分配记录
    pub unmet_orders: Vec<OrderFulfillment>,   // 零分配订单
    pub summary: RunSummary,                   // 汇总报表
}

// ==========================================
// OverviewMetrics - 驾驶舱总览指标
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverviewMetrics {
    pub total_inventory: i64,      // 全网当前库存
    pub total_capacity: i64,       // 全网总容量
    pub inventory_ratio: f64,      // 库存 / 容量
    pub pending_order_count: usize, // 待处理订单数
    pub urgent_order_count: usize,  // 紧急订单数
    pub reorder_need_count: usize,  // 待补货产品数
}

// ==========================================
// InventoryStatus - 仓库库存现状（驾驶舱）
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryStatus {
    pub warehouse_id: String,
    pub name: String,
    pub current_stock: i64,
    pub capacity: i64,
    pub stock_ratio: f64, // current_stock / capacity
}

// ==========================================
// ReorderNeed - 补货提醒条目
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderNeed {
    pub product_id: String,
    pub name: String,
    pub current_stock: i64,
    pub reorder_level: i64,
    pub shortfall: i64, // reorder_level - current_stock
}
