// ==========================================
// 仓储订单调配优化系统 - 结果聚合引擎
// ==========================================
// 职责: 将分配记录汇总为只读报表
// 红线: 只聚合,不做任何分配决策
// ==========================================

use crate::domain::order::Order;
use crate::domain::report::{
    OptimizeOutcome, OrderFulfillment, RunSummary, WarehouseUtilization,
};
use crate::domain::types::{OptimizeMode, OrderStatus};
use crate::domain::warehouse::Warehouse;
use crate::engine::allocator::AllocationResult;
use crate::engine::feasibility::InfeasibleOrder;
use std::collections::HashMap;
use tracing::instrument;

// ==========================================
// RunMeta - 单轮运行元信息
// ==========================================
#[derive(Debug, Clone)]
pub struct RunMeta {
    pub run_id: String,
    pub mode_requested: OptimizeMode,
    pub mode_used: OptimizeMode,
    pub degraded: bool,
    pub fallback_reason: Option<String>,
    pub solve_time_ms: u64,
}

// ==========================================
// ResultAggregator - 结果聚合引擎
// ==========================================
pub struct ResultAggregator {
    // 无状态引擎,不需要注入依赖
}

impl ResultAggregator {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 聚合单轮求解结果
    ///
    /// 状态派生（单轮内不回退）:
    /// - allocated == requested → FULFILLED
    /// - 0 < allocated < requested → PARTIALLY_FULFILLED
    /// - allocated == 0 → UNMET
    #[instrument(skip_all, fields(
        order_count = orders.len(),
        allocation_count = allocation_result.allocations.len()
    ))]
    pub fn aggregate(
        &self,
        warehouses: &[Warehouse],
        orders: &[Order],
        allocation_result: &AllocationResult,
        infeasible_orders: &[InfeasibleOrder],
        meta: RunMeta,
    ) -> OptimizeOutcome {
        // 按订单/仓库归集分配量
        let mut allocated_by_order: HashMap<&str, i64> = HashMap::new();
        let mut allocated_by_warehouse: HashMap<&str, i64> = HashMap::new();
        for allocation in &allocation_result.allocations {
            *allocated_by_order
                .entry(allocation.order_id.as_str())
                .or_insert(0) += allocation.quantity;
            *allocated_by_warehouse
                .entry(allocation.warehouse_id.as_str())
                .or_insert(0) += allocation.quantity;
        }

        // 缺口原因索引（可行性出局 + 分配缺口）
        let mut reason_by_order: HashMap<&str, &str> = HashMap::new();
        for infeasible in infeasible_orders {
            reason_by_order.insert(infeasible.order_id.as_str(), infeasible.reason.as_str());
        }
        for shortfall in &allocation_result.shortfalls {
            reason_by_order.insert(shortfall.order_id.as_str(), shortfall.reason.as_str());
        }

        // 订单履约明细（按 order_id 升序,输出确定）
        let mut order_fulfillment: Vec<OrderFulfillment> = orders
            .iter()
            .map(|order| {
                let allocated = allocated_by_order
                    .get(order.order_id.as_str())
                    .copied()
                    .unwrap_or(0);
                let status = self.derive_status(order.quantity, allocated);
                let reason = if status == OrderStatus::Fulfilled {
                    None
                } else {
                    reason_by_order
                        .get(order.order_id.as_str())
                        .map(|r| r.to_string())
                };
                OrderFulfillment {
                    order_id: order.order_id.clone(),
                    requested: order.quantity,
                    allocated,
                    fulfillment_ratio: if order.quantity > 0 {
                        allocated as f64 / order.quantity as f64
                    } else {
                        0.0
                    },
                    status,
                    reason,
                }
            })
            .collect();
        order_fulfillment.sort_by(|a, b| a.order_id.cmp(&b.order_id));

        // 仓库利用明细（按 warehouse_id 升序）
        let mut warehouse_utilization: Vec<WarehouseUtilization> = warehouses
            .iter()
            .map(|warehouse| {
                let stock_at_start = warehouse.current_stock.max(0);
                let allocated = allocated_by_warehouse
                    .get(warehouse.warehouse_id.as_str())
                    .copied()
                    .unwrap_or(0);
                WarehouseUtilization {
                    warehouse_id: warehouse.warehouse_id.clone(),
                    stock_at_start,
                    allocated,
                    remaining: stock_at_start - allocated,
                    utilization_ratio: if stock_at_start > 0 {
                        allocated as f64 / stock_at_start as f64
                    } else {
                        0.0
                    },
                }
            })
            .collect();
        warehouse_utilization.sort_by(|a, b| a.warehouse_id.cmp(&b.warehouse_id));

        // 总量统计
        let total_cost = allocation_result.total_cost();
        let total_allocated = allocation_result.total_allocated();
        let total_demand: i64 = orders.iter().map(|o| o.quantity).sum();
        let fulfilled_count = order_fulfillment
            .iter()
            .filter(|f| f.status == OrderStatus::Fulfilled)
            .count();
        let partial_count = order_fulfillment
            .iter()
            .filter(|f| f.status == OrderStatus::PartiallyFulfilled)
            .count();
        let unmet_orders: Vec<OrderFulfillment> = order_fulfillment
            .iter()
            .filter(|f| f.status == OrderStatus::Unmet)
            .cloned()
            .collect();

        let summary = RunSummary {
            run_id: meta.run_id,
            mode_requested: meta.mode_requested,
            mode_used: meta.mode_used,
            degraded: meta.degraded,
            fallback_reason: meta.fallback_reason,
            solve_time_ms: meta.solve_time_ms,
            total_cost,
            total_demand,
            total_allocated,
            order_count: orders.len(),
            fulfilled_count,
            partial_count,
            unmet_count: unmet_orders.len(),
            order_fulfillment,
            warehouse_utilization,
        };

        OptimizeOutcome {
            allocations: allocation_result.allocations.clone(),
            unmet_orders,
            summary,
        }
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    /// 派生订单终态
    fn derive_status(&self, requested: i64, allocated: i64) -> OrderStatus {
        if allocated <= 0 {
            OrderStatus::Unmet
        } else if allocated < requested {
            OrderStatus::PartiallyFulfilled
        } else {
            OrderStatus::Fulfilled
        }
    }
}

// ==========================================
// Default trait 实现
// ==========================================
impl Default for ResultAggregator {
    fn default() -> Self {
        Self::new()
    }
}
