// ==========================================
// 仓储订单调配优化系统 - 贪心分配引擎
// ==========================================
// 职责: 按优先级顺序逐单分配,每步选单件成本最低的可行仓库
// 红线: 台账约束优先于订单优先级,任何分配不得超过剩余库存
// ==========================================

use crate::domain::allocation::Allocation;
use crate::domain::order::Order;
use crate::engine::allocator::{AllocationResult, OrderShortfall};
use crate::engine::feasibility::{CostedCandidate, FeasibilityOutcome};
use crate::engine::ledger::CapacityLedger;
use crate::engine::error::EngineResult;
use tracing::instrument;

// ==========================================
// GreedyAllocator - 贪心分配引擎
// ==========================================
pub struct GreedyAllocator {
    // 无状态引擎,不需要注入依赖
}

impl GreedyAllocator {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 按优先级顺序分配订单
    ///
    /// 规则:
    /// 1) `orders` 已由 PrioritySorter 排序,先到先占
    /// 2) 每单在候选列表内按 (单件成本, 距离, 仓库ID) 依次取货
    /// 3) allow_partial=false 时先验证候选总剩余能否全量覆盖,
    ///    不能则整单放弃 (FULL_COVERAGE_UNAVAILABLE)
    /// 4) 无候选的订单已在可行性判定阶段出局,此处跳过
    #[instrument(skip(self, orders, feasibility, ledger), fields(
        order_count = orders.len(),
        allow_partial
    ))]
    pub fn allocate(
        &self,
        orders: &[Order],
        feasibility: &FeasibilityOutcome,
        ledger: &mut CapacityLedger,
        allow_partial: bool,
    ) -> EngineResult<AllocationResult> {
        let mut result = AllocationResult::default();

        for order in orders {
            let candidates = feasibility.candidates(&order.order_id);
            if candidates.is_empty() {
                continue; // 不可行订单由可行性判定阶段负责报告
            }

            // 全量履约模式: 候选剩余合计不足则整单放弃,不占用库存
            if !allow_partial {
                let available: i64 = candidates
                    .iter()
                    .map(|c| ledger.remaining(&c.warehouse_id).unwrap_or(0))
                    .sum();
                if available < order.quantity {
                    result.shortfalls.push(OrderShortfall {
                        order_id: order.order_id.clone(),
                        requested: order.quantity,
                        allocated: 0,
                        reason: format!(
                            "FULL_COVERAGE_UNAVAILABLE: requested={}, available={}",
                            order.quantity, available
                        ),
                    });
                    continue;
                }
            }

            let mut unfilled = order.quantity;
            for candidate in candidates {
                if unfilled == 0 {
                    break;
                }
                let granted = ledger.try_reserve_up_to(&candidate.warehouse_id, unfilled)?;
                if granted == 0 {
                    continue;
                }
                result
                    .allocations
                    .push(self.create_allocation(order, candidate, granted));
                unfilled -= granted;
            }

            if unfilled > 0 {
                result.shortfalls.push(OrderShortfall {
                    order_id: order.order_id.clone(),
                    requested: order.quantity,
                    allocated: order.quantity - unfilled,
                    reason: format!(
                        "SUPPLY_EXHAUSTED: requested={}, allocated={}",
                        order.quantity,
                        order.quantity - unfilled
                    ),
                });
            }
        }

        Ok(result)
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    /// 创建分配记录
    fn create_allocation(
        &self,
        order: &Order,
        candidate: &CostedCandidate,
        quantity: i64,
    ) -> Allocation {
        let qty = quantity as f64;
        let transport_cost = candidate.unit_transport_cost * qty;
        let storage_cost = candidate.unit_storage_cost * qty;

        Allocation {
            order_id: order.order_id.clone(),
            warehouse_id: candidate.warehouse_id.clone(),
            quantity,
            distance_km: candidate.distance_km,
            transport_cost,
            storage_cost,
            total_cost: transport_cost + storage_cost,
        }
    }
}

// ==========================================
// Default trait 实现
// ==========================================
impl Default for GreedyAllocator {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::OrderStatus;
    use crate::domain::warehouse::Warehouse;
    use crate::engine::feasibility::FeasibilityEngine;
    use crate::engine::geo::GeoCostEstimator;
    use chrono::NaiveDate;

    const MUMBAI: (f64, f64) = (19.0760, 72.8777);

    fn create_test_warehouse(warehouse_id: &str, stock: i64, storage_cost: f64) -> Warehouse {
        Warehouse {
            warehouse_id: warehouse_id.to_string(),
            name: format!("Warehouse {}", warehouse_id),
            location: "Mumbai".to_string(),
            capacity: 50_000,
            current_stock: stock,
            storage_cost,
            latitude: MUMBAI.0,
            longitude: MUMBAI.1,
        }
    }

    fn create_test_order(order_id: &str, quantity: i64) -> Order {
        Order {
            order_id: order_id.to_string(),
            order_date: NaiveDate::from_ymd_opt(2025, 3, 24).unwrap(),
            product_id: "P001".to_string(),
            quantity,
            delivery_deadline: NaiveDate::from_ymd_opt(2025, 3, 26).unwrap(),
            status: OrderStatus::Pending,
            delivery_latitude: MUMBAI.0,
            delivery_longitude: MUMBAI.1,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 24).unwrap()
    }

    fn run_greedy(
        warehouses: &[Warehouse],
        orders: Vec<Order>,
        allow_partial: bool,
    ) -> (AllocationResult, CapacityLedger) {
        let estimator = GeoCostEstimator::new(1.0, 800.0);
        let feasibility = FeasibilityEngine::new(estimator).evaluate(&orders, warehouses, today());
        let mut ledger = CapacityLedger::new(warehouses);
        let result = GreedyAllocator::new()
            .allocate(&orders, &feasibility, &mut ledger, allow_partial)
            .unwrap();
        (result, ledger)
    }

    #[test]
    fn test_single_order_cheapest_warehouse() {
        let warehouses = vec![
            create_test_warehouse("W001", 7500, 1200.0),
            create_test_warehouse("W002", 12_000, 1500.0),
        ];
        let orders = vec![create_test_order("ORD001", 500)];

        let (result, _) = run_greedy(&warehouses, orders, true);
        assert_eq!(result.allocations.len(), 1);
        assert_eq!(result.allocations[0].warehouse_id, "W001");
        assert_eq!(result.allocations[0].quantity, 500);
        assert!((result.total_cost() - 600_000.0).abs() < 1e-6);
        assert!(result.shortfalls.is_empty());
    }

    #[test]
    fn test_split_across_warehouses_when_demand_exceeds_single_stock() {
        // 需求 1300 > 单仓 1000,但 ≤ 合计供给
        let warehouses = vec![
            create_test_warehouse("W001", 1000, 1200.0),
            create_test_warehouse("W002", 12_000, 1500.0),
        ];
        let orders = vec![create_test_order("ORD001", 1300)];

        let (result, ledger) = run_greedy(&warehouses, orders, true);
        assert_eq!(result.allocations.len(), 2);
        assert_eq!(result.allocations[0].warehouse_id, "W001");
        assert_eq!(result.allocations[0].quantity, 1000);
        assert_eq!(result.allocations[1].warehouse_id, "W002");
        assert_eq!(result.allocations[1].quantity, 300);
        assert_eq!(ledger.remaining("W001"), Some(0));
        assert_eq!(ledger.remaining("W002"), Some(11_700));
        assert!(result.shortfalls.is_empty());
    }

    #[test]
    fn test_partial_when_supply_exhausted() {
        let warehouses = vec![create_test_warehouse("W001", 300, 1200.0)];
        let orders = vec![create_test_order("ORD001", 500)];

        let (result, _) = run_greedy(&warehouses, orders, true);
        assert_eq!(result.total_allocated(), 300);
        assert_eq!(result.shortfalls.len(), 1);
        assert_eq!(result.shortfalls[0].allocated, 300);
        assert!(result.shortfalls[0].reason.contains("SUPPLY_EXHAUSTED"));
    }

    #[test]
    fn test_full_only_mode_rejects_uncoverable_order() {
        let warehouses = vec![create_test_warehouse("W001", 300, 1200.0)];
        let orders = vec![create_test_order("ORD001", 500)];

        let (result, ledger) = run_greedy(&warehouses, orders, false);
        assert!(result.allocations.is_empty());
        assert_eq!(result.shortfalls.len(), 1);
        assert_eq!(result.shortfalls[0].allocated, 0);
        assert!(result.shortfalls[0]
            .reason
            .contains("FULL_COVERAGE_UNAVAILABLE"));
        // 整单放弃时不得占用库存
        assert_eq!(ledger.remaining("W001"), Some(300));
    }

    #[test]
    fn test_full_only_mode_still_splits_when_coverable() {
        let warehouses = vec![
            create_test_warehouse("W001", 1000, 1200.0),
            create_test_warehouse("W002", 500, 1500.0),
        ];
        let orders = vec![create_test_order("ORD001", 1300)];

        let (result, _) = run_greedy(&warehouses, orders, false);
        assert_eq!(result.total_allocated(), 1300);
        assert!(result.shortfalls.is_empty());
    }

    #[test]
    fn test_priority_order_claims_scarce_stock_first() {
        // 列表顺序即优先级顺序,先到先占
        let warehouses = vec![create_test_warehouse("W001", 600, 1200.0)];
        let orders = vec![
            create_test_order("ORD001", 500),
            create_test_order("ORD002", 500),
        ];

        let (result, _) = run_greedy(&warehouses, orders, true);
        assert_eq!(result.allocations[0].order_id, "ORD001");
        assert_eq!(result.allocations[0].quantity, 500);
        assert_eq!(result.allocations[1].order_id, "ORD002");
        assert_eq!(result.allocations[1].quantity, 100);
        assert_eq!(result.shortfalls.len(), 1);
        assert_eq!(result.shortfalls[0].order_id, "ORD002");
    }
}
