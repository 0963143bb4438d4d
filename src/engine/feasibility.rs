// ==========================================
// 仓储订单调配优化系统 - 交付可行性判定引擎
// ==========================================
// 职责: 构建订单 → 仓库的可行候选边
// 规则: eta ≤ (deadline − today) 且仓库起始库存 > 0
// 无任何可行仓库的订单立即判定 UNMET,不进入求解
// ==========================================

use crate::domain::order::Order;
use crate::domain::warehouse::Warehouse;
use crate::engine::geo::GeoCostEstimator;
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::instrument;

// ==========================================
// CostedCandidate - 已定价候选仓库
// ==========================================
// 按 (单件成本, 距离, 仓库ID) 升序排列,即全引擎统一的平局裁决
#[derive(Debug, Clone)]
pub struct CostedCandidate {
    pub warehouse_id: String,
    pub distance_km: f64,
    pub eta_days: f64,
    pub unit_transport_cost: f64,
    pub unit_storage_cost: f64,
    pub unit_total_cost: f64,
}

// ==========================================
// InfeasibleOrder - 不可行订单
// ==========================================
#[derive(Debug, Clone)]
pub struct InfeasibleOrder {
    pub order_id: String,
    pub reason: String,
}

// ==========================================
// FeasibilityOutcome - 可行性判定结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct FeasibilityOutcome {
    pub candidates_by_order: HashMap<String, Vec<CostedCandidate>>,
    pub infeasible_orders: Vec<InfeasibleOrder>,
}

impl FeasibilityOutcome {
    /// 指定订单的候选仓库（可能为空）
    pub fn candidates(&self, order_id: &str) -> &[CostedCandidate] {
        self.candidates_by_order
            .get(order_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

// ==========================================
// FeasibilityEngine - 交付可行性判定引擎
// ==========================================
pub struct FeasibilityEngine {
    estimator: GeoCostEstimator,
}

impl FeasibilityEngine {
    /// 构造函数
    pub fn new(estimator: GeoCostEstimator) -> Self {
        Self { estimator }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 为全部订单构建候选边
    #[instrument(skip(self, orders, warehouses), fields(
        order_count = orders.len(),
        warehouse_count = warehouses.len(),
        today = %today
    ))]
    pub fn evaluate(
        &self,
        orders: &[Order],
        warehouses: &[Warehouse],
        today: NaiveDate,
    ) -> FeasibilityOutcome {
        let mut outcome = FeasibilityOutcome::default();

        for order in orders {
            let remaining_days = order.remaining_days(today);
            let candidates = self.candidates_for_order(order, warehouses, remaining_days);

            if candidates.is_empty() {
                outcome.infeasible_orders.push(InfeasibleOrder {
                    order_id: order.order_id.clone(),
                    reason: format!(
                        "NO_FEASIBLE_WAREHOUSE: checked={}, deadline_in_days={}",
                        warehouses.len(),
                        remaining_days
                    ),
                });
                continue;
            }

            outcome
                .candidates_by_order
                .insert(order.order_id.clone(), candidates);
        }

        outcome
    }

    /// 单订单候选仓库（已按统一平局规则排序）
    fn candidates_for_order(
        &self,
        order: &Order,
        warehouses: &[Warehouse],
        remaining_days: i64,
    ) -> Vec<CostedCandidate> {
        let mut candidates: Vec<CostedCandidate> = warehouses
            .iter()
            .filter(|w| w.has_stock())
            .filter_map(|w| {
                let quote = self.estimator.unit_quote(w, order);
                // 可行性门控: 预计时效不得超过剩余交付天数
                if quote.eta_days > remaining_days as f64 {
                    return None;
                }
                Some(CostedCandidate {
                    warehouse_id: w.warehouse_id.clone(),
                    distance_km: quote.distance_km,
                    eta_days: quote.eta_days,
                    unit_transport_cost: quote.unit_transport_cost,
                    unit_storage_cost: quote.unit_storage_cost,
                    unit_total_cost: quote.unit_total_cost,
                })
            })
            .collect();

        candidates.sort_by(|a, b| {
            a.unit_total_cost
                .total_cmp(&b.unit_total_cost)
                .then_with(|| a.distance_km.total_cmp(&b.distance_km))
                .then_with(|| a.warehouse_id.cmp(&b.warehouse_id))
        });

        candidates
    }
}
