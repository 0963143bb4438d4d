// ==========================================
// 仓储订单调配优化系统 - 地理成本估算引擎
// ==========================================
// 职责: 仓库 → 交付地的距离/落地成本/时效估算
// 纯函数: 无副作用,同输入必同输出,全部下游决策的打分原语
// ==========================================

use crate::domain::order::Order;
use crate::domain::warehouse::Warehouse;
use serde::{Deserialize, Serialize};

/// 地球平均半径（km）
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// 大圆距离（haversine 公式，km）
///
/// 性质: 非负,对称,当且仅当坐标相同时为 0
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    if lat1 == lat2 && lon1 == lon2 {
        return 0.0;
    }

    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * c
}

// ==========================================
// CostQuote - 成本报价
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostQuote {
    pub distance_km: f64,    // 大圆距离（km）
    pub eta_days: f64,       // 预计送达时间（天）
    pub transport_cost: f64, // 运输成本
    pub storage_cost: f64,   // 仓储成本
    pub total_cost: f64,     // 合计成本
}

// ==========================================
// UnitCostQuote - 单件成本报价
// ==========================================
// 用途: 分配引擎按"单件成本"构建边权,拆分时再按量放大
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitCostQuote {
    pub distance_km: f64,
    pub eta_days: f64,
    pub unit_transport_cost: f64, // 费率 × 距离
    pub unit_storage_cost: f64,   // 仓库单件仓储成本
    pub unit_total_cost: f64,
}

// ==========================================
// GeoCostEstimator - 地理成本估算引擎
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct GeoCostEstimator {
    rate_per_unit_distance: f64, // 单件每 km 运输费率
    assumed_speed_km_per_day: f64, // 假定运输速度（km/天）
}

impl GeoCostEstimator {
    /// 构造函数
    ///
    /// # 参数
    /// - `rate_per_unit_distance`: 单件每 km 运输费率（≥ 0）
    /// - `assumed_speed_km_per_day`: 假定运输速度（km/天，> 0）
    pub fn new(rate_per_unit_distance: f64, assumed_speed_km_per_day: f64) -> Self {
        Self {
            rate_per_unit_distance,
            assumed_speed_km_per_day,
        }
    }

    /// 单件成本报价
    pub fn unit_quote(&self, warehouse: &Warehouse, order: &Order) -> UnitCostQuote {
        let distance_km = haversine_km(
            warehouse.latitude,
            warehouse.longitude,
            order.delivery_latitude,
            order.delivery_longitude,
        );
        let unit_transport_cost = self.rate_per_unit_distance * distance_km;
        let unit_storage_cost = warehouse.storage_cost;

        UnitCostQuote {
            distance_km,
            eta_days: distance_km / self.assumed_speed_km_per_day,
            unit_transport_cost,
            unit_storage_cost,
            unit_total_cost: unit_transport_cost + unit_storage_cost,
        }
    }

    /// 指定数量的成本报价（拆分履约时使用）
    pub fn quote_for_quantity(
        &self,
        warehouse: &Warehouse,
        order: &Order,
        quantity: i64,
    ) -> CostQuote {
        let unit = self.unit_quote(warehouse, order);
        let qty = quantity as f64;
        let transport_cost = unit.unit_transport_cost * qty;
        let storage_cost = unit.unit_storage_cost * qty;

        CostQuote {
            distance_km: unit.distance_km,
            eta_days: unit.eta_days,
            transport_cost,
            storage_cost,
            total_cost: transport_cost + storage_cost,
        }
    }

    /// 整单成本报价
    pub fn quote(&self, warehouse: &Warehouse, order: &Order) -> CostQuote {
        self.quote_for_quantity(warehouse, order, order.quantity)
    }
}
