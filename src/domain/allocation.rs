// ==========================================
// 仓储订单调配优化系统 - 分配记录领域模型
// ==========================================
// 用途: 分配引擎唯一产出；一经产出不可变
// 一个订单可拆分为多条记录（多仓履约）
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Allocation - 分配记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    // ===== 关联 =====
    pub order_id: String,     // 订单标识
    pub warehouse_id: String, // 供货仓库标识

    // ===== 数量 =====
    pub quantity: i64, // 本条分配数量（件，> 0）

    // ===== 成本明细 =====
    pub distance_km: f64,    // 仓库到交付地的大圆距离（km）
    pub transport_cost: f64, // 运输成本 = 费率 × 距离 × 数量
    pub storage_cost: f64,   // 仓储成本 = 单件仓储成本 × 数量
    pub total_cost: f64,     // 合计 = transport_cost + storage_cost
}

impl Allocation {
    /// 单件综合成本
    pub fn unit_cost(&self) -> f64 {
        if self.quantity <= 0 {
            return 0.0;
        }
        self.total_cost / self.quantity as f64
    }
}
