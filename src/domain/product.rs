// ==========================================
// 仓储订单调配优化系统 - 产品领域模型
// ==========================================
// 用途: 补货提醒报表输入；分配引擎不消费该实体
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Product - 产品库存主数据
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    // ===== 主键 =====
    pub product_id: String, // 产品唯一标识

    // ===== 基础信息 =====
    pub name: String, // 产品名称

    // ===== 库存参数 =====
    pub current_stock: i64, // 当前库存（件）
    pub reorder_level: i64, // 补货阈值（件）

    // ===== 成本参数 =====
    pub unit_cost: f64, // 单件成本
}

impl Product {
    /// 是否需要补货（库存低于阈值）
    pub fn needs_reorder(&self) -> bool {
        self.current_stock < self.reorder_level
    }

    /// 补货缺口（件，不低于 0）
    pub fn reorder_shortfall(&self) -> i64 {
        (self.reorder_level - self.current_stock).max(0)
    }
}

// ==========================================
// RawProductRecord - 导入中间结构体
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawProductRecord {
    pub product_id: Option<String>,
    pub name: Option<String>,
    pub current_stock: Option<i64>,
    pub reorder_level: Option<i64>,
    pub unit_cost: Option<f64>,

    // 元信息
    pub row_number: usize,
}
