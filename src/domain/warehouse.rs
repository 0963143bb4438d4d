// ==========================================
// 仓储订单调配优化系统 - 仓库领域模型
// ==========================================
// 用途: 导入层写入,引擎层只读
// 库存变更仅通过 CapacityLedger + InventoryRepository 提交
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Warehouse - 仓库主数据
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warehouse {
    // ===== 主键 =====
    pub warehouse_id: String, // 仓库唯一标识

    // ===== 基础信息 =====
    pub name: String,     // 仓库名称
    pub location: String, // 所在城市/区域（展示用）

    // ===== 库存容量 =====
    pub capacity: i64,      // 总容量（件）
    pub current_stock: i64, // 当前库存（件，0 ≤ stock ≤ capacity）

    // ===== 成本参数 =====
    pub storage_cost: f64, // 单件仓储成本

    // ===== 地理坐标 =====
    pub latitude: f64,  // 纬度 [-90, 90]
    pub longitude: f64, // 经度 [-180, 180]
}

impl Warehouse {
    /// 是否还有可分配库存
    pub fn has_stock(&self) -> bool {
        self.current_stock > 0
    }

    /// 库存占用率（current_stock / capacity）
    pub fn stock_ratio(&self) -> f64 {
        if self.capacity <= 0 {
            return 0.0;
        }
        self.current_stock as f64 / self.capacity as f64
    }
}

// ==========================================
// RawWarehouseRecord - 导入中间结构体
// ==========================================
// 用途: 导入管道中间产物（文件解析 → 字段映射 → 此结构）
// 生命周期: 仅在导入流程内
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawWarehouseRecord {
    pub warehouse_id: Option<String>,
    pub name: Option<String>,
    pub capacity: Option<i64>,
    pub current_stock: Option<i64>,
    pub location: Option<String>,
    pub storage_cost: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    // 元信息
    pub row_number: usize, // 原始文件行号（用于导入报告）
}
