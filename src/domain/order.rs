// ==========================================
// 仓储订单调配优化系统 - 订单领域模型
// ==========================================
// 用途: 导入层写入,引擎层只读
// 状态: 输入状态仅作紧急提示,终态由分配结果派生
// ==========================================

use crate::domain::types::OrderStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Order - 待配送订单
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    // ===== 主键 =====
    pub order_id: String, // 订单唯一标识

    // ===== 基础信息 =====
    pub order_date: NaiveDate, // 下单日期
    pub product_id: String,    // 产品标识
    pub quantity: i64,         // 需求数量（件，> 0）

    // ===== 交付约束 =====
    pub delivery_deadline: NaiveDate, // 交付截止日期
    pub status: OrderStatus,          // 订单状态（输入侧为 PENDING/URGENT 提示）

    // ===== 交付地坐标 =====
    pub delivery_latitude: f64,  // 交付地纬度
    pub delivery_longitude: f64, // 交付地经度
}

impl Order {
    /// 距截止日期剩余天数（可为负：已超期）
    pub fn remaining_days(&self, today: NaiveDate) -> i64 {
        (self.delivery_deadline - today).num_days()
    }

    /// 是否带紧急提示
    pub fn is_urgent(&self) -> bool {
        self.status.is_urgent_hint()
    }
}

// ==========================================
// RawOrderRecord - 导入中间结构体
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawOrderRecord {
    pub order_id: Option<String>,
    pub order_date: Option<NaiveDate>,
    pub product_id: Option<String>,
    pub quantity: Option<i64>,
    pub delivery_deadline: Option<NaiveDate>,
    pub status: Option<String>, // 原始状态串（校验阶段归一化）
    pub delivery_latitude: Option<f64>,
    pub delivery_longitude: Option<f64>,

    // 元信息
    pub row_number: usize, // 原始文件行号（用于导入报告）
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_order(deadline: NaiveDate) -> Order {
        Order {
            order_id: "ORD001".to_string(),
            order_date: NaiveDate::from_ymd_opt(2025, 3, 24).unwrap(),
            product_id: "P001".to_string(),
            quantity: 500,
            delivery_deadline: deadline,
            status: OrderStatus::Pending,
            delivery_latitude: 19.0760,
            delivery_longitude: 72.8777,
        }
    }

    #[test]
    fn test_remaining_days() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 24).unwrap();
        let order = create_test_order(NaiveDate::from_ymd_opt(2025, 3, 26).unwrap());
        assert_eq!(order.remaining_days(today), 2);

        let overdue = create_test_order(NaiveDate::from_ymd_opt(2025, 3, 23).unwrap());
        assert_eq!(overdue.remaining_days(today), -1);
    }
}
