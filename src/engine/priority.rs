// ==========================================
// 仓储订单调配优化系统 - 订单优先级排序引擎
// ==========================================
// 职责: 为待处理订单生成确定性的处理顺序
// 排序决定了供给紧张时谁先占用库存与近仓
// ==========================================

use crate::domain::order::Order;
use std::cmp::Ordering;

// ==========================================
// PrioritySorter - 订单优先级排序引擎
// ==========================================
pub struct PrioritySorter {
    // 无状态引擎,不需要注入依赖
}

impl PrioritySorter {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 排序订单列表
    ///
    /// 排序键（优先级从高到低）:
    /// 1) 状态类别: URGENT 先于其他
    /// 2) delivery_deadline 升序（早截止优先）
    /// 3) order_id 升序（稳定平局裁决）
    pub fn sort(&self, mut orders: Vec<Order>) -> Vec<Order> {
        orders.sort_by(|a, b| self.compare(a, b));
        orders
    }

    /// 比较两个订单的处理优先级
    fn compare(&self, a: &Order, b: &Order) -> Ordering {
        self.status_class(a)
            .cmp(&self.status_class(b))
            .then_with(|| a.delivery_deadline.cmp(&b.delivery_deadline))
            .then_with(|| a.order_id.cmp(&b.order_id))
    }

    /// 状态类别: 数值越小优先级越高
    fn status_class(&self, order: &Order) -> u8 {
        if order.is_urgent() {
            0
        } else {
            1
        }
    }
}

// ==========================================
// Default trait 实现
// ==========================================
impl Default for PrioritySorter {
    fn default() -> Self {
        Self::new()
    }
}
