// ==========================================
// 仓储订单调配优化系统 - 驾驶舱 API
// ==========================================
// 职责: 总览指标 / 订单视图 / 库存现状 / 补货提醒
// 红线: 只读聚合查询,不做任何分配决策
// ==========================================

use crate::domain::order::Order;
use crate::domain::product::Product;
use crate::domain::report::{InventoryStatus, OverviewMetrics, ReorderNeed};
use crate::domain::warehouse::Warehouse;
use chrono::NaiveDate;

// ==========================================
// DashboardApi - 驾驶舱 API
// ==========================================
pub struct DashboardApi {
    // 无状态聚合查询,不需要注入依赖
}

impl DashboardApi {
    /// 创建新的 DashboardApi 实例
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 总览指标
    // ==========================================

    /// 驾驶舱总览指标
    pub fn overview(
        &self,
        warehouses: &[Warehouse],
        orders: &[Order],
        products: &[Product],
        today: NaiveDate,
    ) -> OverviewMetrics {
        let total_inventory: i64 = warehouses.iter().map(|w| w.current_stock).sum();
        let total_capacity: i64 = warehouses.iter().map(|w| w.capacity).sum();

        OverviewMetrics {
            total_inventory,
            total_capacity,
            inventory_ratio: if total_capacity > 0 {
                total_inventory as f64 / total_capacity as f64
            } else {
                0.0
            },
            pending_order_count: self.pending_orders(orders, today).len(),
            urgent_order_count: self.urgent_orders(orders).len(),
            reorder_need_count: self.reorder_needs(products).len(),
        }
    }

    // ==========================================
    // 订单视图
    // ==========================================

    /// 待处理订单（截止日期未过）
    pub fn pending_orders<'a>(&self, orders: &'a [Order], today: NaiveDate) -> Vec<&'a Order> {
        orders
            .iter()
            .filter(|o| o.remaining_days(today) >= 0)
            .collect()
    }

    /// 紧急订单
    pub fn urgent_orders<'a>(&self, orders: &'a [Order]) -> Vec<&'a Order> {
        orders.iter().filter(|o| o.is_urgent()).collect()
    }

    /// 历史订单（截止日期已过）
    pub fn order_history<'a>(&self, orders: &'a [Order], today: NaiveDate) -> Vec<&'a Order> {
        orders
            .iter()
            .filter(|o| o.remaining_days(today) < 0)
            .collect()
    }

    // ==========================================
    // 库存现状与补货提醒
    // ==========================================

    /// 各仓库库存现状（current_stock / capacity 口径）
    pub fn inventory_status(&self, warehouses: &[Warehouse]) -> Vec<InventoryStatus> {
        let mut status: Vec<InventoryStatus> = warehouses
            .iter()
            .map(|w| InventoryStatus {
                warehouse_id: w.warehouse_id.clone(),
                name: w.name.clone(),
                current_stock: w.current_stock,
                capacity: w.capacity,
                stock_ratio: w.stock_ratio(),
            })
            .collect();
        status.sort_by(|a, b| a.warehouse_id.cmp(&b.warehouse_id));
        status
    }

    /// 待补货产品（库存低于补货阈值,按缺口降序）
    pub fn reorder_needs(&self, products: &[Product]) -> Vec<ReorderNeed> {
        let mut needs: Vec<ReorderNeed> = products
            .iter()
            .filter(|p| p.needs_reorder())
            .map(|p| ReorderNeed {
                product_id: p.product_id.clone(),
                name: p.name.clone(),
                current_stock: p.current_stock,
                reorder_level: p.reorder_level,
                shortfall: p.reorder_shortfall(),
            })
            .collect();
        needs.sort_by(|a, b| {
            b.shortfall
                .cmp(&a.shortfall)
                .then_with(|| a.product_id.cmp(&b.product_id))
        });
        needs
    }
}

// ==========================================
// Default trait 实现
// ==========================================
impl Default for DashboardApi {
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

    fn create_test_warehouse(warehouse_id: &str, stock: i64, capacity: i64) -> Warehouse {
        Warehouse {
            warehouse_id: warehouse_id.to_string(),
            name: format!("Warehouse {}", warehouse_id),
            location: "Mumbai".to_string(),
            capacity,
            current_stock: stock,
            storage_cost: 1200.0,
            latitude: 19.0760,
            longitude: 72.8777,
        }
    }

    fn create_test_order(order_id: &str, status: OrderStatus, deadline_day: u32) -> Order {
        Order {
            order_id: order_id.to_string(),
            order_date: NaiveDate::from_ymd_opt(2025, 3, 20).unwrap(),
            product_id: "P001".to_string(),
            quantity: 100,
            delivery_deadline: NaiveDate::from_ymd_opt(2025, 3, deadline_day).unwrap(),
            status,
            delivery_latitude: 19.0760,
            delivery_longitude: 72.8777,
        }
    }

    fn create_test_product(product_id: &str, stock: i64, reorder_level: i64) -> Product {
        Product {
            product_id: product_id.to_string(),
            name: format!("Product {}", product_id),
            current_stock: stock,
            reorder_level,
            unit_cost: 3.5,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 24).unwrap()
    }

    #[test]
    fn test_overview_metrics() {
        let api = DashboardApi::new();
        let warehouses = vec![
            create_test_warehouse("W001", 7500, 10_000),
            create_test_warehouse("W002", 12_000, 15_000),
        ];
        let orders = vec![
            create_test_order("ORD001", OrderStatus::Pending, 26),
            create_test_order("ORD002", OrderStatus::Urgent, 25),
            create_test_order("ORD003", OrderStatus::Pending, 22), // 已过期
        ];
        let products = vec![
            create_test_product("P001", 120, 200),
            create_test_product("P002", 500, 200),
        ];

        let metrics = api.overview(&warehouses, &orders, &products, today());
        assert_eq!(metrics.total_inventory, 19_500);
        assert_eq!(metrics.total_capacity, 25_000);
        assert!((metrics.inventory_ratio - 0.78).abs() < 1e-12);
        assert_eq!(metrics.pending_order_count, 2);
        assert_eq!(metrics.urgent_order_count, 1);
        assert_eq!(metrics.reorder_need_count, 1);
    }

    #[test]
    fn test_order_views_split_by_deadline() {
        let api = DashboardApi::new();
        let orders = vec![
            create_test_order("ORD001", OrderStatus::Pending, 26),
            create_test_order("ORD002", OrderStatus::Pending, 22),
        ];

        let pending = api.pending_orders(&orders, today());
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].order_id, "ORD001");

        let history = api.order_history(&orders, today());
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].order_id, "ORD002");
    }

    #[test]
    fn test_reorder_needs_sorted_by_shortfall() {
        let api = DashboardApi::new();
        let products = vec![
            create_test_product("P001", 150, 200), // 缺口 50
            create_test_product("P002", 20, 200),  // 缺口 180
            create_test_product("P003", 300, 200), // 无缺口
        ];

        let needs = api.reorder_needs(&products);
        assert_eq!(needs.len(), 2);
        assert_eq!(needs[0].product_id, "P002");
        assert_eq!(needs[0].shortfall, 180);
        assert_eq!(needs[1].product_id, "P001");
    }

    #[test]
    fn test_inventory_status_sorted() {
        let api = DashboardApi::new();
        let warehouses = vec![
            create_test_warehouse("W002", 12_000, 15_000),
            create_test_warehouse("W001", 7500, 10_000),
        ];

        let status = api.inventory_status(&warehouses);
        assert_eq!(status[0].warehouse_id, "W001");
        assert!((status[0].stock_ratio - 0.75).abs() < 1e-12);
    }
}
