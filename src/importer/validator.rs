// ==========================================
// 仓储订单调配优化系统 - 记录校验器
// ==========================================
// 职责: 类型化中间记录的行级规则校验
// 级别: ERROR/CONFLICT 剔除该行, WARNING/INFO 放行并记录
// ==========================================

use crate::domain::ingest::{DqLevel, DqViolation};
use crate::domain::order::RawOrderRecord;
use crate::domain::product::RawProductRecord;
use crate::domain::types::OrderStatus;
use crate::domain::warehouse::RawWarehouseRecord;
use std::collections::HashSet;

// ==========================================
// RecordValidator - 记录校验器
// ==========================================
pub struct RecordValidator {
    // 无状态,不需要注入依赖
}

impl RecordValidator {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 仓库记录校验
    // ==========================================

    /// 校验仓库记录批次
    pub fn validate_warehouses(&self, records: &[RawWarehouseRecord]) -> Vec<DqViolation> {
        let mut violations = Vec::new();
        let mut seen_ids = HashSet::new();

        for record in records {
            let record_id = record.warehouse_id.clone();

            // 主键缺失 / 同批次重复
            match &record.warehouse_id {
                None => {
                    violations.push(self.violation(
                        record.row_number,
                        &record_id,
                        DqLevel::Error,
                        "warehouse_id",
                        "主键缺失".to_string(),
                    ));
                    continue;
                }
                Some(id) => {
                    if !seen_ids.insert(id.clone()) {
                        violations.push(self.violation(
                            record.row_number,
                            &record_id,
                            DqLevel::Conflict,
                            "warehouse_id",
                            format!("重复仓库号（同批次内）: {}", id),
                        ));
                        continue;
                    }
                }
            }

            // 名称缺失仅警告（回落为仓库号）
            if record.name.is_none() {
                violations.push(self.violation(
                    record.row_number,
                    &record_id,
                    DqLevel::Warning,
                    "name",
                    "名称缺失，回落为仓库号".to_string(),
                ));
            }
            if record.location.is_none() {
                violations.push(self.violation(
                    record.row_number,
                    &record_id,
                    DqLevel::Info,
                    "location",
                    "位置描述缺失".to_string(),
                ));
            }

            // 容量/库存约束: 0 ≤ current_stock ≤ capacity
            match record.capacity {
                None => violations.push(self.missing_required(record.row_number, &record_id, "capacity")),
                Some(capacity) if capacity < 0 => {
                    violations.push(self.violation(
                        record.row_number,
                        &record_id,
                        DqLevel::Error,
                        "capacity",
                        format!("容量为负数: {}", capacity),
                    ));
                }
                _ => {}
            }
            match record.current_stock {
                None => violations.push(self.missing_required(
                    record.row_number,
                    &record_id,
                    "current_stock",
                )),
                Some(stock) if stock < 0 => {
                    violations.push(self.violation(
                        record.row_number,
                        &record_id,
                        DqLevel::Error,
                        "current_stock",
                        format!("库存为负数: {}", stock),
                    ));
                }
                Some(stock) => {
                    if let Some(capacity) = record.capacity {
                        if capacity >= 0 && stock > capacity {
                            violations.push(self.violation(
                                record.row_number,
                                &record_id,
                                DqLevel::Error,
                                "current_stock",
                                format!("库存超过容量: {} > {}", stock, capacity),
                            ));
                        }
                    }
                }
            }

            // 仓储成本
            match record.storage_cost {
                None => violations.push(self.missing_required(
                    record.row_number,
                    &record_id,
                    "storage_cost",
                )),
                Some(cost) if cost < 0.0 => {
                    violations.push(self.violation(
                        record.row_number,
                        &record_id,
                        DqLevel::Error,
                        "storage_cost",
                        format!("仓储成本为负数: {}", cost),
                    ));
                }
                _ => {}
            }

            // 坐标范围
            self.validate_coordinate(
                record.latitude,
                record.longitude,
                record.row_number,
                &record_id,
                "latitude",
                "longitude",
                &mut violations,
            );
        }

        violations
    }

    // ==========================================
    // 订单记录校验
    // ==========================================

    /// 校验订单记录批次
    pub fn validate_orders(&self, records: &[RawOrderRecord]) -> Vec<DqViolation> {
        let mut violations = Vec::new();
        let mut seen_ids = HashSet::new();

        for record in records {
            let record_id = record.order_id.clone();

            match &record.order_id {
                None => {
                    violations.push(self.violation(
                        record.row_number,
                        &record_id,
                        DqLevel::Error,
                        "order_id",
                        "主键缺失".to_string(),
                    ));
                    continue;
                }
                Some(id) => {
                    if !seen_ids.insert(id.clone()) {
                        violations.push(self.violation(
                            record.row_number,
                            &record_id,
                            DqLevel::Conflict,
                            "order_id",
                            format!("重复订单号（同批次内）: {}", id),
                        ));
                        continue;
                    }
                }
            }

            if record.order_date.is_none() {
                violations.push(self.missing_required(record.row_number, &record_id, "date"));
            }
            if record.product_id.is_none() {
                violations.push(self.violation(
                    record.row_number,
                    &record_id,
                    DqLevel::Info,
                    "product_id",
                    "产品号缺失".to_string(),
                ));
            }

            // 数量必须为正
            match record.quantity {
                None => violations.push(self.missing_required(record.row_number, &record_id, "quantity")),
                Some(quantity) if quantity <= 0 => {
                    violations.push(self.violation(
                        record.row_number,
                        &record_id,
                        DqLevel::Error,
                        "quantity",
                        format!("数量必须为正数: {}", quantity),
                    ));
                }
                _ => {}
            }

            // 截止日期
            match (record.delivery_deadline, record.order_date) {
                (None, _) => violations.push(self.missing_required(
                    record.row_number,
                    &record_id,
                    "delivery_deadline",
                )),
                (Some(deadline), Some(order_date)) if deadline < order_date => {
                    violations.push(self.violation(
                        record.row_number,
                        &record_id,
                        DqLevel::Warning,
                        "delivery_deadline",
                        format!("截止日期早于下单日期: {} < {}", deadline, order_date),
                    ));
                }
                _ => {}
            }

            // 状态提示归一化检查
            match record.status.as_deref().map(OrderStatus::parse) {
                None => violations.push(self.violation(
                    record.row_number,
                    &record_id,
                    DqLevel::Info,
                    "status",
                    "状态缺失，按 PENDING 处理".to_string(),
                )),
                Some(None) => violations.push(self.violation(
                    record.row_number,
                    &record_id,
                    DqLevel::Warning,
                    "status",
                    format!(
                        "未知状态 '{}'，按 PENDING 处理",
                        record.status.as_deref().unwrap_or_default()
                    ),
                )),
                Some(Some(status)) if status.is_derived() => {
                    violations.push(self.violation(
                        record.row_number,
                        &record_id,
                        DqLevel::Warning,
                        "status",
                        format!("派生终态 {} 不可作为输入提示，按 PENDING 处理", status),
                    ));
                }
                _ => {}
            }

            // 交付地坐标范围
            self.validate_coordinate(
                record.delivery_latitude,
                record.delivery_longitude,
                record.row_number,
                &record_id,
                "delivery_latitude",
                "delivery_longitude",
                &mut violations,
            );
        }

        violations
    }

    // ==========================================
    // 产品记录校验
    // ==========================================

    /// 校验产品记录批次
    pub fn validate_products(&self, records: &[RawProductRecord]) -> Vec<DqViolation> {
        let mut violations = Vec::new();
        let mut seen_ids = HashSet::new();

        for record in records {
            let record_id = record.product_id.clone();

            match &record.product_id {
                None => {
                    violations.push(self.violation(
                        record.row_number,
                        &record_id,
                        DqLevel::Error,
                        "product_id",
                        "主键缺失".to_string(),
                    ));
                    continue;
                }
                Some(id) => {
                    if !seen_ids.insert(id.clone()) {
                        violations.push(self.violation(
                            record.row_number,
                            &record_id,
                            DqLevel::Conflict,
                            "product_id",
                            format!("重复产品号（同批次内）: {}", id),
                        ));
                        continue;
                    }
                }
            }

            match record.current_stock {
                None => violations.push(self.missing_required(
                    record.row_number,
                    &record_id,
                    "current_stock",
                )),
                Some(stock) if stock < 0 => {
                    violations.push(self.violation(
                        record.row_number,
                        &record_id,
                        DqLevel::Error,
                        "current_stock",
                        format!("库存为负数: {}", stock),
                    ));
                }
                _ => {}
            }
            match record.reorder_level {
                None => violations.push(self.missing_required(
                    record.row_number,
                    &record_id,
                    "reorder_level",
                )),
                Some(level) if level < 0 => {
                    violations.push(self.violation(
                        record.row_number,
                        &record_id,
                        DqLevel::Error,
                        "reorder_level",
                        format!("补货阈值为负数: {}", level),
                    ));
                }
                _ => {}
            }
            if record.unit_cost.is_none() {
                violations.push(self.violation(
                    record.row_number,
                    &record_id,
                    DqLevel::Warning,
                    "unit_cost",
                    "单件成本缺失，按 0 处理".to_string(),
                ));
            }
        }

        violations
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    #[allow(clippy::too_many_arguments)]
    fn validate_coordinate(
        &self,
        latitude: Option<f64>,
        longitude: Option<f64>,
        row_number: usize,
        record_id: &Option<String>,
        lat_field: &str,
        lon_field: &str,
        violations: &mut Vec<DqViolation>,
    ) {
        match latitude {
            None => violations.push(self.missing_required(row_number, record_id, lat_field)),
            Some(lat) if !(-90.0..=90.0).contains(&lat) => {
                violations.push(self.violation(
                    row_number,
                    record_id,
                    DqLevel::Error,
                    lat_field,
                    format!("纬度超出范围 [-90, 90]: {}", lat),
                ));
            }
            _ => {}
        }
        match longitude {
            None => violations.push(self.missing_required(row_number, record_id, lon_field)),
            Some(lon) if !(-180.0..=180.0).contains(&lon) => {
                violations.push(self.violation(
                    row_number,
                    record_id,
                    DqLevel::Error,
                    lon_field,
                    format!("经度超出范围 [-180, 180]: {}", lon),
                ));
            }
            _ => {}
        }
    }

    fn missing_required(
        &self,
        row_number: usize,
        record_id: &Option<String>,
        field: &str,
    ) -> DqViolation {
        self.violation(
            row_number,
            record_id,
            DqLevel::Error,
            field,
            "必填字段缺失或无法解析".to_string(),
        )
    }

    fn violation(
        &self,
        row_number: usize,
        record_id: &Option<String>,
        level: DqLevel,
        field: &str,
        message: String,
    ) -> DqViolation {
        DqViolation {
            row_number,
            record_id: record_id.clone(),
            level,
            field: field.to_string(),
            message,
        }
    }
}

// ==========================================
// Default trait 实现
// ==========================================
impl Default for RecordValidator {
    fn default() -> Self {
        Self::new()
    }
}
