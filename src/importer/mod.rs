// ==========================================
// 仓储订单调配优化系统 - 导入层
// ==========================================
// 职责: CSV 文件 → 校验通过的领域实体
// 管道: 文件解析 → 字段映射 → 行级校验 → 实体提升
// 红线: 单行失败只剔除该行并产生违规记录,绝不中断整批
// ==========================================

pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod validator;

pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper;
pub use file_parser::{parse_csv_file, CsvRow, CsvTable};
pub use validator::RecordValidator;

use crate::domain::ingest::{DqLevel, DqReport, DqSummary, DqViolation, ImportBatch};
use crate::domain::order::{Order, RawOrderRecord};
use crate::domain::product::{Product, RawProductRecord};
use crate::domain::types::OrderStatus;
use crate::domain::warehouse::{RawWarehouseRecord, Warehouse};
use chrono::Utc;
use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;
use tracing::{info, instrument};
use uuid::Uuid;

// ==========================================
// ImportOutcome - 导入结果
// ==========================================
#[derive(Debug, Clone)]
pub struct ImportOutcome<T> {
    pub accepted: Vec<T>,    // 校验通过并提升的实体
    pub report: DqReport,    // 行级违规报告
    pub batch: ImportBatch,  // 批次元信息
}

// ==========================================
// CsvImporter - CSV 导入器
// ==========================================
pub struct CsvImporter {
    mapper: FieldMapper,
    validator: RecordValidator,
}

impl CsvImporter {
    /// 构造函数
    pub fn new() -> Self {
        Self {
            mapper: FieldMapper::new(),
            validator: RecordValidator::new(),
        }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 导入仓库文件
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn import_warehouses(&self, path: &Path) -> ImportResult<ImportOutcome<Warehouse>> {
        let started = Instant::now();
        let table = parse_csv_file(path)?;
        let (records, mut violations) = self.mapper.map_warehouse_rows(&table)?;
        violations.extend(self.validator.validate_warehouses(&records));

        let rejected_rows = rejected_row_set(&violations);
        let accepted: Vec<Warehouse> = records
            .iter()
            .filter(|r| !rejected_rows.contains(&r.row_number))
            .filter_map(promote_warehouse)
            .collect();

        let outcome = build_outcome(path, records.len(), accepted, violations, started);
        info!(
            total = outcome.batch.total_rows,
            accepted = outcome.batch.accepted_rows,
            rejected = outcome.batch.rejected_rows,
            "仓库文件导入完成"
        );
        Ok(outcome)
    }

    /// 导入订单文件
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn import_orders(&self, path: &Path) -> ImportResult<ImportOutcome<Order>> {
        let started = Instant::now();
        let table = parse_csv_file(path)?;
        let (records, mut violations) = self.mapper.map_order_rows(&table)?;
        violations.extend(self.validator.validate_orders(&records));

        let rejected_rows = rejected_row_set(&violations);
        let accepted: Vec<Order> = records
            .iter()
            .filter(|r| !rejected_rows.contains(&r.row_number))
            .filter_map(promote_order)
            .collect();

        let outcome = build_outcome(path, records.len(), accepted, violations, started);
        info!(
            total = outcome.batch.total_rows,
            accepted = outcome.batch.accepted_rows,
            rejected = outcome.batch.rejected_rows,
            "订单文件导入完成"
        );
        Ok(outcome)
    }

    /// 导入产品文件
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn import_products(&self, path: &Path) -> ImportResult<ImportOutcome<Product>> {
        let started = Instant::now();
        let table = parse_csv_file(path)?;
        let (records, mut violations) = self.mapper.map_product_rows(&table)?;
        violations.extend(self.validator.validate_products(&records));

        let rejected_rows = rejected_row_set(&violations);
        let accepted: Vec<Product> = records
            .iter()
            .filter(|r| !rejected_rows.contains(&r.row_number))
            .filter_map(promote_product)
            .collect();

        let outcome = build_outcome(path, records.len(), accepted, violations, started);
        info!(
            total = outcome.batch.total_rows,
            accepted = outcome.batch.accepted_rows,
            rejected = outcome.batch.rejected_rows,
            "产品文件导入完成"
        );
        Ok(outcome)
    }
}

// ==========================================
// Default trait 实现
// ==========================================
impl Default for CsvImporter {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 实体提升
// ==========================================
// 必填字段已由校验层保证;此处的 None 分支仅是防御性出口

fn promote_warehouse(record: &RawWarehouseRecord) -> Option<Warehouse> {
    let warehouse_id = record.warehouse_id.clone()?;
    Some(Warehouse {
        name: record.name.clone().unwrap_or_else(|| warehouse_id.clone()),
        location: record.location.clone().unwrap_or_default(),
        capacity: record.capacity?,
        current_stock: record.current_stock?,
        storage_cost: record.storage_cost?,
        latitude: record.latitude?,
        longitude: record.longitude?,
        warehouse_id,
    })
}

fn promote_order(record: &RawOrderRecord) -> Option<Order> {
    Some(Order {
        order_id: record.order_id.clone()?,
        order_date: record.order_date?,
        product_id: record
            .product_id
            .clone()
            .unwrap_or_else(|| "UNKNOWN".to_string()),
        quantity: record.quantity?,
        delivery_deadline: record.delivery_deadline?,
        status: effective_status(record.status.as_deref()),
        delivery_latitude: record.delivery_latitude?,
        delivery_longitude: record.delivery_longitude?,
    })
}

fn promote_product(record: &RawProductRecord) -> Option<Product> {
    let product_id = record.product_id.clone()?;
    Some(Product {
        name: record.name.clone().unwrap_or_else(|| product_id.clone()),
        current_stock: record.current_stock?,
        reorder_level: record.reorder_level?,
        unit_cost: record.unit_cost.unwrap_or(0.0),
        product_id,
    })
}

/// 输入状态归一化: 仅 PENDING/URGENT 作为提示,其余一律按 PENDING
fn effective_status(raw: Option<&str>) -> OrderStatus {
    match raw.and_then(OrderStatus::parse) {
        Some(OrderStatus::Urgent) => OrderStatus::Urgent,
        _ => OrderStatus::Pending,
    }
}

// ==========================================
// 报告构建
// ==========================================

fn rejected_row_set(violations: &[DqViolation]) -> HashSet<usize> {
    violations
        .iter()
        .filter(|v| matches!(v.level, DqLevel::Error | DqLevel::Conflict))
        .map(|v| v.row_number)
        .collect()
}

fn build_outcome<T>(
    path: &Path,
    total_rows: usize,
    accepted: Vec<T>,
    violations: Vec<DqViolation>,
    started: Instant,
) -> ImportOutcome<T> {
    let batch_id = Uuid::new_v4().to_string();
    let accepted_rows = accepted.len();
    let warning = violations
        .iter()
        .filter(|v| matches!(v.level, DqLevel::Warning))
        .count();
    let conflict = violations
        .iter()
        .filter(|v| matches!(v.level, DqLevel::Conflict))
        .count();

    ImportOutcome {
        report: DqReport {
            batch_id: batch_id.clone(),
            summary: DqSummary {
                total_rows,
                accepted: accepted_rows,
                rejected: total_rows - accepted_rows,
                warning,
                conflict,
            },
            violations,
        },
        batch: ImportBatch {
            batch_id,
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned()),
            total_rows,
            accepted_rows,
            rejected_rows: total_rows - accepted_rows,
            imported_at: Utc::now(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        },
        accepted,
    }
}
