// ==========================================
// 仓储订单调配优化系统 - 字段映射器
// ==========================================
// 职责: 原始字符串行 → 类型化中间记录
// 规则: 类型转换失败只产生该行的 ERROR 违规,不中断整批
// ==========================================

use crate::domain::ingest::{DqLevel, DqViolation};
use crate::domain::order::RawOrderRecord;
use crate::domain::product::RawProductRecord;
use crate::domain::warehouse::RawWarehouseRecord;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{CsvRow, CsvTable};
use chrono::NaiveDate;

/// 接受的日期格式（按顺序尝试）
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

// ==========================================
// FieldMapper - 字段映射器
// ==========================================
pub struct FieldMapper {
    // 无状态,不需要注入依赖
}

impl FieldMapper {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 仓库记录映射
    // ==========================================

    /// 映射仓库行
    ///
    /// 必需列: warehouse_id,name,capacity,current_stock,location,
    ///         storage_cost,latitude,longitude
    pub fn map_warehouse_rows(
        &self,
        table: &CsvTable,
    ) -> ImportResult<(Vec<RawWarehouseRecord>, Vec<DqViolation>)> {
        let col_id = self.require_column(table, "warehouse_id")?;
        let col_name = self.require_column(table, "name")?;
        let col_capacity = self.require_column(table, "capacity")?;
        let col_stock = self.require_column(table, "current_stock")?;
        let col_location = self.require_column(table, "location")?;
        let col_storage = self.require_column(table, "storage_cost")?;
        let col_lat = self.require_column(table, "latitude")?;
        let col_lon = self.require_column(table, "longitude")?;

        let mut records = Vec::with_capacity(table.rows.len());
        let mut violations = Vec::new();

        for row in &table.rows {
            let record_id = table.cell(row, col_id);
            records.push(RawWarehouseRecord {
                warehouse_id: record_id.clone(),
                name: table.cell(row, col_name),
                capacity: self.parse_i64(
                    table.cell(row, col_capacity),
                    row,
                    &record_id,
                    "capacity",
                    &mut violations,
                ),
                current_stock: self.parse_i64(
                    table.cell(row, col_stock),
                    row,
                    &record_id,
                    "current_stock",
                    &mut violations,
                ),
                location: table.cell(row, col_location),
                storage_cost: self.parse_f64(
                    table.cell(row, col_storage),
                    row,
                    &record_id,
                    "storage_cost",
                    &mut violations,
                ),
                latitude: self.parse_f64(
                    table.cell(row, col_lat),
                    row,
                    &record_id,
                    "latitude",
                    &mut violations,
                ),
                longitude: self.parse_f64(
                    table.cell(row, col_lon),
                    row,
                    &record_id,
                    "longitude",
                    &mut violations,
                ),
                row_number: row.row_number,
            });
        }

        Ok((records, violations))
    }

    // ==========================================
    // 订单记录映射
    // ==========================================

    /// 映射订单行
    ///
    /// 必需列: order_id,date,product_id,quantity,delivery_deadline,
    ///         status,delivery_latitude,delivery_longitude
    pub fn map_order_rows(
        &self,
        table: &CsvTable,
    ) -> ImportResult<(Vec<RawOrderRecord>, Vec<DqViolation>)> {
        let col_id = self.require_column(table, "order_id")?;
        let col_date = self.require_column(table, "date")?;
        let col_product = self.require_column(table, "product_id")?;
        let col_quantity = self.require_column(table, "quantity")?;
        let col_deadline = self.require_column(table, "delivery_deadline")?;
        let col_status = self.require_column(table, "status")?;
        let col_lat = self.require_column(table, "delivery_latitude")?;
        let col_lon = self.require_column(table, "delivery_longitude")?;

        let mut records = Vec::with_capacity(table.rows.len());
        let mut violations = Vec::new();

        for row in &table.rows {
            let record_id = table.cell(row, col_id);
            records.push(RawOrderRecord {
                order_id: record_id.clone(),
                order_date: self.parse_date(
                    table.cell(row, col_date),
                    row,
                    &record_id,
                    "date",
                    &mut violations,
                ),
                product_id: table.cell(row, col_product),
                quantity: self.parse_i64(
                    table.cell(row, col_quantity),
                    row,
                    &record_id,
                    "quantity",
                    &mut violations,
                ),
                delivery_deadline: self.parse_date(
                    table.cell(row, col_deadline),
                    row,
                    &record_id,
                    "delivery_deadline",
                    &mut violations,
                ),
                status: table.cell(row, col_status),
                delivery_latitude: self.parse_f64(
                    table.cell(row, col_lat),
                    row,
                    &record_id,
                    "delivery_latitude",
                    &mut violations,
                ),
                delivery_longitude: self.parse_f64(
                    table.cell(row, col_lon),
                    row,
                    &record_id,
                    "delivery_longitude",
                    &mut violations,
                ),
                row_number: row.row_number,
            });
        }

        Ok((records, violations))
    }

    // ==========================================
    // 产品记录映射
    // ==========================================

    /// 映射产品行
    ///
    /// 必需列: product_id,name,current_stock,reorder_level,unit_cost
    pub fn map_product_rows(
        &self,
        table: &CsvTable,
    ) -> ImportResult<(Vec<RawProductRecord>, Vec<DqViolation>)> {
        let col_id = self.require_column(table, "product_id")?;
        let col_name = self.require_column(table, "name")?;
        let col_stock = self.require_column(table, "current_stock")?;
        let col_reorder = self.require_column(table, "reorder_level")?;
        let col_unit_cost = self.require_column(table, "unit_cost")?;

        let mut records = Vec::with_capacity(table.rows.len());
        let mut violations = Vec::new();

        for row in &table.rows {
            let record_id = table.cell(row, col_id);
            records.push(RawProductRecord {
                product_id: record_id.clone(),
                name: table.cell(row, col_name),
                current_stock: self.parse_i64(
                    table.cell(row, col_stock),
                    row,
                    &record_id,
                    "current_stock",
                    &mut violations,
                ),
                reorder_level: self.parse_i64(
                    table.cell(row, col_reorder),
                    row,
                    &record_id,
                    "reorder_level",
                    &mut violations,
                ),
                unit_cost: self.parse_f64(
                    table.cell(row, col_unit_cost),
                    row,
                    &record_id,
                    "unit_cost",
                    &mut violations,
                ),
                row_number: row.row_number,
            });
        }

        Ok((records, violations))
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    /// 必需列检查（缺列属于文件级错误,整批中止）
    fn require_column(&self, table: &CsvTable, name: &str) -> ImportResult<usize> {
        table
            .column_index(name)
            .ok_or_else(|| ImportError::MissingColumn(name.to_string()))
    }

    fn parse_i64(
        &self,
        value: Option<String>,
        row: &CsvRow,
        record_id: &Option<String>,
        field: &str,
        violations: &mut Vec<DqViolation>,
    ) -> Option<i64> {
        let raw = value?;
        match raw.parse::<i64>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                violations.push(self.conversion_violation(row, record_id, field, "整数", &raw));
                None
            }
        }
    }

    fn parse_f64(
        &self,
        value: Option<String>,
        row: &CsvRow,
        record_id: &Option<String>,
        field: &str,
        violations: &mut Vec<DqViolation>,
    ) -> Option<f64> {
        let raw = value?;
        match raw.parse::<f64>() {
            Ok(parsed) if parsed.is_finite() => Some(parsed),
            _ => {
                violations.push(self.conversion_violation(row, record_id, field, "数值", &raw));
                None
            }
        }
    }

    fn parse_date(
        &self,
        value: Option<String>,
        row: &CsvRow,
        record_id: &Option<String>,
        field: &str,
        violations: &mut Vec<DqViolation>,
    ) -> Option<NaiveDate> {
        let raw = value?;
        for format in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(&raw, format) {
                return Some(date);
            }
        }
        violations.push(self.conversion_violation(row, record_id, field, "日期(YYYY-MM-DD)", &raw));
        None
    }

    fn conversion_violation(
        &self,
        row: &CsvRow,
        record_id: &Option<String>,
        field: &str,
        expected: &str,
        raw: &str,
    ) -> DqViolation {
        DqViolation {
            row_number: row.row_number,
            record_id: record_id.clone(),
            level: DqLevel::Error,
            field: field.to_string(),
            message: format!("类型转换失败: 期望{}, 实际 '{}'", expected, raw),
        }
    }
}

// ==========================================
// Default trait 实现
// ==========================================
impl Default for FieldMapper {
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
    use crate::importer::file_parser::parse_csv_file;
    use std::io::Write;

    fn parse_table(content: &str) -> CsvTable {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        parse_csv_file(file.path()).unwrap()
    }

    const WAREHOUSE_HEADER: &str =
        "warehouse_id,name,capacity,current_stock,location,storage_cost,latitude,longitude";

    #[test]
    fn test_map_valid_warehouse_row() {
        let table = parse_table(&format!(
            "{}\nW001,Mumbai Central,10000,7500,Mumbai,1200,19.0760,72.8777\n",
            WAREHOUSE_HEADER
        ));
        let (records, violations) = FieldMapper::new().map_warehouse_rows(&table).unwrap();

        assert_eq!(records.len(), 1);
        assert!(violations.is_empty());
        let record = &records[0];
        assert_eq!(record.warehouse_id.as_deref(), Some("W001"));
        assert_eq!(record.capacity, Some(10_000));
        assert_eq!(record.current_stock, Some(7_500));
        assert_eq!(record.latitude, Some(19.0760));
    }

    #[test]
    fn test_non_numeric_field_produces_error_violation() {
        let table = parse_table(&format!(
            "{}\nW001,Mumbai Central,lots,7500,Mumbai,1200,19.0760,72.8777\n",
            WAREHOUSE_HEADER
        ));
        let (records, violations) = FieldMapper::new().map_warehouse_rows(&table).unwrap();

        assert_eq!(records[0].capacity, None);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "capacity");
        assert_eq!(violations[0].level, DqLevel::Error);
        assert_eq!(violations[0].record_id.as_deref(), Some("W001"));
    }

    #[test]
    fn test_missing_column_is_file_level_error() {
        let table = parse_table("warehouse_id,name\nW001,Mumbai Central\n");
        let err = FieldMapper::new().map_warehouse_rows(&table).unwrap_err();
        assert!(matches!(err, ImportError::MissingColumn(_)));
    }

    #[test]
    fn test_map_order_dates_and_status() {
        let table = parse_table(
            "order_id,date,product_id,quantity,delivery_deadline,status,delivery_latitude,delivery_longitude\n\
             ORD001,2025-03-24,P001,500,2025/03/26,Pending,19.0760,72.8777\n\
             ORD002,24-03-2025,P002,750,2025-03-25,Urgent,1.3521,103.8198\n",
        );
        let (records, violations) = FieldMapper::new().map_order_rows(&table).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].order_date,
            Some(NaiveDate::from_ymd_opt(2025, 3, 24).unwrap())
        );
        // 斜杠格式同样接受
        assert_eq!(
            records[0].delivery_deadline,
            Some(NaiveDate::from_ymd_opt(2025, 3, 26).unwrap())
        );
        // 非法日期格式产生行级 ERROR
        assert_eq!(records[1].order_date, None);
        assert!(violations
            .iter()
            .any(|v| v.row_number == 3 && v.field == "date"));
    }

    #[test]
    fn test_map_product_rows() {
        let table = parse_table(
            "product_id,name,current_stock,reorder_level,unit_cost\nP001,Steel Bolt,120,200,3.5\n",
        );
        let (records, violations) = FieldMapper::new().map_product_rows(&table).unwrap();
        assert!(violations.is_empty());
        assert_eq!(records[0].reorder_level, Some(200));
    }
}
