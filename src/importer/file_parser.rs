// ==========================================
// 仓储订单调配优化系统 - CSV 文件解析器
// ==========================================
// 职责: 文件 → 表头 + 原始字符串行
// 行号约定: 表头为第 1 行,数据行从第 2 行起（与报表一致）
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use std::path::Path;

// ==========================================
// CsvTable - 解析后的表格
// ==========================================
#[derive(Debug, Clone)]
pub struct CsvTable {
    pub headers: Vec<String>, // 已小写化/去空白
    pub rows: Vec<CsvRow>,
}

#[derive(Debug, Clone)]
pub struct CsvRow {
    pub row_number: usize, // 原始文件行号
    pub cells: Vec<String>,
}

impl CsvTable {
    /// 查找列下标（列名大小写不敏感）
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let target = name.to_lowercase();
        self.headers.iter().position(|h| *h == target)
    }

    /// 读取单元格（去空白;空串视为缺失）
    pub fn cell(&self, row: &CsvRow, column: usize) -> Option<String> {
        let value = row.cells.get(column)?.trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }
}

// ==========================================
// 解析入口
// ==========================================

/// 解析 CSV 文件
///
/// # 错误
/// - `FileNotFound`: 路径不存在
/// - `UnsupportedFormat`: 扩展名不是 .csv
/// - `CsvParseError`: 行级解析失败（结构性损坏）
pub fn parse_csv_file(path: &Path) -> ImportResult<CsvTable> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }

    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    if !is_csv {
        return Err(ImportError::UnsupportedFormat(path.display().to_string()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // 列数不齐的行交由字段映射/校验层按行处理
        .from_path(path)?;

    let headers = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        rows.push(CsvRow {
            row_number: index + 2, // 表头占第 1 行
            cells: record.iter().map(|c| c.to_string()).collect(),
        });
    }

    Ok(CsvTable { headers, rows })
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_parse_basic_table() {
        let file = write_csv("Warehouse_ID,Name\nW001,Mumbai Central\nW002,Singapore Hub\n");
        let table = parse_csv_file(file.path()).unwrap();

        assert_eq!(table.headers, vec!["warehouse_id", "name"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].row_number, 2);
        assert_eq!(table.rows[1].row_number, 3);
        assert_eq!(
            table.cell(&table.rows[0], table.column_index("warehouse_id").unwrap()),
            Some("W001".to_string())
        );
    }

    #[test]
    fn test_empty_cell_is_missing() {
        let file = write_csv("warehouse_id,name\nW001,  \n");
        let table = parse_csv_file(file.path()).unwrap();
        let name_col = table.column_index("name").unwrap();
        assert_eq!(table.cell(&table.rows[0], name_col), None);
    }

    #[test]
    fn test_missing_file_rejected() {
        let err = parse_csv_file(Path::new("/nonexistent/data.csv")).unwrap_err();
        assert!(matches!(err, ImportError::FileNotFound(_)));
    }

    #[test]
    fn test_non_csv_extension_rejected() {
        let file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        let err = parse_csv_file(file.path()).unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_short_row_tolerated_by_parser() {
        // 列数不齐在解析层放行,由校验层按行处理
        let file = write_csv("warehouse_id,name,capacity\nW001,Mumbai\n");
        let table = parse_csv_file(file.path()).unwrap();
        assert_eq!(table.rows.len(), 1);
        let capacity_col = table.column_index("capacity").unwrap();
        assert_eq!(table.cell(&table.rows[0], capacity_col), None);
    }
}
