// ==========================================
// 导入层集成测试
// ==========================================
// 职责: 验证 CSV → 领域实体 全链路（解析/映射/校验/提升）
// 场景: 混入坏行的真实文件,单行失败不中断整批
// ==========================================

use logitrack_aps::domain::ingest::DqLevel;
use logitrack_aps::domain::types::OrderStatus;
use logitrack_aps::importer::{CsvImporter, ImportError};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ==========================================
// 测试辅助函数
// ==========================================

fn write_csv(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

// ==========================================
// 仓库文件
// ==========================================

#[test]
fn test_warehouse_file_with_mixed_bad_rows() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        &dir,
        "warehouses.csv",
        "warehouse_id,name,capacity,current_stock,location,storage_cost,latitude,longitude\n\
         W001,Mumbai Central,10000,7500,Mumbai,1200,19.0760,72.8777\n\
         ,Ghost Depot,5000,1000,Nowhere,800,10.0,10.0\n\
         W002,Singapore Hub,15000,12000,Singapore,1500,1.3521,103.8198\n\
         W003,Bad Coords,8000,4000,Atlantis,900,123.4,77.1\n\
         W004,Overfull,1000,2000,Delhi,700,28.7041,77.1025\n\
         W005,Negative Cost,9000,3000,Chennai,-5,13.0827,80.2707\n",
    );

    let outcome = CsvImporter::new().import_warehouses(&path).unwrap();

    // 只有 W001/W002 通过;其余逐行剔除,整批不中断
    let ids: Vec<&str> = outcome
        .accepted
        .iter()
        .map(|w| w.warehouse_id.as_str())
        .collect();
    assert_eq!(ids, vec!["W001", "W002"]);
    assert_eq!(outcome.batch.total_rows, 6);
    assert_eq!(outcome.batch.rejected_rows, 4);

    // 每个坏行都有对应违规记录
    assert!(outcome.report.is_row_rejected(3)); // 主键缺失
    assert!(outcome.report.is_row_rejected(5)); // 纬度越界
    assert!(outcome.report.is_row_rejected(6)); // 库存超容量
    assert!(outcome.report.is_row_rejected(7)); // 仓储成本为负
}

#[test]
fn test_missing_warehouse_file() {
    let err = CsvImporter::new()
        .import_warehouses(Path::new("/nonexistent/warehouses.csv"))
        .unwrap_err();
    assert!(matches!(err, ImportError::FileNotFound(_)));
}

#[test]
fn test_missing_required_column_aborts_file() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        &dir,
        "warehouses.csv",
        "warehouse_id,name,capacity\nW001,Mumbai Central,10000\n",
    );
    let err = CsvImporter::new().import_warehouses(&path).unwrap_err();
    assert!(matches!(err, ImportError::MissingColumn(_)));
}

// ==========================================
// 订单文件
// ==========================================

#[test]
fn test_order_file_row_level_validation() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        &dir,
        "orders.csv",
        "order_id,date,product_id,quantity,delivery_deadline,status,delivery_latitude,delivery_longitude\n\
         ORD001,2025-03-24,P001,500,2025-03-26,Pending,19.0760,72.8777\n\
         ORD002,2025-03-24,P002,750,2025-03-25,Urgent,1.3521,103.8198\n\
         ORD003,2025-03-24,P003,-10,2025-03-27,Pending,19.0760,72.8777\n\
         ORD004,2025-03-24,P004,abc,2025-03-27,Pending,19.0760,72.8777\n\
         ORD002,2025-03-24,P005,100,2025-03-28,Pending,19.0760,72.8777\n\
         ORD006,2025-03-24,P006,200,2025-03-29,Shipped,19.0760,72.8777\n",
    );

    let outcome = CsvImporter::new().import_orders(&path).unwrap();

    // 负数量/非数值数量/重复主键被剔除;未知状态仅警告
    let ids: Vec<&str> = outcome
        .accepted
        .iter()
        .map(|o| o.order_id.as_str())
        .collect();
    assert_eq!(ids, vec!["ORD001", "ORD002", "ORD006"]);

    // 状态归一化: 未知状态按 PENDING
    assert_eq!(outcome.accepted[2].status, OrderStatus::Pending);

    // 重复主键计入冲突
    assert_eq!(outcome.report.summary.conflict, 1);
    assert!(outcome
        .report
        .violations
        .iter()
        .any(|v| v.level == DqLevel::Conflict && v.record_id.as_deref() == Some("ORD002")));

    // 非数值数量同时产生类型转换违规
    assert!(outcome
        .report
        .violations
        .iter()
        .any(|v| v.row_number == 5 && v.field == "quantity" && v.level == DqLevel::Error));
}

#[test]
fn test_order_urgent_hint_preserved() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        &dir,
        "orders.csv",
        "order_id,date,product_id,quantity,delivery_deadline,status,delivery_latitude,delivery_longitude\n\
         ORD001,2025-03-24,P001,500,2025-03-26,URGENT,19.0760,72.8777\n",
    );

    let outcome = CsvImporter::new().import_orders(&path).unwrap();
    assert_eq!(outcome.accepted[0].status, OrderStatus::Urgent);
    assert!(outcome.report.violations.is_empty());
}

// ==========================================
// 产品文件
// ==========================================

#[test]
fn test_product_file_with_missing_unit_cost() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        &dir,
        "products.csv",
        "product_id,name,current_stock,reorder_level,unit_cost\n\
         P001,Steel Bolt,120,200,3.5\n\
         P002,Copper Wire,500,200,\n",
    );

    let outcome = CsvImporter::new().import_products(&path).unwrap();
    assert_eq!(outcome.accepted.len(), 2);
    // 单件成本缺失按 0 处理并记警告
    assert_eq!(outcome.accepted[1].unit_cost, 0.0);
    assert_eq!(outcome.report.summary.warning, 1);
}
