// ==========================================
// 测试数据生成器
// ==========================================
// 用途: 生成样例 CSV 数据集（仓库/订单/产品）
// 输出: tests/fixtures/datasets/*.csv
// ==========================================

use chrono::{Duration, Local};
use csv::Writer;
use std::error::Error;
use std::fs;
use std::path::Path;

const WAREHOUSE_HEADER: &[&str] = &[
    "warehouse_id",
    "name",
    "capacity",
    "current_stock",
    "location",
    "storage_cost",
    "latitude",
    "longitude",
];

const ORDER_HEADER: &[&str] = &[
    "order_id",
    "date",
    "product_id",
    "quantity",
    "delivery_deadline",
    "status",
    "delivery_latitude",
    "delivery_longitude",
];

const PRODUCT_HEADER: &[&str] = &[
    "product_id",
    "name",
    "current_stock",
    "reorder_level",
    "unit_cost",
];

/// 样例仓网（城市, 坐标, 容量, 库存, 仓储成本）
const WAREHOUSES: &[(&str, &str, f64, f64, i64, i64, f64)] = &[
    ("W001", "Mumbai Central", 19.0760, 72.8777, 10_000, 7_500, 1200.0),
    ("W002", "Singapore Hub", 1.3521, 103.8198, 15_000, 12_000, 1500.0),
    ("W003", "Delhi Depot", 28.7041, 77.1025, 8_000, 4_000, 900.0),
    ("W004", "Chennai Yard", 13.0827, 80.2707, 9_000, 5_500, 950.0),
];

fn generate_warehouses(dir: &Path) -> Result<(), Box<dyn Error>> {
    let mut writer = Writer::from_path(dir.join("sample_warehouses.csv"))?;
    writer.write_record(WAREHOUSE_HEADER)?;
    for &(id, name, lat, lon, capacity, stock, storage_cost) in WAREHOUSES {
        let city = name.split(' ').next().unwrap_or(name);
        writer.write_record([
            id.to_string(),
            name.to_string(),
            capacity.to_string(),
            stock.to_string(),
            city.to_string(),
            storage_cost.to_string(),
            lat.to_string(),
            lon.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn generate_orders(dir: &Path) -> Result<(), Box<dyn Error>> {
    let today = Local::now().date_naive();
    let mut writer = Writer::from_path(dir.join("sample_orders.csv"))?;
    writer.write_record(ORDER_HEADER)?;

    // 每个仓点附近 3 单: 紧急/普通/大单
    let mut seq = 1;
    for &(_, _, lat, lon, _, _, _) in WAREHOUSES {
        let rows = [
            (500, "Urgent", 1),
            (750, "Pending", 2),
            (1_800, "Pending", 4),
        ];
        for (quantity, status, deadline_days) in rows {
            writer.write_record([
                format!("ORD{:03}", seq),
                today.to_string(),
                format!("P{:03}", (seq % 5) + 1),
                quantity.to_string(),
                (today + Duration::days(deadline_days)).to_string(),
                status.to_string(),
                lat.to_string(),
                lon.to_string(),
            ])?;
            seq += 1;
        }
    }
    writer.flush()?;
    Ok(())
}

fn generate_products(dir: &Path) -> Result<(), Box<dyn Error>> {
    let mut writer = Writer::from_path(dir.join("product_inventory.csv"))?;
    writer.write_record(PRODUCT_HEADER)?;
    let products = [
        ("P001", "Steel Bolt", 120, 200, 3.5),
        ("P002", "Copper Wire", 500, 200, 7.0),
        ("P003", "Bearing Set", 90, 150, 12.0),
        ("P004", "Rubber Seal", 800, 300, 1.2),
        ("P005", "Alloy Plate", 40, 120, 25.0),
    ];
    for (id, name, stock, reorder_level, unit_cost) in products {
        writer.write_record([
            id.to_string(),
            name.to_string(),
            stock.to_string(),
            reorder_level.to_string(),
            unit_cost.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let dir = Path::new("tests/fixtures/datasets");
    fs::create_dir_all(dir)?;

    generate_warehouses(dir)?;
    generate_orders(dir)?;
    generate_products(dir)?;

    println!("样例数据集已生成: {}", dir.display());
    Ok(())
}
