// ==========================================
// 仓储订单调配优化系统 - 导入数据质量模型
// ==========================================
// 用途: 行级校验结果与导入批次报告
// 规则: 单行失败只剔除该行,绝不中断整批导入
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// DqLevel - 数据质量级别
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DqLevel {
    Error,    // 错误（该行剔除）
    Warning,  // 警告（允许导入）
    Info,     // 提示（仅记录）
    Conflict, // 冲突（同批次主键重复,该行剔除）
}

// ==========================================
// DqViolation - 数据质量违规记录
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DqViolation {
    pub row_number: usize,         // 原始文件行号
    pub record_id: Option<String>, // 记录主键（如果可解析）
    pub level: DqLevel,            // 违规级别
    pub field: String,             // 违规字段
    pub message: String,           // 违规描述
}

// ==========================================
// DqSummary - 数据质量汇总
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DqSummary {
    pub total_rows: usize, // 总行数
    pub accepted: usize,   // 成功导入
    pub rejected: usize,   // 剔除（ERROR/CONFLICT）
    pub warning: usize,    // 警告（WARNING）
    pub conflict: usize,   // 冲突（CONFLICT）
}

// ==========================================
// DqReport - 数据质量报告
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DqReport {
    pub batch_id: String,             // 批次 ID
    pub summary: DqSummary,           // 汇总统计
    pub violations: Vec<DqViolation>, // 违规明细
}

impl DqReport {
    /// 指定行是否被剔除（存在 ERROR 或 CONFLICT 级违规）
    pub fn is_row_rejected(&self, row_number: usize) -> bool {
        self.violations.iter().any(|v| {
            v.row_number == row_number
                && matches!(v.level, DqLevel::Error | DqLevel::Conflict)
        })
    }
}

// ==========================================
// ImportBatch - 导入批次元信息
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportBatch {
    pub batch_id: String,            // 批次 ID（UUID）
    pub file_name: Option<String>,   // 源文件名
    pub total_rows: usize,           // 总行数
    pub accepted_rows: usize,        // 成功导入行数
    pub rejected_rows: usize,        // 剔除行数
    pub imported_at: DateTime<Utc>,  // 导入时间
    pub elapsed_ms: u64,             // 导入耗时（毫秒）
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_row_rejected() {
        let report = DqReport {
            batch_id: "B001".to_string(),
            summary: DqSummary::default(),
            violations: vec![
                DqViolation {
                    row_number: 2,
                    record_id: None,
                    level: DqLevel::Error,
                    field: "quantity".to_string(),
                    message: "数量 <= 0".to_string(),
                },
                DqViolation {
                    row_number: 3,
                    record_id: Some("W001".to_string()),
                    level: DqLevel::Warning,
                    field: "name".to_string(),
                    message: "名称缺失".to_string(),
                },
            ],
        };

        assert!(report.is_row_rejected(2));
        assert!(!report.is_row_rejected(3)); // 仅警告不剔除
        assert!(!report.is_row_rejected(4));
    }
}
