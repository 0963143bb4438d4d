// ==========================================
// 仓储订单调配优化系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    // ===== 配置错误 =====
    #[error("配置无效 (字段 {field}): {message}")]
    InvalidConfig { field: String, message: String },

    // ===== 台账错误 =====
    #[error("未知仓库: {0}")]
    UnknownWarehouse(String),

    #[error("仓库 {warehouse_id} 库存不足: 请求 {requested}, 剩余 {remaining}")]
    InsufficientStock {
        warehouse_id: String,
        requested: i64,
        remaining: i64,
    },

    // ===== 精确求解错误 =====
    #[error("精确求解超时 (已耗时 {elapsed_ms}ms)")]
    ExactSolveTimeout { elapsed_ms: u64 },
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
