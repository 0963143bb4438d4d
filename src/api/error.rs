// ==========================================
// 仓储订单调配优化系统 - API 层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::engine::error::EngineError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API 层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("输入无效: {0}")]
    InvalidInput(String),

    #[error("导入失败: {0}")]
    Import(#[from] ImportError),

    #[error("求解失败: {0}")]
    Engine(#[from] EngineError),

    #[error("仓储访问失败: {0}")]
    Repository(#[from] RepositoryError),

    #[error("配置读写失败: {0}")]
    Config(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
