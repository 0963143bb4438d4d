// ==========================================
// 仓储订单调配优化系统 - 求解参数配置
// ==========================================
// 用途: 单轮求解的全部可调参数;引擎不读全局状态
// ==========================================

use crate::domain::types::OptimizeMode;
use crate::engine::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};

// ==========================================
// OptimizeConfig - 求解参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizeConfig {
    // ===== 成本模型 =====
    pub rate_per_unit_distance: f64,   // 单件每 km 运输费率（≥ 0）
    pub assumed_speed_km_per_day: f64, // 假定运输速度（km/天，> 0）

    // ===== 求解模式 =====
    pub mode: OptimizeMode,         // EXACT / GREEDY
    pub exact_size_threshold: usize, // 精确求解规模上限（仓库数 × 订单数）
    pub exact_timeout_ms: u64,       // 精确求解超时（毫秒，0 = 不限时）

    // ===== 履约策略 =====
    pub allow_partial: bool, // false = 全量履约模式（整单满足或放弃）
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            rate_per_unit_distance: 1.0,
            assumed_speed_km_per_day: 800.0,
            mode: OptimizeMode::Exact,
            exact_size_threshold: 2_500,
            exact_timeout_ms: 20_000,
            allow_partial: true,
        }
    }
}

impl OptimizeConfig {
    /// 参数合法性检查
    pub fn validate(&self) -> EngineResult<()> {
        if !self.rate_per_unit_distance.is_finite() || self.rate_per_unit_distance < 0.0 {
            return Err(EngineError::InvalidConfig {
                field: "rate_per_unit_distance".to_string(),
                message: format!("必须为非负有限值,实际 {}", self.rate_per_unit_distance),
            });
        }
        if !self.assumed_speed_km_per_day.is_finite() || self.assumed_speed_km_per_day <= 0.0 {
            return Err(EngineError::InvalidConfig {
                field: "assumed_speed_km_per_day".to_string(),
                message: format!("必须为正有限值,实际 {}", self.assumed_speed_km_per_day),
            });
        }
        Ok(())
    }
}
