// ==========================================
// 仓储订单调配优化系统 - 领域类型定义
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 订单状态 (Order Status)
// ==========================================
// 输入侧仅作紧急提示 (PENDING/URGENT)；终态由分配引擎派生
// 序列化格式: SCREAMING_SNAKE_CASE (与 CSV/报表一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,            // 待处理
    Urgent,             // 紧急
    PartiallyFulfilled, // 部分满足
    Fulfilled,          // 完全满足
    Unmet,              // 未满足（本轮终态）
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "PENDING"),
            OrderStatus::Urgent => write!(f, "URGENT"),
            OrderStatus::PartiallyFulfilled => write!(f, "PARTIALLY_FULFILLED"),
            OrderStatus::Fulfilled => write!(f, "FULFILLED"),
            OrderStatus::Unmet => write!(f, "UNMET"),
        }
    }
}

impl OrderStatus {
    /// 从字符串解析状态（大小写不敏感，容忍空格/连字符差异）
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .to_uppercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();
        match normalized.as_str() {
            "PENDING" => Some(OrderStatus::Pending),
            "URGENT" => Some(OrderStatus::Urgent),
            "PARTIALLY_FULFILLED" => Some(OrderStatus::PartiallyFulfilled),
            "FULFILLED" => Some(OrderStatus::Fulfilled),
            "UNMET" => Some(OrderStatus::Unmet),
            _ => None,
        }
    }

    /// 是否为紧急提示（优先调度）
    pub fn is_urgent_hint(&self) -> bool {
        matches!(self, OrderStatus::Urgent)
    }

    /// 是否为分配引擎的派生终态（不可作为输入提示）
    pub fn is_derived(&self) -> bool {
        matches!(
            self,
            OrderStatus::PartiallyFulfilled | OrderStatus::Fulfilled | OrderStatus::Unmet
        )
    }
}

// ==========================================
// 求解模式 (Optimize Mode)
// ==========================================
// EXACT: 运输问题精确求解（规模/超时受限）
// GREEDY: 贪心启发式（始终可用的回退路径）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptimizeMode {
    Exact,
    Greedy,
}

impl fmt::Display for OptimizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizeMode::Exact => write!(f, "EXACT"),
            OptimizeMode::Greedy => write!(f, "GREEDY"),
        }
    }
}

impl OptimizeMode {
    /// 从字符串解析求解模式
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "EXACT" => Some(OptimizeMode::Exact),
            "GREEDY" => Some(OptimizeMode::Greedy),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_parse() {
        assert_eq!(OrderStatus::parse("Pending"), Some(OrderStatus::Pending));
        assert_eq!(OrderStatus::parse("URGENT"), Some(OrderStatus::Urgent));
        assert_eq!(
            OrderStatus::parse("Partially Fulfilled"),
            Some(OrderStatus::PartiallyFulfilled)
        );
        assert_eq!(OrderStatus::parse("shipped"), None);
    }

    #[test]
    fn test_order_status_roundtrip_display() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Urgent,
            OrderStatus::PartiallyFulfilled,
            OrderStatus::Fulfilled,
            OrderStatus::Unmet,
        ] {
            assert_eq!(OrderStatus::parse(&status.to_string()), Some(status));
        }
    }

    #[test]
    fn test_derived_status_classification() {
        assert!(!OrderStatus::Pending.is_derived());
        assert!(!OrderStatus::Urgent.is_derived());
        assert!(OrderStatus::Unmet.is_derived());
        assert!(!OrderStatus::Pending.is_urgent_hint());
        assert!(OrderStatus::Urgent.is_urgent_hint());
    }

    #[test]
    fn test_optimize_mode_parse() {
        assert_eq!(OptimizeMode::parse("exact"), Some(OptimizeMode::Exact));
        assert_eq!(OptimizeMode::parse("GREEDY"), Some(OptimizeMode::Greedy));
        assert_eq!(OptimizeMode::parse("simplex"), None);
    }
}
