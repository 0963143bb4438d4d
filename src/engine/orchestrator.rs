// ==========================================
// 仓储订单调配优化系统 - 引擎编排器
// ==========================================
// 用途: 协调可行性判定 → 优先级排序 → 分配 → 聚合
// 红线: 精确求解必须受超时约束,超时回退贪心并标记 degraded,
//       绝不无限阻塞,也绝不静默给出错误结果
// ==========================================

use crate::config::OptimizeConfig;
use crate::domain::order::Order;
use crate::domain::report::OptimizeOutcome;
use crate::domain::types::OptimizeMode;
use crate::domain::warehouse::Warehouse;
use crate::engine::aggregator::{ResultAggregator, RunMeta};
use crate::engine::allocator::{AllocationResult, GreedyAllocator, TransportSolver};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::feasibility::{FeasibilityEngine, FeasibilityOutcome};
use crate::engine::geo::GeoCostEstimator;
use crate::engine::ledger::CapacityLedger;
use crate::engine::priority::PrioritySorter;
use chrono::NaiveDate;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

// ==========================================
// OptimizeRun - 单轮求解产物
// ==========================================
// outcome 供展示层消费;ledger 供提交模式落库
#[derive(Debug, Clone)]
pub struct OptimizeRun {
    pub outcome: OptimizeOutcome,
    pub ledger: CapacityLedger,
}

// ==========================================
// OptimizeOrchestrator - 引擎编排器
// ==========================================
pub struct OptimizeOrchestrator {
    sorter: PrioritySorter,
    greedy: GreedyAllocator,
    solver: TransportSolver,
    aggregator: ResultAggregator,
}

impl OptimizeOrchestrator {
    /// 创建新的编排器实例
    pub fn new() -> Self {
        Self {
            sorter: PrioritySorter::new(),
            greedy: GreedyAllocator::new(),
            solver: TransportSolver::new(),
            aggregator: ResultAggregator::new(),
        }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 执行完整求解流程
    ///
    /// 引擎无隐藏状态: 相同输入必产出相同分配集
    ///
    /// # 参数
    /// - `warehouses`: 仓库快照（只读）
    /// - `orders`: 待处理订单（只读,输入状态仅作紧急提示）
    /// - `config`: 求解参数
    /// - `today`: 当前日期（可行性基准）
    pub fn optimize(
        &self,
        warehouses: &[Warehouse],
        orders: &[Order],
        config: &OptimizeConfig,
        today: NaiveDate,
    ) -> EngineResult<OptimizeRun> {
        config.validate()?;
        let started = Instant::now();

        info!(
            warehouse_count = warehouses.len(),
            order_count = orders.len(),
            mode = %config.mode,
            "开始执行求解流程"
        );

        // ==========================================
        // 步骤1: Feasibility Engine - 可行候选边构建
        // ==========================================
        debug!("步骤1: 构建可行候选边");
        let estimator = GeoCostEstimator::new(
            config.rate_per_unit_distance,
            config.assumed_speed_km_per_day,
        );
        let feasibility = FeasibilityEngine::new(estimator).evaluate(orders, warehouses, today);

        info!(
            feasible_orders = feasibility.candidates_by_order.len(),
            infeasible_orders = feasibility.infeasible_orders.len(),
            "可行性判定完成"
        );

        // ==========================================
        // 步骤2: Priority Sorter - 订单优先级排序
        // ==========================================
        debug!("步骤2: 订单优先级排序");
        let sorted_orders = self.sorter.sort(orders.to_vec());

        // ==========================================
        // 步骤3: Allocation - 分配求解
        // ==========================================
        debug!("步骤3: 分配求解");
        let (allocation_result, ledger, mode_used, degraded, fallback_reason) =
            self.run_allocation(warehouses, &sorted_orders, &feasibility, config)?;

        info!(
            mode_used = %mode_used,
            degraded,
            allocation_count = allocation_result.allocations.len(),
            total_allocated = allocation_result.total_allocated(),
            "分配求解完成"
        );

        // ==========================================
        // 步骤4: Result Aggregator - 结果聚合
        // ==========================================
        debug!("步骤4: 结果聚合");
        let meta = RunMeta {
            run_id: Uuid::new_v4().to_string(),
            mode_requested: config.mode,
            mode_used,
            degraded,
            fallback_reason,
            solve_time_ms: started.elapsed().as_millis() as u64,
        };
        let outcome = self.aggregator.aggregate(
            warehouses,
            orders,
            &allocation_result,
            &feasibility.infeasible_orders,
            meta,
        );

        info!(
            total_cost = outcome.summary.total_cost,
            fulfilled = outcome.summary.fulfilled_count,
            partial = outcome.summary.partial_count,
            unmet = outcome.summary.unmet_count,
            "求解流程完成"
        );

        Ok(OptimizeRun { outcome, ledger })
    }

    /// 模拟求解: 产出同样的报表,但丢弃台账（不提交库存变更）
    pub fn simulate(
        &self,
        warehouses: &[Warehouse],
        orders: &[Order],
        config: &OptimizeConfig,
        today: NaiveDate,
    ) -> EngineResult<OptimizeOutcome> {
        self.optimize(warehouses, orders, config, today)
            .map(|run| run.outcome)
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    /// 模式决策与分配执行
    ///
    /// 返回: (分配结果, 台账, 实际模式, degraded, 回退原因)
    #[allow(clippy::type_complexity)]
    fn run_allocation(
        &self,
        warehouses: &[Warehouse],
        sorted_orders: &[Order],
        feasibility: &FeasibilityOutcome,
        config: &OptimizeConfig,
    ) -> EngineResult<(
        AllocationResult,
        CapacityLedger,
        OptimizeMode,
        bool,
        Option<String>,
    )> {
        if config.mode == OptimizeMode::Exact {
            // 全量履约模式无法表达为运输问题松弛,改走贪心
            if !config.allow_partial {
                let reason = "EXACT_REQUIRES_PARTIAL: allow_partial=false".to_string();
                let (result, ledger) =
                    self.run_greedy(warehouses, sorted_orders, feasibility, config)?;
                return Ok((result, ledger, OptimizeMode::Greedy, false, Some(reason)));
            }

            // 规模门控: 超限直接走贪心（设计行为,非降级）
            let problem_size = warehouses.len().saturating_mul(sorted_orders.len());
            if problem_size > config.exact_size_threshold {
                let reason = format!(
                    "EXACT_SIZE_THRESHOLD_EXCEEDED: size={}, threshold={}",
                    problem_size, config.exact_size_threshold
                );
                info!(problem_size, threshold = config.exact_size_threshold, "规模超限,改走贪心");
                let (result, ledger) =
                    self.run_greedy(warehouses, sorted_orders, feasibility, config)?;
                return Ok((result, ledger, OptimizeMode::Greedy, false, Some(reason)));
            }

            // 精确求解（带超时）
            let deadline = if config.exact_timeout_ms > 0 {
                Some(Instant::now() + Duration::from_millis(config.exact_timeout_ms))
            } else {
                None
            };
            let mut ledger = CapacityLedger::new(warehouses);
            match self
                .solver
                .solve(sorted_orders, feasibility, &mut ledger, deadline)
            {
                Ok(result) => return Ok((result, ledger, OptimizeMode::Exact, false, None)),
                Err(EngineError::ExactSolveTimeout { elapsed_ms }) => {
                    // 超时回退: 丢弃精确求解的台账,贪心在干净台账上重算
                    warn!(elapsed_ms, "精确求解超时,回退贪心模式");
                    let reason = format!("EXACT_TIMEOUT_FALLBACK: elapsed_ms={}", elapsed_ms);
                    let (result, ledger) =
                        self.run_greedy(warehouses, sorted_orders, feasibility, config)?;
                    return Ok((result, ledger, OptimizeMode::Greedy, true, Some(reason)));
                }
                Err(other) => return Err(other),
            }
        }

        let (result, ledger) = self.run_greedy(warehouses, sorted_orders, feasibility, config)?;
        Ok((result, ledger, OptimizeMode::Greedy, false, None))
    }

    /// 在干净台账上执行贪心分配
    fn run_greedy(
        &self,
        warehouses: &[Warehouse],
        sorted_orders: &[Order],
        feasibility: &FeasibilityOutcome,
        config: &OptimizeConfig,
    ) -> EngineResult<(AllocationResult, CapacityLedger)> {
        let mut ledger = CapacityLedger::new(warehouses);
        let result =
            self.greedy
                .allocate(sorted_orders, feasibility, &mut ledger, config.allow_partial)?;
        Ok((result, ledger))
    }
}

// ==========================================
// Default trait 实现
// ==========================================
impl Default for OptimizeOrchestrator {
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
    use crate::domain::types::OrderStatus;

    const MUMBAI: (f64, f64) = (19.0760, 72.8777);
    const SINGAPORE: (f64, f64) = (1.3521, 103.8198);

    fn create_test_warehouse(
        warehouse_id: &str,
        coords: (f64, f64),
        stock: i64,
        storage_cost: f64,
    ) -> Warehouse {
        Warehouse {
            warehouse_id: warehouse_id.to_string(),
            name: format!("Warehouse {}", warehouse_id),
            location: "Test".to_string(),
            capacity: 50_000,
            current_stock: stock,
            storage_cost,
            latitude: coords.0,
            longitude: coords.1,
        }
    }

    fn create_test_order(
        order_id: &str,
        coords: (f64, f64),
        quantity: i64,
        deadline_day: u32,
    ) -> Order {
        Order {
            order_id: order_id.to_string(),
            order_date: NaiveDate::from_ymd_opt(2025, 3, 24).unwrap(),
            product_id: "P001".to_string(),
            quantity,
            delivery_deadline: NaiveDate::from_ymd_opt(2025, 3, deadline_day).unwrap(),
            status: OrderStatus::Pending,
            delivery_latitude: coords.0,
            delivery_longitude: coords.1,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 24).unwrap()
    }

    #[test]
    fn test_optimize_exact_mode_end_to_end() {
        let orchestrator = OptimizeOrchestrator::new();
        let warehouses = vec![
            create_test_warehouse("W001", MUMBAI, 7500, 1200.0),
            create_test_warehouse("W002", SINGAPORE, 12_000, 1500.0),
        ];
        let orders = vec![create_test_order("ORD001", MUMBAI, 500, 26)];
        let config = OptimizeConfig::default();

        let run = orchestrator
            .optimize(&warehouses, &orders, &config, today())
            .unwrap();

        assert_eq!(run.outcome.summary.mode_used, OptimizeMode::Exact);
        assert!(!run.outcome.summary.degraded);
        assert_eq!(run.outcome.allocations.len(), 1);
        assert_eq!(run.outcome.allocations[0].warehouse_id, "W001");
        assert!((run.outcome.summary.total_cost - 600_000.0).abs() < 1e-6);
        // 台账与分配一致
        assert_eq!(run.ledger.reserved("W001"), Some(500));
    }

    #[test]
    fn test_size_threshold_routes_to_greedy_without_degraded() {
        let orchestrator = OptimizeOrchestrator::new();
        let warehouses = vec![create_test_warehouse("W001", MUMBAI, 7500, 1200.0)];
        let orders = vec![
            create_test_order("ORD001", MUMBAI, 100, 26),
            create_test_order("ORD002", MUMBAI, 100, 27),
        ];
        let config = OptimizeConfig {
            exact_size_threshold: 1, // size = 1 × 2 = 2 > 1
            ..Default::default()
        };

        let run = orchestrator
            .optimize(&warehouses, &orders, &config, today())
            .unwrap();

        assert_eq!(run.outcome.summary.mode_requested, OptimizeMode::Exact);
        assert_eq!(run.outcome.summary.mode_used, OptimizeMode::Greedy);
        assert!(!run.outcome.summary.degraded);
        assert!(run
            .outcome
            .summary
            .fallback_reason
            .as_deref()
            .unwrap()
            .contains("EXACT_SIZE_THRESHOLD_EXCEEDED"));
    }

    #[test]
    fn test_full_only_requests_resolve_to_greedy() {
        let orchestrator = OptimizeOrchestrator::new();
        let warehouses = vec![create_test_warehouse("W001", MUMBAI, 300, 1200.0)];
        let orders = vec![create_test_order("ORD001", MUMBAI, 500, 26)];
        let config = OptimizeConfig {
            allow_partial: false,
            ..Default::default()
        };

        let run = orchestrator
            .optimize(&warehouses, &orders, &config, today())
            .unwrap();

        assert_eq!(run.outcome.summary.mode_used, OptimizeMode::Greedy);
        assert!(!run.outcome.summary.degraded);
        assert_eq!(run.outcome.unmet_orders.len(), 1);
        assert!(run.outcome.unmet_orders[0]
            .reason
            .as_deref()
            .unwrap()
            .contains("FULL_COVERAGE_UNAVAILABLE"));
        // 整单放弃不占用库存
        assert_eq!(run.ledger.total_reserved(), 0);
    }

    #[test]
    fn test_no_feasible_warehouse_yields_unmet_and_completes() {
        // Singapore 仓距 Mumbai 订单约 3900km,2 天截止无法到达
        let orchestrator = OptimizeOrchestrator::new();
        let warehouses = vec![create_test_warehouse("W002", SINGAPORE, 12_000, 1500.0)];
        let orders = vec![create_test_order("ORD001", MUMBAI, 500, 26)];
        let config = OptimizeConfig::default();

        let run = orchestrator
            .optimize(&warehouses, &orders, &config, today())
            .unwrap();

        assert!(run.outcome.allocations.is_empty());
        assert_eq!(run.outcome.unmet_orders.len(), 1);
        assert_eq!(run.outcome.unmet_orders[0].status, OrderStatus::Unmet);
        assert!(run.outcome.unmet_orders[0]
            .reason
            .as_deref()
            .unwrap()
            .contains("NO_FEASIBLE_WAREHOUSE"));
    }

    #[test]
    fn test_simulate_returns_same_shape() {
        let orchestrator = OptimizeOrchestrator::new();
        let warehouses = vec![create_test_warehouse("W001", MUMBAI, 7500, 1200.0)];
        let orders = vec![create_test_order("ORD001", MUMBAI, 500, 26)];
        let config = OptimizeConfig::default();

        let outcome = orchestrator
            .simulate(&warehouses, &orders, &config, today())
            .unwrap();
        assert_eq!(outcome.allocations.len(), 1);
        assert_eq!(outcome.summary.total_allocated, 500);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let orchestrator = OptimizeOrchestrator::new();
        let warehouses = vec![create_test_warehouse("W001", MUMBAI, 7500, 1200.0)];
        let orders = vec![create_test_order("ORD001", MUMBAI, 500, 26)];
        let config = OptimizeConfig {
            assumed_speed_km_per_day: -1.0,
            ..Default::default()
        };

        assert!(matches!(
            orchestrator.optimize(&warehouses, &orders, &config, today()),
            Err(EngineError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_determinism_across_runs() {
        let orchestrator = OptimizeOrchestrator::new();
        let warehouses = vec![
            create_test_warehouse("W001", MUMBAI, 900, 1100.0),
            create_test_warehouse("W002", SINGAPORE, 800, 900.0),
        ];
        let orders = vec![
            create_test_order("ORD001", MUMBAI, 600, 30),
            create_test_order("ORD002", SINGAPORE, 700, 30),
        ];
        let config = OptimizeConfig::default();

        let first = orchestrator
            .optimize(&warehouses, &orders, &config, today())
            .unwrap();
        let second = orchestrator
            .optimize(&warehouses, &orders, &config, today())
            .unwrap();

        assert_eq!(first.outcome.allocations, second.outcome.allocations);
        assert_eq!(
            first.outcome.summary.total_cost,
            second.outcome.summary.total_cost
        );
    }
}
