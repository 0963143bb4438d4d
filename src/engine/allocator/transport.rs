// ==========================================
// 仓储订单调配优化系统 - 运输问题精确求解器
// ==========================================
// 职责: 在可行候选边上求全局成本最优的供需匹配
// 建模: 最小费用最大流 (连续最短增广路, SPFA 残量网络)
//   源点 → 仓库(容量=剩余库存) → 订单(边权=单件成本) → 汇点(容量=需求)
// 超时: 每轮增广前检查截止时间,超时即放弃,由编排器回退贪心
// ==========================================

use crate::domain::allocation::Allocation;
use crate::domain::order::Order;
use crate::engine::allocator::{AllocationResult, OrderShortfall};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::feasibility::{CostedCandidate, FeasibilityOutcome};
use crate::engine::ledger::CapacityLedger;
use std::collections::{BTreeMap, VecDeque};
use std::time::Instant;
use tracing::instrument;

/// 浮点最短路松弛容差
const RELAX_EPS: f64 = 1e-9;

// ==========================================
// 残量网络
// ==========================================

#[derive(Debug, Clone)]
struct FlowEdge {
    to: usize,
    cap: i64, // 剩余容量（反向边初始为 0,承载已推流量）
    cost: f64,
}

/// 仓库→订单边的业务标注（流量提取时还原分配记录）
#[derive(Debug, Clone)]
struct EdgeMeta {
    order_idx: usize,
    candidate: CostedCandidate,
}

struct FlowNetwork {
    adjacency: Vec<Vec<usize>>,
    edges: Vec<FlowEdge>,
    meta: Vec<Option<EdgeMeta>>,
}

impl FlowNetwork {
    fn new(node_count: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); node_count],
            edges: Vec::new(),
            meta: Vec::new(),
        }
    }

    /// 添加一条有向边及其反向残量边,返回正向边索引
    fn add_edge(&mut self, from: usize, to: usize, cap: i64, cost: f64, meta: Option<EdgeMeta>) -> usize {
        let edge_id = self.edges.len();
        self.edges.push(FlowEdge { to, cap, cost });
        self.meta.push(meta);
        self.adjacency[from].push(edge_id);

        self.edges.push(FlowEdge {
            to: from,
            cap: 0,
            cost: -cost,
        });
        self.meta.push(None);
        self.adjacency[to].push(edge_id + 1);

        edge_id
    }

    /// 正向边当前已推流量
    fn flow(&self, edge_id: usize) -> i64 {
        self.edges[edge_id ^ 1].cap
    }
}

// ==========================================
// TransportSolver - 运输问题精确求解器
// ==========================================
pub struct TransportSolver {
    // 无状态引擎,不需要注入依赖
}

impl TransportSolver {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 精确求解供需匹配
    ///
    /// # 参数
    /// - `orders`: 已排序订单（仅决定节点编号,不影响最优性）
    /// - `feasibility`: 可行候选边集
    /// - `ledger`: 库存台账（仅在求解成功后整体写入预留）
    /// - `deadline`: 求解截止时间,None 表示不限时
    ///
    /// # 返回
    /// - `Ok(AllocationResult)`: 全局成本最优的分配方案
    /// - `Err(ExactSolveTimeout)`: 超时,台账保持未修改
    #[instrument(skip(self, orders, feasibility, ledger, deadline), fields(
        order_count = orders.len()
    ))]
    pub fn solve(
        &self,
        orders: &[Order],
        feasibility: &FeasibilityOutcome,
        ledger: &mut CapacityLedger,
        deadline: Option<Instant>,
    ) -> EngineResult<AllocationResult> {
        let started = Instant::now();

        // 仅含存在候选边的订单;不可行订单已在上游出局
        let solvable: Vec<&Order> = orders
            .iter()
            .filter(|o| !feasibility.candidates(&o.order_id).is_empty())
            .collect();

        if solvable.is_empty() {
            return Ok(AllocationResult::default());
        }

        // 仓库节点编号: BTreeMap 保证按 warehouse_id 升序,网络构建确定
        let mut warehouse_index: BTreeMap<String, usize> = BTreeMap::new();
        for order in &solvable {
            for candidate in feasibility.candidates(&order.order_id) {
                let next = warehouse_index.len();
                warehouse_index
                    .entry(candidate.warehouse_id.clone())
                    .or_insert(next);
            }
        }

        let warehouse_count = warehouse_index.len();
        let order_count = solvable.len();
        let source = 0usize;
        let warehouse_node = |w: usize| 1 + w;
        let order_node = |o: usize| 1 + warehouse_count + o;
        let sink = 1 + warehouse_count + order_count;

        let mut network = FlowNetwork::new(sink + 1);

        // 源点 → 仓库（容量 = 台账剩余库存）
        for (warehouse_id, &w_idx) in &warehouse_index {
            let supply = ledger.remaining(warehouse_id).ok_or_else(|| {
                EngineError::UnknownWarehouse(warehouse_id.clone())
            })?;
            network.add_edge(source, warehouse_node(w_idx), supply, 0.0, None);
        }

        // 仓库 → 订单（边权 = 单件综合成本）; 订单 → 汇点（容量 = 需求量）
        let mut demand_edges: Vec<usize> = Vec::with_capacity(order_count);
        for (o_idx, order) in solvable.iter().enumerate() {
            for candidate in feasibility.candidates(&order.order_id) {
                let w_idx = warehouse_index[&candidate.warehouse_id];
                network.add_edge(
                    warehouse_node(w_idx),
                    order_node(o_idx),
                    order.quantity,
                    candidate.unit_total_cost,
                    Some(EdgeMeta {
                        order_idx: o_idx,
                        candidate: candidate.clone(),
                    }),
                );
            }
            let demand_edge =
                network.add_edge(order_node(o_idx), sink, order.quantity, 0.0, None);
            demand_edges.push(demand_edge);
        }

        // 连续最短增广路主循环
        loop {
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    return Err(EngineError::ExactSolveTimeout {
                        elapsed_ms: started.elapsed().as_millis() as u64,
                    });
                }
            }
            if !self.augment_cheapest_path(&mut network, source, sink) {
                break;
            }
        }

        self.extract_result(&network, &solvable, &demand_edges, ledger)
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    /// 沿当前最短（最便宜）增广路推流一次
    ///
    /// # 返回
    /// - `true`: 推流成功,残量网络已更新
    /// - `false`: 汇点不可达,流量已饱和
    fn augment_cheapest_path(&self, network: &mut FlowNetwork, source: usize, sink: usize) -> bool {
        let node_count = network.adjacency.len();
        let mut dist = vec![f64::INFINITY; node_count];
        let mut prev_edge = vec![usize::MAX; node_count];
        let mut in_queue = vec![false; node_count];

        dist[source] = 0.0;
        let mut queue = VecDeque::new();
        queue.push_back(source);
        in_queue[source] = true;

        // SPFA: 残量网络含反向负权边,故不使用 Dijkstra
        while let Some(u) = queue.pop_front() {
            in_queue[u] = false;
            for &edge_id in &network.adjacency[u] {
                let edge = &network.edges[edge_id];
                if edge.cap <= 0 {
                    continue;
                }
                let relaxed = dist[u] + edge.cost;
                if relaxed + RELAX_EPS < dist[edge.to] {
                    dist[edge.to] = relaxed;
                    prev_edge[edge.to] = edge_id;
                    if !in_queue[edge.to] {
                        queue.push_back(edge.to);
                        in_queue[edge.to] = true;
                    }
                }
            }
        }

        if !dist[sink].is_finite() {
            return false;
        }

        // 回溯瓶颈容量
        let mut bottleneck = i64::MAX;
        let mut node = sink;
        while node != source {
            let edge_id = prev_edge[node];
            bottleneck = bottleneck.min(network.edges[edge_id].cap);
            node = network.edges[edge_id ^ 1].to;
        }

        // 推流
        let mut node = sink;
        while node != source {
            let edge_id = prev_edge[node];
            network.edges[edge_id].cap -= bottleneck;
            network.edges[edge_id ^ 1].cap += bottleneck;
            node = network.edges[edge_id ^ 1].to;
        }

        true
    }

    /// 从残量网络提取分配方案并写入台账
    fn extract_result(
        &self,
        network: &FlowNetwork,
        solvable: &[&Order],
        demand_edges: &[usize],
        ledger: &mut CapacityLedger,
    ) -> EngineResult<AllocationResult> {
        let mut result = AllocationResult::default();

        // 边按插入顺序遍历: 先按订单,再按候选优先序,输出确定
        for edge_id in 0..network.edges.len() {
            let meta = match &network.meta[edge_id] {
                Some(m) => m,
                None => continue,
            };
            let flow = network.flow(edge_id);
            if flow <= 0 {
                continue;
            }

            let order = solvable[meta.order_idx];
            let candidate = &meta.candidate;
            ledger.reserve(&candidate.warehouse_id, flow)?;

            let qty = flow as f64;
            let transport_cost = candidate.unit_transport_cost * qty;
            let storage_cost = candidate.unit_storage_cost * qty;
            result.allocations.push(Allocation {
                order_id: order.order_id.clone(),
                warehouse_id: candidate.warehouse_id.clone(),
                quantity: flow,
                distance_km: candidate.distance_km,
                transport_cost,
                storage_cost,
                total_cost: transport_cost + storage_cost,
            });
        }

        // 订单→汇点边的残量即未满足量
        for (o_idx, order) in solvable.iter().enumerate() {
            let unfilled = network.edges[demand_edges[o_idx]].cap;
            if unfilled > 0 {
                result.shortfalls.push(OrderShortfall {
                    order_id: order.order_id.clone(),
                    requested: order.quantity,
                    allocated: order.quantity - unfilled,
                    reason: format!(
                        "SUPPLY_EXHAUSTED: requested={}, allocated={}",
                        order.quantity,
                        order.quantity - unfilled
                    ),
                });
            }
        }

        Ok(result)
    }
}

// ==========================================
// Default trait 实现
// ==========================================
impl Default for TransportSolver {
    fn default() -> Self {
        Self::new()
    }
}
