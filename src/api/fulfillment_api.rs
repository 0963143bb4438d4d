// ==========================================
// 仓储订单调配优化系统 - 履约调配 API
// ==========================================
// 职责: 展示层唯一入口,串联 导入 → 仓储 → 引擎 → 提交
// 架构: API 层 → Engine 层 (OptimizeOrchestrator) → Repository 层
// 求解在阻塞线程池执行,不饿死异步调用方
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, OptimizeConfig};
use crate::domain::order::Order;
use crate::domain::product::Product;
use crate::domain::report::OptimizeOutcome;
use crate::domain::warehouse::Warehouse;
use crate::engine::orchestrator::OptimizeOrchestrator;
use crate::importer::{CsvImporter, ImportOutcome};
use crate::repository::InventoryRepository;
use chrono::NaiveDate;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

// ==========================================
// FulfillmentApi - 履约调配 API
// ==========================================
pub struct FulfillmentApi {
    repo: Arc<InventoryRepository>,
    config_manager: Arc<ConfigManager>,
    orchestrator: Arc<OptimizeOrchestrator>,
}

impl FulfillmentApi {
    /// 创建新的 FulfillmentApi 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（库存 + 配置共用）
    pub fn new(db_path: &str) -> ApiResult<Self> {
        let repo = Arc::new(InventoryRepository::new(db_path)?);
        let config_manager = Arc::new(
            ConfigManager::from_connection(repo.connection())
                .map_err(|e| ApiError::Config(e.to_string()))?,
        );

        Ok(Self {
            repo,
            config_manager,
            orchestrator: Arc::new(OptimizeOrchestrator::new()),
        })
    }

    // ==========================================
    // 数据导入
    // ==========================================

    /// 导入仓库文件并写入库存仓储
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn import_warehouse_file(
        &self,
        path: &Path,
    ) -> ApiResult<ImportOutcome<Warehouse>> {
        let path = path.to_path_buf();
        let outcome = tokio::task::spawn_blocking(move || {
            CsvImporter::new().import_warehouses(&path)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("导入任务失败: {}", e)))??;

        self.repo.upsert_warehouses(&outcome.accepted)?;
        info!(
            accepted = outcome.batch.accepted_rows,
            rejected = outcome.batch.rejected_rows,
            "仓库数据已入库"
        );
        Ok(outcome)
    }

    /// 加载订单文件（不落库,订单属于单轮求解输入）
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn load_order_file(&self, path: &Path) -> ApiResult<ImportOutcome<Order>> {
        let path = path.to_path_buf();
        let outcome =
            tokio::task::spawn_blocking(move || CsvImporter::new().import_orders(&path))
                .await
                .map_err(|e| ApiError::Internal(format!("导入任务失败: {}", e)))??;
        Ok(outcome)
    }

    /// 加载产品文件（补货提醒输入）
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn load_product_file(&self, path: &Path) -> ApiResult<ImportOutcome<Product>> {
        let path = path.to_path_buf();
        let outcome =
            tokio::task::spawn_blocking(move || CsvImporter::new().import_products(&path))
                .await
                .map_err(|e| ApiError::Internal(format!("导入任务失败: {}", e)))??;
        Ok(outcome)
    }

    // ==========================================
    // 求解入口
    // ==========================================

    /// 执行求解并提交库存预留（commit 模式）
    pub async fn run_optimization(
        &self,
        orders: Vec<Order>,
        config: Option<OptimizeConfig>,
        today: NaiveDate,
    ) -> ApiResult<OptimizeOutcome> {
        self.execute(orders, config, today, true).await
    }

    /// 模拟求解: 产出同样的报表,不提交库存变更（simulate 模式）
    pub async fn simulate_optimization(
        &self,
        orders: Vec<Order>,
        config: Option<OptimizeConfig>,
        today: NaiveDate,
    ) -> ApiResult<OptimizeOutcome> {
        self.execute(orders, config, today, false).await
    }

    /// 求解执行体
    #[instrument(skip(self, orders, config), fields(order_count = orders.len(), commit))]
    async fn execute(
        &self,
        orders: Vec<Order>,
        config: Option<OptimizeConfig>,
        today: NaiveDate,
        commit: bool,
    ) -> ApiResult<OptimizeOutcome> {
        if orders.is_empty() {
            return Err(ApiError::InvalidInput("订单列表为空".to_string()));
        }

        let config = self.resolve_config(config)?;
        let warehouses = self.repo.load_warehouses()?;
        if warehouses.is_empty() {
            return Err(ApiError::InvalidInput(
                "仓库清单为空，请先导入仓库数据".to_string(),
            ));
        }

        let orchestrator = self.orchestrator.clone();
        let run = tokio::task::spawn_blocking(move || {
            orchestrator.optimize(&warehouses, &orders, &config, today)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("求解任务失败: {}", e)))??;

        if commit {
            self.repo.commit_reservations(&run.ledger)?;
            info!(
                run_id = %run.outcome.summary.run_id,
                committed = run.ledger.reservations().len(),
                "求解结果已提交库存"
            );
        }
        Ok(run.outcome)
    }

    // ==========================================
    // 查询与配置
    // ==========================================

    /// 当前库存清单
    pub fn list_inventory(&self) -> ApiResult<Vec<Warehouse>> {
        Ok(self.repo.load_warehouses()?)
    }

    /// 装载持久化求解参数
    pub fn load_config(&self) -> ApiResult<OptimizeConfig> {
        self.config_manager
            .load_optimize_config()
            .map_err(|e| ApiError::Config(e.to_string()))
    }

    /// 保存求解参数
    pub fn save_config(&self, config: &OptimizeConfig) -> ApiResult<()> {
        config.validate()?;
        self.config_manager
            .save_optimize_config(config)
            .map_err(|e| ApiError::Config(e.to_string()))
    }

    /// 调用方未指定参数时回落到持久化配置
    fn resolve_config(&self, config: Option<OptimizeConfig>) -> ApiResult<OptimizeConfig> {
        match config {
            Some(config) => Ok(config),
            None => self.load_config(),
        }
    }
}
