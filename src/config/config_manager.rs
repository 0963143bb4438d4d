// ==========================================
// 仓储订单调配优化系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::optimize_profile::OptimizeConfig;
use crate::db::open_sqlite_connection;
use crate::domain::types::OptimizeMode;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// 配置键全集
// ==========================================
pub mod config_keys {
    pub const RATE_PER_UNIT_DISTANCE: &str = "optimize/rate_per_unit_distance";
    pub const ASSUMED_SPEED_KM_PER_DAY: &str = "optimize/assumed_speed_km_per_day";
    pub const MODE: &str = "optimize/mode";
    pub const EXACT_SIZE_THRESHOLD: &str = "optimize/exact_size_threshold";
    pub const EXACT_TIMEOUT_MS: &str = "optimize/exact_timeout_ms";
    pub const ALLOW_PARTIAL: &str = "optimize/allow_partial";
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        let manager = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        manager.init_schema()?;
        Ok(manager)
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        let manager = Self { conn };
        manager.init_schema()?;
        Ok(manager)
    }

    /// 初始化 config_kv 表（幂等）
    fn init_schema(&self) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS config_kv (
                scope_id TEXT NOT NULL,
                key      TEXT NOT NULL,
                value    TEXT NOT NULL,
                PRIMARY KEY (scope_id, key)
            );",
        )?;
        Ok(())
    }

    // ==========================================
    // 基础读写（scope_id='global'）
    // ==========================================

    /// 读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入（覆盖）配置值
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT (scope_id, key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    /// 读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    // ==========================================
    // 求解参数装载
    // ==========================================

    /// 装载求解参数（缺失/非法的键回落到默认值）
    pub fn load_optimize_config(&self) -> Result<OptimizeConfig, Box<dyn Error>> {
        let defaults = OptimizeConfig::default();

        let rate = self
            .get_config_or_default(
                config_keys::RATE_PER_UNIT_DISTANCE,
                &defaults.rate_per_unit_distance.to_string(),
            )?
            .parse::<f64>()
            .unwrap_or(defaults.rate_per_unit_distance);

        let speed = self
            .get_config_or_default(
                config_keys::ASSUMED_SPEED_KM_PER_DAY,
                &defaults.assumed_speed_km_per_day.to_string(),
            )?
            .parse::<f64>()
            .unwrap_or(defaults.assumed_speed_km_per_day);

        let mode = self
            .get_config_value(config_keys::MODE)?
            .and_then(|raw| OptimizeMode::parse(&raw))
            .unwrap_or(defaults.mode);

        let exact_size_threshold = self
            .get_config_or_default(
                config_keys::EXACT_SIZE_THRESHOLD,
                &defaults.exact_size_threshold.to_string(),
            )?
            .parse::<usize>()
            .unwrap_or(defaults.exact_size_threshold);

        let exact_timeout_ms = self
            .get_config_or_default(
                config_keys::EXACT_TIMEOUT_MS,
                &defaults.exact_timeout_ms.to_string(),
            )?
            .parse::<u64>()
            .unwrap_or(defaults.exact_timeout_ms);

        let allow_partial = self
            .get_config_or_default(config_keys::ALLOW_PARTIAL, &defaults.allow_partial.to_string())?
            .parse::<bool>()
            .unwrap_or(defaults.allow_partial);

        Ok(OptimizeConfig {
            rate_per_unit_distance: rate,
            assumed_speed_km_per_day: speed,
            mode,
            exact_size_threshold,
            exact_timeout_ms,
            allow_partial,
        })
    }

    /// 保存求解参数
    pub fn save_optimize_config(&self, config: &OptimizeConfig) -> Result<(), Box<dyn Error>> {
        self.set_config_value(
            config_keys::RATE_PER_UNIT_DISTANCE,
            &config.rate_per_unit_distance.to_string(),
        )?;
        self.set_config_value(
            config_keys::ASSUMED_SPEED_KM_PER_DAY,
            &config.assumed_speed_km_per_day.to_string(),
        )?;
        self.set_config_value(config_keys::MODE, &config.mode.to_string())?;
        self.set_config_value(
            config_keys::EXACT_SIZE_THRESHOLD,
            &config.exact_size_threshold.to_string(),
        )?;
        self.set_config_value(
            config_keys::EXACT_TIMEOUT_MS,
            &config.exact_timeout_ms.to_string(),
        )?;
        self.set_config_value(config_keys::ALLOW_PARTIAL, &config.allow_partial.to_string())?;
        Ok(())
    }
}
