// ==========================================
// RDD 交期计算系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::app_settings::{AppSettings, DEFAULT_LOCALE};
use crate::config::calculator_config_trait::{CalculatorConfigReader, ConfigResult};
use crate::db::open_sqlite_connection;
use crate::domain::types::ThemeMode;
use crate::i18n::is_supported_locale;
use crate::loader::LoaderPolicy;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// 计算名称默认最大长度
pub const DEFAULT_CALCULATION_NAME_MAX_LEN: usize = 120;

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
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        crate::db::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 会对传入连接再次应用统一 PRAGMA（幂等）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 读取配置值,不存在时返回默认值
    pub fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 写入配置值（global scope,存在则覆盖）
    pub fn set_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 获取所有配置的快照（JSON格式,键有序）
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    /// 从配置快照恢复配置
    ///
    /// # 返回
    /// - Ok(usize): 恢复的配置项数量
    ///
    /// # 注意
    /// - 覆盖现有的 global 配置; 任一项失败则整体回滚
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> ConfigResult<usize> {
        let config_map: BTreeMap<String, String> = serde_json::from_str(snapshot_json)?;

        let mut conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let tx = conn.transaction()?;

        let mut count = 0;
        for (key, value) in config_map.iter() {
            let affected = tx.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
                 ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
                params![key, value],
            )?;
            count += affected;
        }

        tx.commit()?;
        Ok(count)
    }

    /// 读取并解析配置,缺失或格式错误时返回默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> ConfigResult<T>
    where
        T: FromStr + Copy + std::fmt::Debug,
    {
        match self.get_config_value(key)? {
            None => Ok(default),
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    warn!(key, value = %raw, default = ?default, "配置值格式错误,使用默认值");
                    Ok(default)
                }
            },
        }
    }

    // ===== 同步组合读取（启动期使用） =====

    /// 读取加载策略
    pub fn loader_policy(&self) -> ConfigResult<LoaderPolicy> {
        let defaults = LoaderPolicy::default();
        Ok(LoaderPolicy {
            max_retries: self
                .get_parsed_or_default(config_keys::LOADER_MAX_RETRIES, defaults.max_retries)?,
            retry_base_ms: self
                .get_parsed_or_default(config_keys::LOADER_RETRY_BASE_MS, defaults.retry_base_ms)?,
            timeout_ms: self
                .get_parsed_or_default(config_keys::LOADER_TIMEOUT_MS, defaults.timeout_ms)?,
        })
    }

    /// 读取计算名称最大长度（0 视为无效）
    pub fn calculation_name_max_len(&self) -> ConfigResult<usize> {
        let v = self.get_parsed_or_default(
            config_keys::CALCULATION_NAME_MAX_LEN,
            DEFAULT_CALCULATION_NAME_MAX_LEN,
        )?;
        if v == 0 {
            warn!("calculation_name_max_len 不能为 0,使用默认值");
            return Ok(DEFAULT_CALCULATION_NAME_MAX_LEN);
        }
        Ok(v)
    }

    fn locale(&self) -> ConfigResult<String> {
        let value = self.get_config_or_default(config_keys::LOCALE, DEFAULT_LOCALE)?;
        let value = value.trim().to_string();
        if is_supported_locale(&value) {
            Ok(value)
        } else {
            warn!(locale = %value, "不支持的语言,使用默认值");
            Ok(DEFAULT_LOCALE.to_string())
        }
    }

    fn theme_mode(&self) -> ConfigResult<ThemeMode> {
        let value = self.get_config_or_default(config_keys::THEME_MODE, "minecraft")?;
        match ThemeMode::parse(&value) {
            Some(mode) => Ok(mode),
            None => {
                warn!(theme_mode = %value, "未知主题,使用默认值");
                Ok(ThemeMode::default())
            }
        }
    }

    /// 构建界面设置
    pub fn load_app_settings(&self) -> ConfigResult<AppSettings> {
        Ok(AppSettings {
            theme_mode: self.theme_mode()?,
            sound_enabled: self.get_parsed_or_default(config_keys::SOUND_ENABLED, true)?,
            animation_enabled: self.get_parsed_or_default(config_keys::ANIMATION_ENABLED, true)?,
            locale: self.locale()?,
        })
    }

    /// 保存界面设置
    pub fn save_app_settings(&self, settings: &AppSettings) -> ConfigResult<()> {
        self.set_config_value(config_keys::THEME_MODE, settings.theme_mode.to_db_str())?;
        self.set_config_value(config_keys::SOUND_ENABLED, &settings.sound_enabled.to_string())?;
        self.set_config_value(
            config_keys::ANIMATION_ENABLED,
            &settings.animation_enabled.to_string(),
        )?;
        self.set_config_value(config_keys::LOCALE, &settings.locale)?;
        Ok(())
    }
}

// ==========================================
// CalculatorConfigReader Trait 实现
// ==========================================
#[async_trait]
impl CalculatorConfigReader for ConfigManager {
    async fn get_loader_max_retries(&self) -> ConfigResult<u32> {
        self.get_parsed_or_default(config_keys::LOADER_MAX_RETRIES, 3)
    }

    async fn get_loader_retry_base_ms(&self) -> ConfigResult<u64> {
        self.get_parsed_or_default(config_keys::LOADER_RETRY_BASE_MS, 300)
    }

    async fn get_loader_timeout_ms(&self) -> ConfigResult<u64> {
        self.get_parsed_or_default(config_keys::LOADER_TIMEOUT_MS, 12_000)
    }

    async fn get_calculation_name_max_len(&self) -> ConfigResult<usize> {
        self.calculation_name_max_len()
    }

    async fn get_locale(&self) -> ConfigResult<String> {
        self.locale()
    }

    async fn get_theme_mode(&self) -> ConfigResult<ThemeMode> {
        self.theme_mode()
    }

    async fn get_sound_enabled(&self) -> ConfigResult<bool> {
        self.get_parsed_or_default(config_keys::SOUND_ENABLED, true)
    }

    async fn get_animation_enabled(&self) -> ConfigResult<bool> {
        self.get_parsed_or_default(config_keys::ANIMATION_ENABLED, true)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 数据加载
    pub const LOADER_MAX_RETRIES: &str = "loader_max_retries";
    pub const LOADER_RETRY_BASE_MS: &str = "loader_retry_base_ms";
    pub const LOADER_TIMEOUT_MS: &str = "loader_timeout_ms";

    // 计算记录
    pub const CALCULATION_NAME_MAX_LEN: &str = "calculation_name_max_len";

    // 界面
    pub const LOCALE: &str = "locale";
    pub const THEME_MODE: &str = "theme_mode";
    pub const SOUND_ENABLED: &str = "sound_enabled";
    pub const ANIMATION_ENABLED: &str = "animation_enabled";
}
