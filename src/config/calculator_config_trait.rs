// ==========================================
// RDD 交期计算系统 - 计算配置读取 Trait
// ==========================================
// 职责: 定义计算器/加载器/界面所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::app_settings::AppSettings;
use crate::domain::types::ThemeMode;
use crate::loader::LoaderPolicy;
use async_trait::async_trait;
use std::error::Error;

pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// CalculatorConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
// 约定: 配置缺失或格式错误时返回默认值,不返回错误
#[async_trait]
pub trait CalculatorConfigReader: Send + Sync {
    // ===== 数据加载 =====

    /// 加载失败后的最大重试次数
    ///
    /// # 默认值
    /// - 3
    async fn get_loader_max_retries(&self) -> ConfigResult<u32>;

    /// 重试基础等待（毫秒）,第 n 次重试等待 base * (n + 1)
    ///
    /// # 默认值
    /// - 300
    async fn get_loader_retry_base_ms(&self) -> ConfigResult<u64>;

    /// 单次加载超时（毫秒）
    ///
    /// # 默认值
    /// - 12000
    async fn get_loader_timeout_ms(&self) -> ConfigResult<u64>;

    /// 组合为加载策略
    async fn get_loader_policy(&self) -> ConfigResult<LoaderPolicy> {
        Ok(LoaderPolicy {
            max_retries: self.get_loader_max_retries().await?,
            retry_base_ms: self.get_loader_retry_base_ms().await?,
            timeout_ms: self.get_loader_timeout_ms().await?,
        })
    }

    // ===== 计算记录 =====

    /// 计算名称最大长度（字符数）
    ///
    /// # 默认值
    /// - 120
    async fn get_calculation_name_max_len(&self) -> ConfigResult<usize>;

    // ===== 界面设置 =====

    async fn get_locale(&self) -> ConfigResult<String>;

    async fn get_theme_mode(&self) -> ConfigResult<ThemeMode>;

    async fn get_sound_enabled(&self) -> ConfigResult<bool>;

    async fn get_animation_enabled(&self) -> ConfigResult<bool>;

    /// 组合为界面设置值
    async fn get_app_settings(&self) -> ConfigResult<AppSettings> {
        Ok(AppSettings {
            theme_mode: self.get_theme_mode().await?,
            sound_enabled: self.get_sound_enabled().await?,
            animation_enabled: self.get_animation_enabled().await?,
            locale: self.get_locale().await?,
        })
    }
}
