// ==========================================
// RDD 交期计算系统 - 参考数据加载器
// ==========================================
// 职责: 从数据源获取参考数据快照（超时 + 重试）,并做加载期校验
// 策略: 每次尝试受 timeout_ms 限制; 失败后等待 retry_base_ms * (n + 1) 再试
// 红线: 校验结果只记录日志,不阻止加载
// ==========================================

use crate::domain::reference::ReferenceSnapshot;
use crate::engine::validator::{FindingSeverity, ReferenceValidator, ValidationReport};
use crate::repository::reference_repo::ReferenceDataRepository;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

// ==========================================
// ReferenceDataSource - 数据源抽象
// ==========================================
#[async_trait]
pub trait ReferenceDataSource: Send + Sync {
    /// 获取完整参考数据快照
    async fn fetch_snapshot(&self) -> anyhow::Result<ReferenceSnapshot>;
}

#[async_trait]
impl ReferenceDataSource for ReferenceDataRepository {
    async fn fetch_snapshot(&self) -> anyhow::Result<ReferenceSnapshot> {
        Ok(self.load_snapshot()?)
    }
}

// ==========================================
// LoaderPolicy - 重试策略
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderPolicy {
    pub max_retries: u32,    // 首次失败后的最大重试次数
    pub retry_base_ms: u64,  // 第 n 次重试前等待 retry_base_ms * (n + 1)
    pub timeout_ms: u64,     // 单次尝试超时
}

impl Default for LoaderPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_base_ms: 300,
            timeout_ms: 12_000,
        }
    }
}

impl LoaderPolicy {
    /// 第 attempt 次失败后的等待时长（attempt 从 0 开始）
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_base_ms.saturating_mul(u64::from(attempt) + 1))
    }
}

// ==========================================
// LoaderError - 加载错误
// ==========================================
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("参考数据加载超时 ({timeout_ms}ms)")]
    Timeout { timeout_ms: u64 },

    #[error("参考数据加载失败,已尝试 {attempts} 次: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    #[error("数据源错误: {0}")]
    Source(#[from] anyhow::Error),
}

// ==========================================
// LoadedSnapshot - 加载结果
// ==========================================
/// 快照与加载期校验报告（每次加载只校验一次）
#[derive(Debug, Clone)]
pub struct LoadedSnapshot {
    pub snapshot: Arc<ReferenceSnapshot>,
    pub report: ValidationReport,
}

// ==========================================
// ReferenceDataLoader - 加载器
// ==========================================
pub struct ReferenceDataLoader {
    source: Arc<dyn ReferenceDataSource>,
    policy: LoaderPolicy,
    validator: ReferenceValidator,
}

impl ReferenceDataLoader {
    pub fn new(source: Arc<dyn ReferenceDataSource>, policy: LoaderPolicy) -> Self {
        Self {
            source,
            policy,
            validator: ReferenceValidator::default(),
        }
    }

    pub fn with_validator(mut self, validator: ReferenceValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn policy(&self) -> &LoaderPolicy {
        &self.policy
    }

    /// 单次尝试（受超时限制）
    async fn attempt(&self) -> Result<ReferenceSnapshot, LoaderError> {
        let timeout = Duration::from_millis(self.policy.timeout_ms);
        match tokio::time::timeout(timeout, self.source.fetch_snapshot()).await {
            Ok(result) => result.map_err(LoaderError::Source),
            Err(_) => Err(LoaderError::Timeout {
                timeout_ms: self.policy.timeout_ms,
            }),
        }
    }

    /// 加载快照
    ///
    /// # 返回
    /// - `Ok(LoadedSnapshot)`: 快照可直接交给计算器共享,附带校验报告
    /// - `Err(RetriesExhausted)`: 全部尝试失败
    #[instrument(skip(self), fields(max_retries = self.policy.max_retries))]
    pub async fn load(&self) -> Result<LoadedSnapshot, LoaderError> {
        let total_attempts = self.policy.max_retries + 1;
        let mut last_error = String::new();

        for attempt in 0..total_attempts {
            match self.attempt().await {
                Ok(snapshot) => {
                    info!(
                        attempt = attempt + 1,
                        weights = snapshot.weights.len(),
                        distances = snapshot.distances.len(),
                        times = snapshot.times.len(),
                        holidays = snapshot.holidays.len(),
                        peak_seasons = snapshot.peak_seasons.len(),
                        "参考数据加载完成"
                    );
                    let report = self.validate_and_log(&snapshot);
                    return Ok(LoadedSnapshot {
                        snapshot: Arc::new(snapshot),
                        report,
                    });
                }
                Err(e) => {
                    last_error = e.to_string();
                    if attempt + 1 < total_attempts {
                        let delay = self.policy.retry_delay(attempt);
                        warn!(
                            attempt = attempt + 1,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            "参考数据加载失败,准备重试"
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        error!(attempts = total_attempts, error = %last_error, "参考数据加载最终失败");
        Err(LoaderError::RetriesExhausted {
            attempts: total_attempts,
            last_error,
        })
    }

    /// 校验快照并记录发现
    fn validate_and_log(&self, snapshot: &ReferenceSnapshot) -> ValidationReport {
        if snapshot.is_empty() {
            warn!("参考数据为空,所有计算将返回超出范围");
        }
        let report = self.validator.validate(snapshot);
        for finding in &report.findings {
            match finding.severity {
                FindingSeverity::Error => {
                    warn!(code = %finding.code, severity = %finding.severity, "{}", finding.message)
                }
                FindingSeverity::Warning => {
                    info!(code = %finding.code, severity = %finding.severity, "{}", finding.message)
                }
            }
        }
        report
    }
}
