// ==========================================
// RDD 交期计算系统 - 计算 API
// ==========================================
// 职责: 计算入口 + 参考数据重载 + 计算记录
// 架构: API 层 → Engine (RddCalculator) / Loader / Repository
// 红线: 计算失败以结果内 error 表达; 只有边界校验失败/基础设施错误才返回 Err
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::app_settings::AppSettings;
use crate::config::config_manager::DEFAULT_CALCULATION_NAME_MAX_LEN;
use crate::domain::calculation::{CalculationInput, CalculationResult};
use crate::domain::record::{
    CalculationRecord, CalculationRecordRequest, RecordOutcome, RecordUser, ResultSummary,
    UsageDetails, UsageLog, ACTION_TYPE_CALCULATION,
};
use crate::domain::reference::ReferenceSnapshot;
use crate::engine::calculator::RddCalculator;
use crate::engine::formatting::format_date_for_copy;
use crate::i18n::{t_for, t_with_args};
use crate::loader::{LoadedSnapshot, ReferenceDataLoader};
use crate::repository::calculation_record_repo::CalculationRecordRepository;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use tracing::{info, instrument, warn};
use uuid::Uuid;

// ==========================================
// 响应类型
// ==========================================

/// 计算响应: 原始结果 + 本地化错误信息 + 复制格式日期
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResponse {
    #[serde(flatten)]
    pub result: CalculationResult,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error_message: Option<String>,
    pub rdd_copy: String,
}

/// 记录响应
///
/// ok = usage_logged && (!successful || calculation_saved)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordResponse {
    pub ok: bool,
    pub usage_logged: bool,
    pub calculation_saved: bool,
    pub usage_error: Option<String>,
    pub calculation_error: Option<String>,
}

/// 重载结果摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadSummary {
    pub weights: usize,
    pub distances: usize,
    pub times: usize,
    pub holidays: usize,
    pub peak_seasons: usize,
    pub error_findings: usize,
    pub warning_findings: usize,
}

// ==========================================
// CalculatorApi
// ==========================================
pub struct CalculatorApi {
    calculator: RwLock<RddCalculator>,
    loader: Arc<ReferenceDataLoader>,
    record_repo: Arc<CalculationRecordRepository>,
    settings: AppSettings,
    name_max_len: usize,
}

impl CalculatorApi {
    /// 创建计算 API（参考数据未加载,需调用 reload_reference_data）
    ///
    /// # 参数
    /// - loader: 参考数据加载器
    /// - record_repo: 计算记录仓储
    /// - settings: 界面设置（提供错误信息语言）
    pub fn new(
        loader: Arc<ReferenceDataLoader>,
        record_repo: Arc<CalculationRecordRepository>,
        settings: AppSettings,
    ) -> Self {
        Self {
            calculator: RwLock::new(RddCalculator::new()),
            loader,
            record_repo,
            settings,
            name_max_len: DEFAULT_CALCULATION_NAME_MAX_LEN,
        }
    }

    pub fn with_name_max_len(mut self, name_max_len: usize) -> Self {
        self.name_max_len = name_max_len.max(1);
        self
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// 当前计算器副本（共享同一快照）
    fn calculator(&self) -> ApiResult<RddCalculator> {
        self.calculator
            .read()
            .map(|c| c.clone())
            .map_err(|e| ApiError::InternalError(format!("计算器锁获取失败: {}", e)))
    }

    /// 直接安装快照（测试与离线场景）
    pub fn install_snapshot(&self, snapshot: Arc<ReferenceSnapshot>) -> ApiResult<()> {
        let mut guard = self
            .calculator
            .write()
            .map_err(|e| ApiError::InternalError(format!("计算器锁获取失败: {}", e)))?;
        *guard = RddCalculator::with_snapshot(snapshot);
        Ok(())
    }

    /// 是否已加载参考数据
    pub fn is_loaded(&self) -> ApiResult<bool> {
        Ok(self.calculator()?.is_loaded())
    }

    // ==========================================
    // 参考数据
    // ==========================================

    /// 重新加载参考数据（超时 + 重试）
    ///
    /// 失败时保留旧快照
    #[instrument(skip(self))]
    pub async fn reload_reference_data(&self) -> ApiResult<ReloadSummary> {
        let LoadedSnapshot { snapshot, report } = self.loader.load().await?;

        let summary = ReloadSummary {
            weights: snapshot.weights.len(),
            distances: snapshot.distances.len(),
            times: snapshot.times.len(),
            holidays: snapshot.holidays.len(),
            peak_seasons: snapshot.peak_seasons.len(),
            error_findings: report.error_count(),
            warning_findings: report.warning_count(),
        };

        self.install_snapshot(snapshot)?;
        info!(?summary, "参考数据已重载");
        Ok(summary)
    }

    // ==========================================
    // 计算
    // ==========================================

    /// 计算 RDD
    pub fn calculate(
        &self,
        weight: f64,
        distance: f64,
        load_date: NaiveDate,
    ) -> ApiResult<CalculationResponse> {
        let result = self.calculator()?.calculate(weight, distance, load_date);
        Ok(self.to_response(result))
    }

    /// 计算 RDD（输入对象）
    pub fn calculate_input(&self, input: &CalculationInput) -> ApiResult<CalculationResponse> {
        self.calculate(input.weight, input.distance, input.load_date)
    }

    fn to_response(&self, result: CalculationResult) -> CalculationResponse {
        let (error_code, error_message) = match result.error {
            Some(e) => (
                Some(e.code().to_string()),
                Some(t_for(&self.settings.locale, e.message_key())),
            ),
            None => (None, None),
        };
        CalculationResponse {
            rdd_copy: format_date_for_copy(result.rdd),
            result,
            error_code,
            error_message,
        }
    }

    // ==========================================
    // 记录
    // ==========================================

    fn invalid_input(&self, reason: &str) -> ApiError {
        ApiError::ValidationError(t_with_args(
            &self.settings.locale,
            "record.invalid_input",
            &[("reason", reason)],
        ))
    }

    /// 边界校验并规范化记录请求
    ///
    /// - weight/distance 必须为有限数
    /// - 名称 trim 后截断到最大长度（按字符）,空名称视为未命名
    pub fn validate_record_request(
        &self,
        mut request: CalculationRecordRequest,
    ) -> ApiResult<CalculationRecordRequest> {
        if !request.input.weight.is_finite() || !request.input.distance.is_finite() {
            return Err(self.invalid_input("weight/distance"));
        }

        request.calculation_name = request.calculation_name.and_then(|name| {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.chars().take(self.name_max_len).collect())
            }
        });

        if let Some(user) = &request.user {
            if user.id.trim().is_empty() {
                return Err(self.invalid_input("user.id"));
            }
        }

        Ok(request)
    }

    /// 记录一次计算尝试
    ///
    /// 每次尝试写一条使用日志; 成功的计算另写一条计算记录。
    /// 两次写入互不影响,各自的错误放在响应里。
    #[instrument(skip(self, request))]
    pub fn record_calculation(&self, request: CalculationRecordRequest) -> ApiResult<RecordResponse> {
        let request = self.validate_record_request(request)?;
        let successful = request.outcome.is_success();
        let user_id = request.user.as_ref().map(|u| u.id.clone());
        let now = Local::now().naive_local();

        let details = UsageDetails {
            authenticated: request.user.is_some(),
            user_email: request.user.as_ref().and_then(|u| u.email.clone()),
            successful,
            name: request.calculation_name.clone(),
            input_data: request.input.clone(),
            result_summary: ResultSummary::from(&request.outcome),
        };
        let details = serde_json::to_value(&details)
            .map_err(|e| ApiError::InternalError(format!("使用日志序列化失败: {}", e)))?;

        let usage_log = UsageLog {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.clone(),
            action_type: ACTION_TYPE_CALCULATION.to_string(),
            details,
            created_at: now,
        };

        let usage_error = match self.record_repo.insert_usage_log(&usage_log) {
            Ok(()) => None,
            Err(e) => {
                warn!(error = %e, "使用日志写入失败");
                Some(e.to_string())
            }
        };

        let mut calculation_saved = false;
        let mut calculation_error = None;
        if let RecordOutcome::Success(result_data) = request.outcome {
            let record = CalculationRecord {
                id: Uuid::new_v4().to_string(),
                user_id,
                name: request.calculation_name,
                input_data: request.input,
                result_data,
                created_at: now,
            };
            match self.record_repo.insert_calculation(&record) {
                Ok(()) => calculation_saved = true,
                Err(e) => {
                    warn!(error = %e, "计算记录保存失败");
                    calculation_error = Some(e.to_string());
                }
            }
        }

        let usage_logged = usage_error.is_none();
        Ok(RecordResponse {
            ok: usage_logged && (!successful || calculation_saved),
            usage_logged,
            calculation_saved,
            usage_error,
            calculation_error,
        })
    }

    /// 记录一次计算尝试（JSON 载荷）
    ///
    /// 畸形载荷直接拒绝,不做字段置空
    pub fn record_calculation_json(&self, payload: &str) -> ApiResult<RecordResponse> {
        let request: CalculationRecordRequest = serde_json::from_str(payload)
            .map_err(|e| self.invalid_input(&e.to_string()))?;
        self.record_calculation(request)
    }

    /// 计算并记录
    pub fn calculate_and_record(
        &self,
        input: CalculationInput,
        name: Option<String>,
        user: Option<RecordUser>,
    ) -> ApiResult<(CalculationResponse, RecordResponse)> {
        let response = self.calculate_input(&input)?;
        let mut request = CalculationRecordRequest::new(input, &response.result);
        request.calculation_name = name;
        request.user = user;
        let recorded = self.record_calculation(request)?;
        Ok((response, recorded))
    }
}
