// ==========================================
// RDD 交期计算系统 - 领域类型定义
// ==========================================
// 职责: 季节状态、计算错误、界面主题、参考数据表类型
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 季节状态 (Season Status)
// ==========================================
// 仅用于展示,不参与日期计算
// 序列化格式与历史记录一致: "Peak Season" / "Non-Peak"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeasonStatus {
    #[serde(rename = "Peak Season")]
    PeakSeason, // 旺季
    #[serde(rename = "Non-Peak")]
    NonPeak, // 非旺季
}

impl fmt::Display for SeasonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeasonStatus::PeakSeason => write!(f, "Peak Season"),
            SeasonStatus::NonPeak => write!(f, "Non-Peak"),
        }
    }
}

impl SeasonStatus {
    /// 从字符串解析季节状态（兼容展示文本与代码）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().replace(['-', '_'], " ").as_str() {
            "PEAK SEASON" | "PEAK" => Some(SeasonStatus::PeakSeason),
            "NON PEAK" => Some(SeasonStatus::NonPeak),
            _ => None,
        }
    }
}

// ==========================================
// 计算错误 (Calculation Error)
// ==========================================
// 红线: 核心计算从不抛错,错误以结果字段承载
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalculationError {
    OutOfRange,           // 重量或距离不在任何区间内
    ConfigurationMissing, // 区间组合存在,但未配置运输天数
    DataNotLoaded,        // 参考数据快照未加载
}

impl fmt::Display for CalculationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.default_message())
    }
}

impl CalculationError {
    /// 稳定错误代码（用于持久化与前端映射）
    pub fn code(&self) -> &'static str {
        match self {
            CalculationError::OutOfRange => "OUT_OF_RANGE",
            CalculationError::ConfigurationMissing => "CONFIGURATION_MISSING",
            CalculationError::DataNotLoaded => "DATA_NOT_LOADED",
        }
    }

    /// 国际化消息键
    pub fn message_key(&self) -> &'static str {
        match self {
            CalculationError::OutOfRange => "calc.error.out_of_range",
            CalculationError::ConfigurationMissing => "calc.error.configuration_missing",
            CalculationError::DataNotLoaded => "calc.error.data_not_loaded",
        }
    }

    /// 默认英文消息（与历史记录中的 error 文本一致）
    pub fn default_message(&self) -> &'static str {
        match self {
            CalculationError::OutOfRange => "Out of range",
            CalculationError::ConfigurationMissing => "Transit time configuration missing",
            CalculationError::DataNotLoaded => "Data not loaded",
        }
    }

    /// 从错误代码或历史英文消息解析
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        [
            CalculationError::OutOfRange,
            CalculationError::ConfigurationMissing,
            CalculationError::DataNotLoaded,
        ]
        .into_iter()
        .find(|e| {
            e.code().eq_ignore_ascii_case(trimmed)
                || e.default_message().eq_ignore_ascii_case(trimmed)
        })
    }
}

// ==========================================
// 界面主题 (Theme Mode)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Minecraft,
    Fallout,
    Chicago95,
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl ThemeMode {
    /// 从字符串解析主题（未知值返回 None）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "minecraft" => Some(ThemeMode::Minecraft),
            "fallout" => Some(ThemeMode::Fallout),
            "chicago95" => Some(ThemeMode::Chicago95),
            _ => None,
        }
    }

    /// 转换为配置存储字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ThemeMode::Minecraft => "minecraft",
            ThemeMode::Fallout => "fallout",
            ThemeMode::Chicago95 => "chicago95",
        }
    }
}

// ==========================================
// 参考数据表 (Reference Table)
// ==========================================
// 用于导入与管理命令的表选择
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceTable {
    Weights,
    Distances,
    Times,
    Holidays,
    PeakSeasons,
}

impl fmt::Display for ReferenceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_table())
    }
}

impl ReferenceTable {
    /// 从命令行/接口参数解析（同时接受数据库表名）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "weights" | "transit_weights" => Some(ReferenceTable::Weights),
            "distances" | "transit_distances" => Some(ReferenceTable::Distances),
            "times" | "transit_times" => Some(ReferenceTable::Times),
            "holidays" | "federal_holidays" => Some(ReferenceTable::Holidays),
            "peak_seasons" | "seasons" => Some(ReferenceTable::PeakSeasons),
            _ => None,
        }
    }

    /// 对应的数据库表名
    pub fn to_db_table(&self) -> &'static str {
        match self {
            ReferenceTable::Weights => "transit_weights",
            ReferenceTable::Distances => "transit_distances",
            ReferenceTable::Times => "transit_times",
            ReferenceTable::Holidays => "federal_holidays",
            ReferenceTable::PeakSeasons => "peak_seasons",
        }
    }
}
