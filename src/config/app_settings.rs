// ==========================================
// RDD 交期计算系统 - 界面设置
// ==========================================
// 启动时由 ConfigManager 构建一次,按引用注入需要的组件
// ==========================================

use crate::domain::types::ThemeMode;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LOCALE: &str = "en";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub theme_mode: ThemeMode,
    pub sound_enabled: bool,
    pub animation_enabled: bool,
    pub locale: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme_mode: ThemeMode::default(),
            sound_enabled: true,
            animation_enabled: true,
            locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

impl AppSettings {
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn with_theme_mode(mut self, theme_mode: ThemeMode) -> Self {
        self.theme_mode = theme_mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = AppSettings::default();
        assert_eq!(s.theme_mode, ThemeMode::Minecraft);
        assert!(s.sound_enabled);
        assert!(s.animation_enabled);
        assert_eq!(s.locale, "en");
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(AppSettings::default().with_theme_mode(ThemeMode::Fallout))
            .unwrap();
        assert_eq!(json["themeMode"], "fallout");
        assert_eq!(json["soundEnabled"], true);
    }
}
