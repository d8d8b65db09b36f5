// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持英文（默认）和中文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// 计算路径一律显式传入 locale,不修改全局语言
// ==========================================

/// 获取当前全局语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置全局语言（仅供 CLI 启动期使用）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 是否为已提供翻译的语言
pub fn is_supported_locale(locale: &str) -> bool {
    rust_i18n::available_locales!().iter().any(|l| *l == locale)
}

/// 翻译消息（全局语言,无参数）
///
/// # 示例
/// ```no_run
/// use rdd_calculator::i18n::t;
/// let msg = t("common.success");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（指定语言）
///
/// # 示例
/// ```no_run
/// use rdd_calculator::i18n::t_for;
/// let msg = t_for("zh-CN", "calc.error.out_of_range");
/// ```
pub fn t_for(locale: &str, key: &str) -> String {
    rust_i18n::t!(key, locale = locale).to_string()
}

/// 翻译消息（指定语言,带参数）
///
/// 占位符格式为 `%{name}`
pub fn t_with_args(locale: &str, key: &str, args: &[(&str, &str)]) -> String {
    let mut result = t_for(locale, key);
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}
