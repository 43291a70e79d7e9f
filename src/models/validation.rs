use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// 校验错误类型
///
/// 每个变体携带面向客户端的完整错误消息，
/// 统一由 ApiError 转换成 400 响应
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Query parameter is required")]
    MissingQuery,

    #[error("Query is too long (max 100 characters)")]
    QueryTooLong,

    #[error("Page number must be greater than 0")]
    InvalidPage,

    #[error("Per page must be between 1 and 100")]
    InvalidPerPage,

    #[error("Invalid {0}: must be an integer")]
    NotAnInteger(&'static str),

    #[error("Invalid {0}: must be a number")]
    NotANumber(&'static str),

    #[error("Invalid min_popularity: {0} (must be at least 0.0)")]
    InvalidPopularity(f64),

    #[error("Invalid gender: {0} (must be one of 0, 1, 2, 3)")]
    InvalidGender(i64),

    #[error("Invalid {0}: {1} (must be 1800 or later)")]
    InvalidBirthYear(&'static str, i64),

    #[error("Invalid year: {0} (must be 1900 or later)")]
    InvalidYear(i64),

    #[error("Invalid genre_id: {0} (must be a positive integer)")]
    InvalidGenreId(i64),

    #[error("Invalid min_rating: {0} (must be between 0.0 and 10.0)")]
    InvalidRating(f64),

    #[error("Invalid language code: {0} (must be ISO 639-1 format)")]
    InvalidLanguageCode(String),

    #[error("Invalid media type: {0} (must be 'movie' or 'tv')")]
    InvalidMediaType(String),

    #[error("Invalid {0}: must be a positive integer")]
    InvalidResourceId(&'static str),
}

/// 原始字段解析工具
///
/// 查询参数一律以字符串进入网关，这里统一解析成类型化的值。
/// 值存在但解析失败必须报错，而不是退回默认值
pub struct FieldParser;

impl FieldParser {
    pub fn parse_integer(field: &'static str, raw: &str) -> Result<i64, ValidationError> {
        raw.trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::NotAnInteger(field))
    }

    pub fn parse_number(field: &'static str, raw: &str) -> Result<f64, ValidationError> {
        let value = raw
            .trim()
            .parse::<f64>()
            .map_err(|_| ValidationError::NotANumber(field))?;

        // NaN/inf 能通过 f64 解析，但对过滤阈值没有意义
        if !value.is_finite() {
            return Err(ValidationError::NotANumber(field));
        }

        Ok(value)
    }
}

/// 字符串字段校验工具
pub struct StringValidator;

impl StringValidator {
    /// 校验必填的搜索关键词（1~100 个字符）
    pub fn validate_query(raw: Option<&str>) -> Result<String, ValidationError> {
        let query = match raw {
            Some(q) if !q.is_empty() => q,
            _ => return Err(ValidationError::MissingQuery),
        };

        if query.chars().count() > 100 {
            return Err(ValidationError::QueryTooLong);
        }

        Ok(query.to_string())
    }

    /// 校验 ISO 639-1 两位字母语言代码
    pub fn validate_language(raw: &str) -> Result<String, ValidationError> {
        // 使用静态正则表达式，避免重复编译
        static LANGUAGE_REGEX: OnceLock<Regex> = OnceLock::new();

        let regex = LANGUAGE_REGEX.get_or_init(|| {
            Regex::new(r"^[a-zA-Z]{2}$").expect("语言代码正则表达式编译失败")
        });

        if !regex.is_match(raw) {
            return Err(ValidationError::InvalidLanguageCode(raw.to_string()));
        }

        Ok(raw.to_string())
    }
}
