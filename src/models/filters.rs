use serde_json::Value;

use crate::models::validation::{FieldParser, StringValidator, ValidationError};

/// 出生年份过滤的下限
const MIN_BIRTH_YEAR: i64 = 1800;
/// 上映年份过滤的下限
const MIN_RELEASE_YEAR: i64 = 1900;

/// 媒体类型，决定上游资源路径（/search/movie、/tv/{id}/credits 等）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    /// 解析可选的 type 参数，缺省为 movie
    pub fn parse(raw: Option<&str>) -> Result<Self, ValidationError> {
        match raw {
            Some(value) => value.parse(),
            None => Ok(MediaType::Movie),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MediaType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(MediaType::Movie),
            "tv" => Ok(MediaType::Tv),
            other => Err(ValidationError::InvalidMediaType(other.to_string())),
        }
    }
}

/// 演员搜索过滤条件
///
/// 缺省字段不参与过滤，也不会被默认值填充。
/// min_popularity 和 gender 由上游执行，出生年份区间只能本地后置过滤
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActorFilters {
    pub min_popularity: Option<f64>,
    pub gender: Option<u8>,
    pub birth_year_from: Option<i64>,
    pub birth_year_to: Option<i64>,
}

impl ActorFilters {
    /// 逐字段解析并校验原始过滤参数
    pub fn parse(
        min_popularity: Option<&str>,
        gender: Option<&str>,
        birth_year_from: Option<&str>,
        birth_year_to: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let min_popularity = match min_popularity {
            Some(raw) => {
                let value = FieldParser::parse_number("min_popularity", raw)?;
                if value < 0.0 {
                    return Err(ValidationError::InvalidPopularity(value));
                }
                Some(value)
            }
            None => None,
        };

        let gender = match gender {
            Some(raw) => {
                let value = FieldParser::parse_integer("gender", raw)?;
                if !(0..=3).contains(&value) {
                    return Err(ValidationError::InvalidGender(value));
                }
                Some(value as u8)
            }
            None => None,
        };

        let birth_year_from = Self::parse_birth_year("birth_year_from", birth_year_from)?;
        let birth_year_to = Self::parse_birth_year("birth_year_to", birth_year_to)?;

        Ok(Self {
            min_popularity,
            gender,
            birth_year_from,
            birth_year_to,
        })
    }

    fn parse_birth_year(
        field: &'static str,
        raw: Option<&str>,
    ) -> Result<Option<i64>, ValidationError> {
        match raw {
            Some(value) => {
                let year = FieldParser::parse_integer(field, value)?;
                if year < MIN_BIRTH_YEAR {
                    return Err(ValidationError::InvalidBirthYear(field, year));
                }
                Ok(Some(year))
            }
            None => Ok(None),
        }
    }

    /// 把上游支持的过滤条件翻译成查询参数
    pub fn upstream_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if let Some(popularity) = self.min_popularity {
            params.push(("vote_average.gte".to_string(), popularity.to_string()));
        }
        if let Some(gender) = self.gender {
            params.push(("with_gender".to_string(), gender.to_string()));
        }

        params
    }

    /// 是否存在需要本地后置过滤的出生年份区间
    pub fn has_birth_year_bounds(&self) -> bool {
        self.birth_year_from.is_some() || self.birth_year_to.is_some()
    }

    /// 出生年份后置过滤判定
    ///
    /// birthday 形如 "YYYY-MM-DD"，取 '-' 分割后的首段为年份。
    /// 缺失、为 null、为空串或无法解析的生日一律保留
    pub fn birth_year_allows(&self, record: &Value) -> bool {
        let birthday = match record.get("birthday").and_then(Value::as_str) {
            Some(value) if !value.is_empty() => value,
            _ => return true,
        };

        let year = match birthday.split('-').next().and_then(|y| y.parse::<i64>().ok()) {
            Some(year) => year,
            None => return true,
        };

        if let Some(from) = self.birth_year_from {
            if year < from {
                return false;
            }
        }
        if let Some(to) = self.birth_year_to {
            if year > to {
                return false;
            }
        }

        true
    }

    /// 缓存键片段，区分"缺省"与"显式零值"
    pub fn cache_key(&self) -> String {
        let mut parts = Vec::new();

        if let Some(value) = self.min_popularity {
            parts.push(format!("mp={}", value));
        }
        if let Some(value) = self.gender {
            parts.push(format!("g={}", value));
        }
        if let Some(value) = self.birth_year_from {
            parts.push(format!("from={}", value));
        }
        if let Some(value) = self.birth_year_to {
            parts.push(format!("to={}", value));
        }

        if parts.is_empty() {
            "none".to_string()
        } else {
            parts.join(":")
        }
    }
}

/// 媒体搜索过滤条件，全部由上游执行
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaFilters {
    pub year: Option<i64>,
    pub genre_id: Option<i64>,
    pub min_rating: Option<f64>,
    pub language: Option<String>,
}

impl MediaFilters {
    /// 逐字段解析并校验原始过滤参数
    pub fn parse(
        year: Option<&str>,
        genre_id: Option<&str>,
        min_rating: Option<&str>,
        language: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let year = match year {
            Some(raw) => {
                let value = FieldParser::parse_integer("year", raw)?;
                if value < MIN_RELEASE_YEAR {
                    return Err(ValidationError::InvalidYear(value));
                }
                Some(value)
            }
            None => None,
        };

        let genre_id = match genre_id {
            Some(raw) => {
                let value = FieldParser::parse_integer("genre_id", raw)?;
                if value < 1 {
                    return Err(ValidationError::InvalidGenreId(value));
                }
                Some(value)
            }
            None => None,
        };

        let min_rating = match min_rating {
            Some(raw) => {
                let value = FieldParser::parse_number("min_rating", raw)?;
                if !(0.0..=10.0).contains(&value) {
                    return Err(ValidationError::InvalidRating(value));
                }
                Some(value)
            }
            None => None,
        };

        let language = match language {
            Some(raw) => Some(StringValidator::validate_language(raw)?),
            None => None,
        };

        Ok(Self {
            year,
            genre_id,
            min_rating,
            language,
        })
    }

    /// 把过滤条件翻译成上游查询参数（无本地后置过滤）
    pub fn upstream_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if let Some(year) = self.year {
            params.push(("year".to_string(), year.to_string()));
        }
        if let Some(genre_id) = self.genre_id {
            params.push(("with_genres".to_string(), genre_id.to_string()));
        }
        if let Some(rating) = self.min_rating {
            params.push(("vote_average.gte".to_string(), rating.to_string()));
        }
        if let Some(language) = &self.language {
            params.push(("language".to_string(), language.clone()));
        }

        params
    }

    /// 缓存键片段，区分"缺省"与"显式零值"
    pub fn cache_key(&self) -> String {
        let mut parts = Vec::new();

        if let Some(value) = self.year {
            parts.push(format!("y={}", value));
        }
        if let Some(value) = self.genre_id {
            parts.push(format!("genre={}", value));
        }
        if let Some(value) = self.min_rating {
            parts.push(format!("rating={}", value));
        }
        if let Some(value) = &self.language {
            parts.push(format!("lang={}", value));
        }

        if parts.is_empty() {
            "none".to_string()
        } else {
            parts.join(":")
        }
    }
}
