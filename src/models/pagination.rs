use crate::models::validation::{FieldParser, ValidationError};

/// 默认页码
pub const DEFAULT_PAGE: u64 = 1;
/// 默认每页条数
pub const DEFAULT_PER_PAGE: u64 = 20;
/// 每页条数上限
pub const MAX_PER_PAGE: u64 = 100;

/// 已通过校验的分页请求
///
/// `page` 从 1 开始，`per_page` 在 [1, 100] 区间内。
/// 上游未分页的列表（如 combined_credits）使用 `window()` 在本地切页
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    /// 从原始查询串解析分页参数，缺省时使用默认值
    pub fn parse(page: Option<&str>, per_page: Option<&str>) -> Result<Self, ValidationError> {
        let page = match page {
            Some(raw) => {
                let value = FieldParser::parse_integer("page", raw)?;
                if value < 1 {
                    return Err(ValidationError::InvalidPage);
                }
                value as u64
            }
            None => DEFAULT_PAGE,
        };

        let per_page = match per_page {
            Some(raw) => {
                let value = FieldParser::parse_integer("per_page", raw)?;
                if value < 1 || value > MAX_PER_PAGE as i64 {
                    return Err(ValidationError::InvalidPerPage);
                }
                value as u64
            }
            None => DEFAULT_PER_PAGE,
        };

        Ok(Self { page, per_page })
    }

    /// 本地分页窗口：start = (page-1)*per_page, end = start+per_page
    pub fn window(&self) -> PageWindow {
        let start = self.page.saturating_sub(1).saturating_mul(self.per_page);
        let end = start.saturating_add(self.per_page);

        PageWindow {
            start: usize::try_from(start).unwrap_or(usize::MAX),
            end: usize::try_from(end).unwrap_or(usize::MAX),
        }
    }

    /// 按合并后的总条数计算总页数（向上取整）
    pub fn total_pages(&self, total_results: u64) -> u64 {
        (total_results + self.per_page - 1) / self.per_page
    }
}

/// 半开区间 [start, end)，用于从未分页列表中切出一页
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub start: usize,
    pub end: usize,
}

impl PageWindow {
    /// 切出窗口覆盖的元素；start 越界时返回空页，不报错
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        if self.start >= items.len() {
            return &[];
        }
        &items[self.start..self.end.min(items.len())]
    }
}
