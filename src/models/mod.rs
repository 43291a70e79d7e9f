// 数据模型
//
// 网关的领域模型，包括：
// - 过滤条件与媒体类型
// - 分页请求与本地分页窗口
// - 响应封套
// - 参数校验

pub mod filters;
pub mod pagination;
pub mod results;
pub mod validation;

pub use filters::{ActorFilters, MediaFilters, MediaType};
pub use pagination::{PageRequest, PageWindow};
pub use results::{CreditsPage, SearchPage};
pub use validation::{FieldParser, StringValidator, ValidationError};
