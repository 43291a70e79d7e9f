// TMDb 网关库
//
// 本库提供 TMDb 查询网关的核心功能，包括：
// - API 路由与限流
// - 上游 TMDb 客户端
// - 过滤与本地分页归一化
// - 响应缓存
// - 请求参数校验

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod api;
pub mod external;
pub mod models;
