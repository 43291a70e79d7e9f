use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 搜索结果页封套
///
/// `results` 中的记录按上游原样透传，未知字段不做增删
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub results: Vec<Value>,
    pub total_results: u64,
    pub page: u64,
    pub total_pages: u64,
    pub per_page: u64,
}

/// 演职员表分页封套
///
/// `cast` 与 `crew` 按同一窗口独立切片，`total_results` 为切片前两表之和
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditsPage {
    pub cast: Vec<Value>,
    pub crew: Vec<Value>,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
    pub total_results: u64,
}
