// src/core/enums.rs

use serde::{Deserialize, Serialize};
use strum::Display;

/// 通知类型
/// 同时支持：
/// 1. JSON 序列化 (Serde) - 前端根据类型选择样式
/// 2. 字符串转换 (Strum) - 日志输出，与 JSON 中的写法一致
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}
