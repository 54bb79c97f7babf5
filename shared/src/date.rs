//! 时间类型模块
//!
//! - `Timestamp`: 毫秒时间戳，用于令牌过期判断
//! - 日期展示辅助函数（pt-BR 格式）

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::ops::Add;
use std::time::Duration;

// =========================================================
// Timestamp
// =========================================================

/// 毫秒时间戳
///
/// 内部存储为 `i64`，表示自 Unix 纪元以来的毫秒数
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    #[inline]
    pub const fn new(ms: i64) -> Self {
        Self(ms)
    }

    /// 从秒创建（JWT 的 `exp` 声明以秒为单位）
    #[inline]
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs.saturating_mul(1000))
    }

    #[inline]
    pub const fn as_millis(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn as_secs(&self) -> i64 {
        self.0 / 1000
    }
}

impl From<i64> for Timestamp {
    fn from(ms: i64) -> Self {
        Self(ms)
    }
}

impl Add<Duration> for Timestamp {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        Self(self.0 + rhs.as_millis() as i64)
    }
}

// =========================================================
// 展示辅助
// =========================================================

/// 以 `dd/mm/aaaa` 格式显示日期
pub fn format_date(value: &NaiveDateTime) -> String {
    value.format("%d/%m/%Y").to_string()
}

/// 以 `dd/mm/aaaa hh:mm` 格式显示日期时间
pub fn format_date_time(value: &NaiveDateTime) -> String {
    value.format("%d/%m/%Y %H:%M").to_string()
}

/// 解析 `<input type="date">` 的值（`aaaa-mm-dd`），取当天结束时刻作为过期时间
///
/// 空字符串或无法解析时返回 `None`。
pub fn parse_date_input(value: &str) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()?;
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59)?;
    Some(date.and_time(end_of_day))
}
