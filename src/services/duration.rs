//! 时长文本 - 服务层
//!
//! 解析自由格式的时长文本（"10분"、"1시간 30분"、"05:30"），
//! 并把总分钟数格式化回文本。

use once_cell::sync::Lazy;
use phf::phf_map;
use regex::Regex;

/// 每个单位对应的秒数
static UNIT_SECONDS: phf::Map<&'static str, u32> = phf_map! {
    "시간" => 3600,
    "분" => 60,
    "초" => 1,
    "h" => 3600,
    "hr" => 3600,
    "hrs" => 3600,
    "hour" => 3600,
    "hours" => 3600,
    "m" => 60,
    "min" => 60,
    "mins" => 60,
    "minute" => 60,
    "minutes" => 60,
    "s" => 1,
    "sec" => 1,
    "secs" => 1,
    "second" => 1,
    "seconds" => 1,
};

/// `MM:SS` 或 `H:MM:SS`
static CLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+):(\d{1,2})(?::(\d{1,2}))?\s*$").expect("valid clock regex"));

/// 数字加可选的单位
static COMPONENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*([^\d\s:,]+)?").expect("valid component regex"));

/// 把时长文本解析为秒数
///
/// # 返回
/// 空文本、`-`、没有可识别部分或数值溢出时返回 `None`
pub fn parse_seconds(label: &str) -> Option<u32> {
    let label = label.trim();
    if label.is_empty() || label == "-" {
        return None;
    }

    if let Some(caps) = CLOCK.captures(label) {
        let first: u32 = caps[1].parse().ok()?;
        let second: u32 = caps[2].parse().ok()?;
        return match caps.get(3) {
            Some(third) => {
                let third: u32 = third.as_str().parse().ok()?;
                first
                    .checked_mul(3600)?
                    .checked_add(second * 60)?
                    .checked_add(third)
            }
            None => first.checked_mul(60)?.checked_add(second),
        };
    }

    let components: Vec<(u32, Option<&str>)> = COMPONENT
        .captures_iter(label)
        .filter_map(|caps| {
            let value = caps[1].parse::<u32>().ok()?;
            Some((value, caps.get(2).map(|m| m.as_str())))
        })
        .collect();

    // 纯数字按分钟计
    if let [(value, None)] = components.as_slice() {
        return value.checked_mul(60);
    }

    let mut total = 0u32;
    let mut recognised = false;
    for (value, unit) in components {
        let Some(unit) = unit else { continue };
        if let Some(per_unit) = unit_seconds(unit) {
            total = total.saturating_add(value.saturating_mul(per_unit));
            recognised = true;
        }
    }

    recognised.then_some(total)
}

/// 把时长文本解析为分钟数（舍去秒）
pub fn parse_minutes(label: &str) -> Option<u32> {
    parse_seconds(label).map(|secs| secs / 60)
}

/// 把分钟数格式化为 `"X시간 Y분"`、`"X시간"` 或 `"Y분"`；0 为 `"0분"`
pub fn format_minutes(total_minutes: u32) -> String {
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    match (hours, minutes) {
        (0, m) => format!("{}분", m),
        (h, 0) => format!("{}시간", h),
        (h, m) => format!("{}시간 {}분", h, m),
    }
}

/// 韩文单位可能与后面的词连写（"분정도"）
const KOREAN_UNITS: [&str; 3] = ["시간", "분", "초"];

/// 单位精确匹配，或以韩文单位开头
fn unit_seconds(token: &str) -> Option<u32> {
    let token = token.to_lowercase();
    if let Some(&secs) = UNIT_SECONDS.get(token.as_str()) {
        return Some(secs);
    }
    KOREAN_UNITS
        .iter()
        .find(|unit| token.starts_with(**unit))
        .and_then(|unit| UNIT_SECONDS.get(*unit).copied())
}
