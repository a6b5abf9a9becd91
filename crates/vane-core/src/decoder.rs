use std::str::FromStr;
use std::time::Duration;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::Num;
use thiserror::Error;

use crate::value::{RawValue, TypeTag};

/// 文本解码失败。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum DecodeError {
    #[error("'{text}' is not a valid {type_name}")]
    Malformed {
        type_name: &'static str,
        text: String,
    },
    #[error("no decoder available for type {type_name}")]
    Unsupported { type_name: &'static str },
}

impl DecodeError {
    pub(crate) fn malformed(target: TypeTag, text: &str) -> Self {
        Self::Malformed {
            type_name: target.name(),
            text: text.to_owned(),
        }
    }
}

/// 可插拔的“文本 → 目标类型”解码器。
///
/// ### 设计目的（Why）
/// - 配置源多以文本存储，具体如何把文本变成业务类型属于策略问题，需要允许调用方替换；
/// - 以 [`TypeTag`] 作为唯一分派键，避免运行时反射。
///
/// ### 契约说明（What）
/// - **输入**：`target` 为调用方请求的类型标签，`text` 为已完成插值的文本；
/// - **输出**：与 `target` 对应变体的 [`RawValue`]；返回其它变体时核心层会再按数值转换规则尝试一次，
///   仍不匹配则视为解码失败；
/// - **错误**：字面量非法返回 [`DecodeError::Malformed`]，不支持的类型返回 [`DecodeError::Unsupported`]。
///
/// ### 线程安全
/// - 解码器可能被多个线程同时调用，实现必须 `Send + Sync` 且不依赖调用顺序。
pub trait Decoder: Send + Sync {
    fn decode(&self, target: TypeTag, text: &str) -> Result<RawValue, DecodeError>;
}

/// 内置解码器，覆盖封闭类型集合中的全部标签（`Native` 除外）。
///
/// - 布尔：`true/yes/on` 与 `false/no/off`，大小写不敏感；
/// - 整数：十进制，或带 `0x` 前缀的十六进制，可带符号；超出目标宽度视为非法字面量；
/// - 浮点、任意精度整数与小数：标准十进制表示；
/// - 时间间隔：ISO-8601 `PnDTnHnMnS`，或 `<n>ms|s|m|h|d` 简写。
///
/// 数值类字面量会先去除首尾空白。
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultDecoder;

impl Decoder for DefaultDecoder {
    fn decode(&self, target: TypeTag, text: &str) -> Result<RawValue, DecodeError> {
        let malformed = || DecodeError::malformed(target, text);
        match target {
            TypeTag::Text => Ok(RawValue::Text(text.to_owned())),
            TypeTag::Boolean => parse_bool(text)
                .map(RawValue::Boolean)
                .ok_or_else(malformed),
            TypeTag::Byte => parse_integral(text).map(RawValue::Byte).ok_or_else(malformed),
            TypeTag::Short => parse_integral(text)
                .map(RawValue::Short)
                .ok_or_else(malformed),
            TypeTag::Integer => parse_integral(text)
                .map(RawValue::Integer)
                .ok_or_else(malformed),
            TypeTag::Long => parse_integral(text).map(RawValue::Long).ok_or_else(malformed),
            TypeTag::Float => text
                .trim()
                .parse::<f32>()
                .map(RawValue::Float)
                .map_err(|_| malformed()),
            TypeTag::Double => text
                .trim()
                .parse::<f64>()
                .map(RawValue::Double)
                .map_err(|_| malformed()),
            TypeTag::BigInteger => parse_big_integer(text)
                .map(RawValue::BigInteger)
                .ok_or_else(malformed),
            TypeTag::BigDecimal => BigDecimal::from_str(text.trim())
                .map(RawValue::BigDecimal)
                .map_err(|_| malformed()),
            TypeTag::Duration => parse_duration(text)
                .map(RawValue::Duration)
                .ok_or_else(malformed),
            TypeTag::Native(type_name) => Err(DecodeError::Unsupported { type_name }),
        }
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    let trimmed = text.trim();
    if ["true", "yes", "on"]
        .iter()
        .any(|word| trimmed.eq_ignore_ascii_case(word))
    {
        Some(true)
    } else if ["false", "no", "off"]
        .iter()
        .any(|word| trimmed.eq_ignore_ascii_case(word))
    {
        Some(false)
    } else {
        None
    }
}

/// 拆出符号位与 `0x` 前缀，返回 `(是否为负, 数字部分, 进制)`。
fn split_sign_and_radix(text: &str) -> Option<(bool, &str, u32)> {
    let trimmed = text.trim();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let (digits, radix) = match unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        Some(hex) => (hex, 16),
        None => (unsigned, 10),
    };
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }
    Some((negative, digits, radix))
}

fn parse_integral<T>(text: &str) -> Option<T>
where
    T: TryFrom<i128>,
{
    let (negative, digits, radix) = split_sign_and_radix(text)?;
    let magnitude = i128::from_str_radix(digits, radix).ok()?;
    let value = if negative { -magnitude } else { magnitude };
    T::try_from(value).ok()
}

fn parse_big_integer(text: &str) -> Option<BigInt> {
    let (negative, digits, radix) = split_sign_and_radix(text)?;
    let magnitude = BigInt::from_str_radix(digits, radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

pub(crate) fn parse_duration(text: &str) -> Option<Duration> {
    let trimmed = text.trim();
    match trimmed.strip_prefix(['P', 'p']) {
        Some(rest) => parse_iso_duration(rest),
        None => parse_unit_duration(trimmed),
    }
}

fn parse_iso_duration(rest: &str) -> Option<Duration> {
    let (date, time) = match rest.split_once(['T', 't']) {
        Some((date, time)) => (date, Some(time)),
        None => (rest, None),
    };
    if date.is_empty() && time.is_none_or(str::is_empty) {
        return None;
    }

    let mut total = Duration::ZERO;
    if !date.is_empty() {
        let days = date.strip_suffix(['D', 'd'])?.parse::<u64>().ok()?;
        total = total.checked_add(Duration::from_secs(days.checked_mul(86_400)?))?;
    }

    let mut remaining = time.unwrap_or_default();
    while !remaining.is_empty() {
        let unit_at = remaining.find(|c: char| c.is_ascii_alphabetic())?;
        let (number, tail) = remaining.split_at(unit_at);
        let mut chars = tail.chars();
        let unit = chars.next()?;
        remaining = chars.as_str();
        let component = match unit.to_ascii_uppercase() {
            'H' => Duration::from_secs(number.parse::<u64>().ok()?.checked_mul(3_600)?),
            'M' => Duration::from_secs(number.parse::<u64>().ok()?.checked_mul(60)?),
            'S' => Duration::try_from_secs_f64(number.parse::<f64>().ok()?).ok()?,
            _ => return None,
        };
        total = total.checked_add(component)?;
    }
    Some(total)
}

fn parse_unit_duration(text: &str) -> Option<Duration> {
    let unit_at = text.find(|c: char| !c.is_ascii_digit())?;
    let (number, unit) = text.split_at(unit_at);
    let amount = number.parse::<u64>().ok()?;
    match unit.trim() {
        "ms" => Some(Duration::from_millis(amount)),
        "s" => Some(Duration::from_secs(amount)),
        "m" => Some(Duration::from_secs(amount.checked_mul(60)?)),
        "h" => Some(Duration::from_secs(amount.checked_mul(3_600)?)),
        "d" => Some(Duration::from_secs(amount.checked_mul(86_400)?)),
        _ => None,
    }
}
