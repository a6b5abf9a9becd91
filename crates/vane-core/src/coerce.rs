//! # coerce 模块说明
//!
//! ## 角色定位（Why）
//! - 把原始存储返回的未类型化值转换为调用方请求的类型，是整个配置核心的“读取主干”；
//! - 全部类型化读取方法（`get_long`、`get_string`、`get_list` 等）都是同一个泛型算法的实例化，
//!   不允许各自实现一套规则。
//!
//! ## 转换算法（How）
//! 1. 读取原始值；缺失时若提供默认值则返回默认值（文本默认值先插值），否则报告“未找到”；
//! 2. 文本值：插值后交给解码器，任一步失败都报告携带键名与原始字面量的解析错误；
//! 3. 非文本值与目标类型完全匹配：原样返回；
//! 4. 目标为文本：使用规范渲染（浮点保留一位小数）；
//! 5. 数值到数值：按 C 系强制转换规则宽化或窄化，不做溢出检查；
//! 6. 其余情况报告类型不匹配。
//!
//! ## 扩展点（What）
//! - 业务类型实现 [`PropertyType`] 即可被 `get::<T>` 读取；存放原生对象的存储可借助
//!   [`native_from_raw`] 完成下转型，文本来源则需要配合自定义解码器处理 `TypeTag::Native`。

use std::time::Duration;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use tracing::{debug, trace};

use crate::config::Config;
use crate::decoder::DecodeError;
use crate::error::{PropertyError, ResolutionError};
use crate::keys::KeysWithPrefix;
use crate::value::{NativeValue, RawValue, TypeTag};
use crate::visitor::ConfigVisitor;

/// 可以从属性空间读取的目标类型。
///
/// # 契约说明（What）
/// - `type_tag`：交给解码器的类型标签；
/// - `from_raw`：按转换规则把非文本原始值（或解码器产出的值）转换为 `Self`，无法转换时返回 `None`；
/// - `resolve_default`：键缺失时对调用方默认值的处理，缺省原样返回；文本类型会对默认值插值。
pub trait PropertyType: Sized + 'static {
    fn type_tag() -> TypeTag;

    fn from_raw(raw: &RawValue) -> Option<Self>;

    fn resolve_default<C>(self, config: &C, key: &str) -> Result<Self, PropertyError>
    where
        C: Config + ?Sized,
    {
        let _ = (config, key);
        Ok(self)
    }
}

macro_rules! numeric_property_type {
    ($($ty:ty => $variant:ident, $convert:ident;)*) => {
        $(
            impl PropertyType for $ty {
                fn type_tag() -> TypeTag {
                    TypeTag::$variant
                }

                fn from_raw(raw: &RawValue) -> Option<Self> {
                    match raw {
                        RawValue::$variant(value) => Some(*value),
                        other => other.numeric().map(|numeric| numeric.$convert()),
                    }
                }
            }
        )*
    };
}

numeric_property_type! {
    i8 => Byte, byte_value;
    i16 => Short, short_value;
    i32 => Integer, int_value;
    i64 => Long, long_value;
    f32 => Float, float_value;
    f64 => Double, double_value;
}

impl PropertyType for BigInt {
    fn type_tag() -> TypeTag {
        TypeTag::BigInteger
    }

    fn from_raw(raw: &RawValue) -> Option<Self> {
        match raw {
            RawValue::BigInteger(value) => Some(value.clone()),
            other => other.numeric().and_then(|numeric| numeric.big_integer()),
        }
    }
}

impl PropertyType for BigDecimal {
    fn type_tag() -> TypeTag {
        TypeTag::BigDecimal
    }

    fn from_raw(raw: &RawValue) -> Option<Self> {
        match raw {
            RawValue::BigDecimal(value) => Some(value.clone()),
            other => other.numeric().and_then(|numeric| numeric.big_decimal()),
        }
    }
}

impl PropertyType for bool {
    fn type_tag() -> TypeTag {
        TypeTag::Boolean
    }

    fn from_raw(raw: &RawValue) -> Option<Self> {
        match raw {
            RawValue::Boolean(value) => Some(*value),
            _ => None,
        }
    }
}

impl PropertyType for Duration {
    fn type_tag() -> TypeTag {
        TypeTag::Duration
    }

    fn from_raw(raw: &RawValue) -> Option<Self> {
        match raw {
            RawValue::Duration(value) => Some(*value),
            _ => None,
        }
    }
}

impl PropertyType for String {
    fn type_tag() -> TypeTag {
        TypeTag::Text
    }

    fn from_raw(raw: &RawValue) -> Option<Self> {
        Some(raw.to_string())
    }

    fn resolve_default<C>(self, config: &C, key: &str) -> Result<Self, PropertyError>
    where
        C: Config + ?Sized,
    {
        config.resolve(&self).map_err(|cause| PropertyError::Parse {
            key: key.to_owned(),
            value: self,
            cause: cause.into(),
        })
    }
}

/// 从 `Native` 原始值中取出 `T` 的副本；类型不符或不是原生值时返回 `None`。
pub fn native_from_raw<T>(raw: &RawValue) -> Option<T>
where
    T: NativeValue + Clone,
{
    match raw {
        RawValue::Native(value) => NativeValue::as_any(&**value).downcast_ref::<T>().cloned(),
        _ => None,
    }
}

/// 把已插值的文本交给解码器，并把结果转换为 `T`。
fn decode_as<C, T>(config: &C, text: &str) -> Result<T, ResolutionError>
where
    C: Config + ?Sized,
    T: PropertyType,
{
    let tag = T::type_tag();
    let decoded = config.decoder().decode(tag, text)?;
    T::from_raw(&decoded).ok_or_else(|| DecodeError::malformed(tag, text).into())
}

fn coerce<C, T>(config: &C, key: &str, raw: RawValue) -> Result<T, PropertyError>
where
    C: Config + ?Sized,
    T: PropertyType,
{
    match raw {
        RawValue::Text(text) => config.resolve_as::<T>(&text).map_err(|cause| {
            debug!(
                config = %config.name(),
                key,
                value = %text,
                error = %cause,
                "failed to parse property"
            );
            PropertyError::Parse {
                key: key.to_owned(),
                value: text,
                cause,
            }
        }),
        other => T::from_raw(&other).ok_or_else(|| {
            let type_name = T::type_tag().name();
            debug!(
                config = %config.name(),
                key,
                kind = other.kind_name(),
                target = type_name,
                "property is not convertible"
            );
            PropertyError::TypeMismatch {
                key: key.to_owned(),
                value: other.to_string(),
                type_name,
            }
        }),
    }
}

/// 按 `delimiter` 字面切分文本。
///
/// - 分隔符为空或未出现时返回只含原文的单元素列表；
/// - 末尾的空片段会被丢弃，开头与中间的空片段保留。
pub fn split_list(text: &str, delimiter: &str) -> Vec<String> {
    if delimiter.is_empty() || !text.contains(delimiter) {
        return vec![text.to_owned()];
    }
    let mut parts: Vec<String> = text.split(delimiter).map(str::to_owned).collect();
    while parts.last().is_some_and(String::is_empty) {
        parts.pop();
    }
    parts
}

/// 建立在 [`Config`] 之上的类型化读取接口。
///
/// # 教案式说明
/// - **意图 (Why)**：读取算法与存储无关，因此以 blanket 实现挂到所有 `Config`（包括 `dyn Config`）上，
///   存储实现者无需也无法改写它。
/// - **契约 (What)**：
///   - `get`：缺失时返回 [`PropertyError::NotFound`]；
///   - `get_or`：仅在缺失时返回默认值，存在但无法转换时仍然报错；
///   - `get_optional`：缺失时返回 `Ok(None)`；
///   - 带类型名的便捷方法均委托给上述三者。
/// - **并发 (Concurrency)**：每次调用只在开始时读取一次解码器与插值器，调用过程中不持锁。
pub trait PropertyAccess: Config {
    /// 原始值的可选读取，不插值也不转换。
    fn property(&self, key: &str) -> Option<RawValue> {
        self.raw_property(key)
    }

    fn get<T>(&self, key: &str) -> Result<T, PropertyError>
    where
        T: PropertyType,
    {
        match self.raw_property(key) {
            Some(raw) => coerce(self, key, raw),
            None => {
                trace!(config = %self.name(), key, "property not found");
                Err(self.not_found(key))
            }
        }
    }

    fn get_or<T>(&self, key: &str, default: T) -> Result<T, PropertyError>
    where
        T: PropertyType,
    {
        match self.raw_property(key) {
            Some(raw) => coerce(self, key, raw),
            None => {
                trace!(config = %self.name(), key, "property not found, using default");
                default.resolve_default(self, key)
            }
        }
    }

    fn get_optional<T>(&self, key: &str) -> Result<Option<T>, PropertyError>
    where
        T: PropertyType,
    {
        self.raw_property(key)
            .map(|raw| coerce(self, key, raw))
            .transpose()
    }

    fn get_long(&self, key: &str) -> Result<i64, PropertyError> {
        self.get(key)
    }

    fn get_long_or(&self, key: &str, default: i64) -> Result<i64, PropertyError> {
        self.get_or(key, default)
    }

    fn get_integer(&self, key: &str) -> Result<i32, PropertyError> {
        self.get(key)
    }

    fn get_integer_or(&self, key: &str, default: i32) -> Result<i32, PropertyError> {
        self.get_or(key, default)
    }

    fn get_short(&self, key: &str) -> Result<i16, PropertyError> {
        self.get(key)
    }

    fn get_short_or(&self, key: &str, default: i16) -> Result<i16, PropertyError> {
        self.get_or(key, default)
    }

    fn get_byte(&self, key: &str) -> Result<i8, PropertyError> {
        self.get(key)
    }

    fn get_byte_or(&self, key: &str, default: i8) -> Result<i8, PropertyError> {
        self.get_or(key, default)
    }

    fn get_double(&self, key: &str) -> Result<f64, PropertyError> {
        self.get(key)
    }

    fn get_double_or(&self, key: &str, default: f64) -> Result<f64, PropertyError> {
        self.get_or(key, default)
    }

    fn get_float(&self, key: &str) -> Result<f32, PropertyError> {
        self.get(key)
    }

    fn get_float_or(&self, key: &str, default: f32) -> Result<f32, PropertyError> {
        self.get_or(key, default)
    }

    fn get_boolean(&self, key: &str) -> Result<bool, PropertyError> {
        self.get(key)
    }

    fn get_boolean_or(&self, key: &str, default: bool) -> Result<bool, PropertyError> {
        self.get_or(key, default)
    }

    fn get_big_integer(&self, key: &str) -> Result<BigInt, PropertyError> {
        self.get(key)
    }

    fn get_big_integer_or(&self, key: &str, default: BigInt) -> Result<BigInt, PropertyError> {
        self.get_or(key, default)
    }

    fn get_big_decimal(&self, key: &str) -> Result<BigDecimal, PropertyError> {
        self.get(key)
    }

    fn get_big_decimal_or(
        &self,
        key: &str,
        default: BigDecimal,
    ) -> Result<BigDecimal, PropertyError> {
        self.get_or(key, default)
    }

    fn get_string(&self, key: &str) -> Result<String, PropertyError> {
        self.get(key)
    }

    /// 缺失时返回插值后的默认值。
    fn get_string_or(&self, key: &str, default: &str) -> Result<String, PropertyError> {
        self.get_or(key, default.to_owned())
    }

    fn get_duration(&self, key: &str) -> Result<Duration, PropertyError> {
        self.get(key)
    }

    fn get_duration_or(&self, key: &str, default: Duration) -> Result<Duration, PropertyError> {
        self.get_or(key, default)
    }

    /// 读取插值后的文本，按当前分隔符切分，并逐段解码为 `T`。
    ///
    /// 任一片段解码失败即整体失败，错误中的 `value` 为出错片段。
    fn get_list<T>(&self, key: &str) -> Result<Vec<T>, PropertyError>
    where
        T: PropertyType,
    {
        let text = self.get_string(key)?;
        let delimiter = self.list_delimiter();
        split_list(&text, &delimiter)
            .into_iter()
            .map(|part| {
                decode_as::<Self, T>(self, &part).map_err(|cause| {
                    debug!(
                        config = %self.name(),
                        key,
                        value = %part,
                        error = %cause,
                        "failed to parse list element"
                    );
                    PropertyError::Parse {
                        key: key.to_owned(),
                        value: part,
                        cause,
                    }
                })
            })
            .collect()
    }

    /// 读取插值后的文本并按当前分隔符切分。
    fn get_list_raw(&self, key: &str) -> Result<Vec<String>, PropertyError> {
        let text = self.get_string(key)?;
        Ok(split_list(&text, &self.list_delimiter()))
    }

    /// 缺失时返回 `default`；存在时固定按逗号切分，不受当前分隔符影响。
    fn get_list_or(&self, key: &str, default: Vec<String>) -> Result<Vec<String>, PropertyError> {
        match self.get_optional::<String>(key)? {
            Some(text) => Ok(split_list(&text, ",")),
            None => Ok(default),
        }
    }

    /// 插值 `text` 并解码为 `T`。
    fn resolve_as<T>(&self, text: &str) -> Result<T, ResolutionError>
    where
        T: PropertyType,
    {
        let resolved = self.resolve(text)?;
        decode_as::<Self, T>(self, &resolved)
    }

    /// 惰性遍历以 `prefix` 开头的键。
    fn keys_with_prefix<'a>(&'a self, prefix: &str) -> KeysWithPrefix<'a> {
        KeysWithPrefix::new(self.keys(), prefix)
    }

    /// 以原始值逐键访问，值不做插值。
    fn accept(&self, visitor: &mut dyn ConfigVisitor) {
        self.for_each_property(&mut |key, value| visitor.visit_key(key, value));
    }
}

impl<C> PropertyAccess for C where C: Config + ?Sized {}
