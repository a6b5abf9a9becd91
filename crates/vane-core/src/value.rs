use std::any::Any;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};
use num_traits::{FromPrimitive, ToPrimitive};

/// 非字符串配置源直接提供的强类型对象。
///
/// ### 设计目的（Why）
/// - 内存配置、程序化注入等场景下，后端可能直接存放业务对象而非文本；核心层需要在不引入反射的前提下
///   保留这些对象，并在调用方请求同一类型时原样返回。
///
/// ### 契约说明（What）
/// - 任何满足 `Any + Debug + Display + Send + Sync` 的类型都会通过下方的 blanket 实现自动具备该能力；
/// - `Display` 决定对象在 `get_string` 等文本读取路径上的渲染结果。
pub trait NativeValue: Any + fmt::Debug + fmt::Display + Send + Sync {
    /// 返回可向下转型的 `Any` 引用。
    fn as_any(&self) -> &dyn Any;

    /// 返回具体类型名，用于错误信息。
    fn type_name(&self) -> &'static str;
}

impl<T> NativeValue for T
where
    T: Any + fmt::Debug + fmt::Display + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// 原始存储返回的未类型化值。
///
/// ### 设计目标（Why）
/// - 以封闭枚举描述后端可能提供的所有值形态，使类型转换成为一次显式的 `match`，而不是运行时类型探测。
/// - 数值按宽度区分变体，保证“原样返回”路径能够精确识别调用方请求的类型。
///
/// ### 逻辑概览（How）
/// - `Text`：文本值，读取时先经过插值，再交给解码器；
/// - `Boolean` / 各宽度整数 / 浮点：原生标量；
/// - `BigInteger` / `BigDecimal`：任意精度数值；
/// - `Duration`：时间间隔，文本渲染遵循 ISO-8601（`PT5S`）；
/// - `Native`：后端直接存放的强类型对象，见 [`NativeValue`]。
///
/// ### 契约说明（What）
/// - `Display` 输出即该值的规范文本表示：浮点至少保留一位小数（`42.0`），时间间隔使用 `PT..` 形式。
/// - “缺失”不属于本枚举，由 `Option<RawValue>` 表达。
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum RawValue {
    Text(String),
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    BigInteger(BigInt),
    BigDecimal(BigDecimal),
    Duration(Duration),
    Native(Arc<dyn NativeValue>),
}

impl RawValue {
    /// 将业务对象封装为 `Native` 原始值。
    pub fn native<T>(value: T) -> Self
    where
        T: NativeValue,
    {
        Self::Native(Arc::new(value))
    }

    /// 若为文本值则返回其内容。
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// 转换为文本：文本值原样移出，其余值使用规范渲染。
    pub fn into_string(self) -> String {
        match self {
            Self::Text(text) => text,
            other => other.to_string(),
        }
    }

    /// 返回值形态的稳定名称，用于日志与错误信息。
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Boolean(_) => "boolean",
            Self::Byte(_) => "i8",
            Self::Short(_) => "i16",
            Self::Integer(_) => "i32",
            Self::Long(_) => "i64",
            Self::Float(_) => "f32",
            Self::Double(_) => "f64",
            Self::BigInteger(_) => "big-integer",
            Self::BigDecimal(_) => "big-decimal",
            Self::Duration(_) => "duration",
            Self::Native(value) => NativeValue::type_name(&**value),
        }
    }

    /// 若值为任意数值形态，返回其数值视图。
    pub(crate) fn numeric(&self) -> Option<Numeric<'_>> {
        match self {
            Self::Byte(value) => Some(Numeric::Integral(i64::from(*value))),
            Self::Short(value) => Some(Numeric::Integral(i64::from(*value))),
            Self::Integer(value) => Some(Numeric::Integral(i64::from(*value))),
            Self::Long(value) => Some(Numeric::Integral(*value)),
            Self::Float(value) => Some(Numeric::Single(*value)),
            Self::Double(value) => Some(Numeric::Double(*value)),
            Self::BigInteger(value) => Some(Numeric::Big(value)),
            Self::BigDecimal(value) => Some(Numeric::Decimal(value)),
            _ => None,
        }
    }
}

impl PartialEq for RawValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Byte(a), Self::Byte(b)) => a == b,
            (Self::Short(a), Self::Short(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Long(a), Self::Long(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => a == b,
            (Self::BigInteger(a), Self::BigInteger(b)) => a == b,
            (Self::BigDecimal(a), Self::BigDecimal(b)) => a == b,
            (Self::Duration(a), Self::Duration(b)) => a == b,
            (Self::Native(a), Self::Native(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) => f.write_str(value),
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Byte(value) => write!(f, "{value}"),
            Self::Short(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Long(value) => write!(f, "{value}"),
            // `Debug` 渲染保证整数值浮点仍带小数位：42.0 而非 42。
            Self::Float(value) => write!(f, "{value:?}"),
            Self::Double(value) => write!(f, "{value:?}"),
            Self::BigInteger(value) => write!(f, "{value}"),
            Self::BigDecimal(value) => write!(f, "{value}"),
            Self::Duration(value) => write_iso_duration(f, value),
            Self::Native(value) => write!(f, "{value}"),
        }
    }
}

fn write_iso_duration(f: &mut fmt::Formatter<'_>, duration: &Duration) -> fmt::Result {
    let secs = duration.as_secs();
    let nanos = duration.subsec_nanos();
    if secs == 0 && nanos == 0 {
        return f.write_str("PT0S");
    }
    let hours = secs / 3_600;
    let minutes = (secs % 3_600) / 60;
    let seconds = secs % 60;
    f.write_str("PT")?;
    if hours > 0 {
        write!(f, "{hours}H")?;
    }
    if minutes > 0 {
        write!(f, "{minutes}M")?;
    }
    if seconds > 0 || nanos > 0 {
        write!(f, "{seconds}")?;
        if nanos > 0 {
            let fraction = format!("{nanos:09}");
            write!(f, ".{}", fraction.trim_end_matches('0'))?;
        }
        f.write_str("S")?;
    }
    Ok(())
}

macro_rules! raw_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for RawValue {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

raw_value_from! {
    String => Text,
    bool => Boolean,
    i8 => Byte,
    i16 => Short,
    i32 => Integer,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    BigInt => BigInteger,
    BigDecimal => BigDecimal,
    Duration => Duration,
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// 调用方请求的目标类型标签。
///
/// ### 设计目的（Why）
/// - 解码器与类型转换以该标签为键做一次分派，替代运行时类型检查；
/// - `Native` 携带类型名，使不受支持的目标类型能以具名错误快速失败。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum TypeTag {
    Text,
    Boolean,
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,
    BigInteger,
    BigDecimal,
    Duration,
    Native(&'static str),
}

impl TypeTag {
    /// 返回类型的稳定名称。
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Text => "string",
            Self::Boolean => "bool",
            Self::Byte => "i8",
            Self::Short => "i16",
            Self::Integer => "i32",
            Self::Long => "i64",
            Self::Float => "f32",
            Self::Double => "f64",
            Self::BigInteger => "big-integer",
            Self::BigDecimal => "big-decimal",
            Self::Duration => "duration",
            Self::Native(name) => *name,
        }
    }

    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Byte
                | Self::Short
                | Self::Integer
                | Self::Long
                | Self::Float
                | Self::Double
                | Self::BigInteger
                | Self::BigDecimal
        )
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 数值原始值的统一视图，承载宽化/窄化转换。
///
/// ### 契约说明（What）
/// - 转换规则等同 C 系语言的强制类型转换：整数宽度缩减按二进制补码截断，浮点转整数向零截断并在
///   `i32`/`i64` 边界饱和，窄于 `i32` 的目标先转 `i32` 再截断。
/// - 不做溢出或精度损失检查；这是刻意保留的历史语义，调用方可能依赖静默截断。
#[derive(Clone, Copy, Debug)]
pub(crate) enum Numeric<'a> {
    Integral(i64),
    Single(f32),
    Double(f64),
    Big(&'a BigInt),
    Decimal(&'a BigDecimal),
}

impl Numeric<'_> {
    pub(crate) fn long_value(&self) -> i64 {
        match *self {
            Self::Integral(value) => value,
            Self::Single(value) => value as i64,
            Self::Double(value) => value as i64,
            Self::Big(value) => low_64_bits(value),
            Self::Decimal(value) => low_64_bits(&truncate_decimal(value)),
        }
    }

    pub(crate) fn int_value(&self) -> i32 {
        match *self {
            Self::Single(value) => value as i32,
            Self::Double(value) => value as i32,
            _ => self.long_value() as i32,
        }
    }

    pub(crate) fn short_value(&self) -> i16 {
        self.int_value() as i16
    }

    pub(crate) fn byte_value(&self) -> i8 {
        self.int_value() as i8
    }

    pub(crate) fn float_value(&self) -> f32 {
        match *self {
            Self::Integral(value) => value as f32,
            Self::Single(value) => value,
            Self::Double(value) => value as f32,
            Self::Big(value) => value
                .to_f32()
                .unwrap_or_else(|| signed_infinity(value.sign()) as f32),
            Self::Decimal(value) => value.to_f32().unwrap_or(f32::NAN),
        }
    }

    pub(crate) fn double_value(&self) -> f64 {
        match *self {
            Self::Integral(value) => value as f64,
            Self::Single(value) => f64::from(value),
            Self::Double(value) => value,
            Self::Big(value) => value
                .to_f64()
                .unwrap_or_else(|| signed_infinity(value.sign())),
            Self::Decimal(value) => value.to_f64().unwrap_or(f64::NAN),
        }
    }

    /// 浮点向零截断后转为任意精度整数；非有限浮点无法表示，返回 `None`。
    pub(crate) fn big_integer(&self) -> Option<BigInt> {
        match *self {
            Self::Integral(value) => Some(BigInt::from(value)),
            Self::Single(value) => BigInt::from_f32(value.trunc()),
            Self::Double(value) => BigInt::from_f64(value.trunc()),
            Self::Big(value) => Some(value.clone()),
            Self::Decimal(value) => Some(truncate_decimal(value)),
        }
    }

    /// 浮点取其最短十进制表示，与文本渲染保持一致。
    pub(crate) fn big_decimal(&self) -> Option<BigDecimal> {
        match *self {
            Self::Integral(value) => Some(BigDecimal::from(value)),
            Self::Single(value) => BigDecimal::from_str(&format!("{value:?}")).ok(),
            Self::Double(value) => BigDecimal::from_str(&format!("{value:?}")).ok(),
            Self::Big(value) => Some(BigDecimal::new(value.clone(), 0)),
            Self::Decimal(value) => Some(value.clone()),
        }
    }
}

fn signed_infinity(sign: Sign) -> f64 {
    if sign == Sign::Minus {
        f64::NEG_INFINITY
    } else {
        f64::INFINITY
    }
}

fn truncate_decimal(value: &BigDecimal) -> BigInt {
    let (integral, _) = value.with_scale(0).into_bigint_and_exponent();
    integral
}

/// 取二进制补码表示的低 64 位。
fn low_64_bits(value: &BigInt) -> i64 {
    let bytes = value.to_signed_bytes_le();
    let fill = if value.sign() == Sign::Minus { 0xFF } else { 0x00 };
    let mut buf = [fill; 8];
    for (slot, byte) in buf.iter_mut().zip(bytes.iter()) {
        *slot = *byte;
    }
    i64::from_le_bytes(buf)
}
