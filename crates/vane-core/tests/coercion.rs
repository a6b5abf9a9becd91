//! 类型转换主干的集成测试。
//!
//! ## 设计目的（Why）
//! - 以一个最小的自定义原始存储驱动 `PropertyAccess`，确认只实现五个必需方法即可获得完整读取能力；
//! - 覆盖数值宽化/窄化、文本渲染、默认值、插值与列表切分等读取路径的公开契约。
//!
//! ## 结构（How）
//! - `FixtureConfig`：`HashMap` 背书的原始存储，预置各宽度数值；
//! - 单元场景逐条断言，`proptest` 部分对任意数值验证 C 系强制转换语义。

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use proptest::prelude::*;
use vane_core::{
    Config, ConfigState, DecodeError, Decoder, InterpolationError, InterpolationSettings,
    MapConfig, PlaceholderInterpolator, PropertyAccess, PropertyError, PropertyErrorKind,
    PropertyType, RawValue, ResolutionError, TypeTag, native_from_raw,
};

struct FixtureConfig {
    state: ConfigState,
    entries: HashMap<String, RawValue>,
}

impl FixtureConfig {
    fn new() -> Self {
        let mut entries = HashMap::new();
        entries.insert("foo".to_owned(), RawValue::from("bar"));
        entries.insert("byte".to_owned(), RawValue::Byte(42));
        entries.insert("int".to_owned(), RawValue::Integer(42));
        entries.insert("long".to_owned(), RawValue::Long(42));
        entries.insert("float".to_owned(), RawValue::Float(42.0));
        entries.insert("double".to_owned(), RawValue::Double(42.0));
        Self {
            state: ConfigState::unnamed(),
            entries,
        }
    }
}

impl Config for FixtureConfig {
    fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn is_empty(&self) -> bool {
        false
    }

    fn raw_property(&self, key: &str) -> Option<RawValue> {
        self.entries.get(key).cloned()
    }

    fn keys(&self) -> Box<dyn Iterator<Item = String> + '_> {
        Box::new(self.entries.keys().cloned())
    }

    fn state(&self) -> &ConfigState {
        &self.state
    }
}

#[test]
fn textual_value_reads_back_verbatim() {
    let config = FixtureConfig::new();
    assert_eq!(config.get::<String>("foo").expect("文本值应可读取"), "bar");
    assert_eq!(config.property("foo"), Some(RawValue::from("bar")));
    assert_eq!(config.property("non_existent"), None);
}

#[test]
fn raw_numerics_are_returned_for_their_own_type() -> Result<(), PropertyError> {
    let config = FixtureConfig::new();
    assert_eq!(config.get::<i32>("int")?, 42);
    assert_eq!(config.get::<i64>("long")?, 42);
    assert_eq!(config.get::<i8>("byte")?, 42);
    assert_eq!(config.get::<f32>("float")?, 42.0);
    assert_eq!(config.get::<f64>("double")?, 42.0);
    Ok(())
}

#[test]
fn raw_numerics_render_canonically_as_text() -> Result<(), PropertyError> {
    let config = FixtureConfig::new();
    assert_eq!(config.get_string("int")?, "42");
    assert_eq!(config.get_string("long")?, "42");
    assert_eq!(config.get_string("byte")?, "42");
    assert_eq!(config.get_string("float")?, "42.0");
    assert_eq!(config.get_string("double")?, "42.0");
    Ok(())
}

#[test]
fn raw_numerics_narrow_and_widen() -> Result<(), PropertyError> {
    let config = FixtureConfig::new();
    for key in ["int", "long", "float", "double"] {
        assert_eq!(config.get_byte(key)?, 42, "{key} 应能窄化为 i8");
    }
    for key in ["int", "byte", "float", "double"] {
        assert_eq!(config.get_long(key)?, 42, "{key} 应能宽化为 i64");
    }
    for key in ["int", "byte", "long", "double"] {
        assert_eq!(config.get_float(key)?, 42.0, "{key} 应能转换为 f32");
    }
    for key in ["int", "byte", "long", "float"] {
        assert_eq!(config.get_double(key)?, 42.0, "{key} 应能转换为 f64");
    }
    assert_eq!(config.get_short("double")?, 42);
    assert_eq!(config.get_big_integer("float")?, BigInt::from(42));
    assert_eq!(
        config.get_big_decimal("double")?,
        BigDecimal::from_str("42.0").expect("合法小数")
    );
    Ok(())
}

#[test]
fn narrowing_truncates_without_overflow_checks() -> Result<(), PropertyError> {
    let config = MapConfig::builder()
        .put("wide", 300i32)
        .put("negative", -2.9f64)
        .put("huge", 1.0e12f64)
        .put("big", BigInt::from(u64::MAX) + BigInt::from(2u8))
        .build();
    assert_eq!(config.get_byte("wide")?, 44);
    assert_eq!(config.get_integer("negative")?, -2);
    assert_eq!(config.get_integer("huge")?, i32::MAX);
    assert_eq!(config.get_short("huge")?, i32::MAX as i16);
    assert_eq!(config.get_long("big")?, 1);
    Ok(())
}

#[test]
fn textual_values_are_decoded() -> Result<(), PropertyError> {
    let config = MapConfig::builder()
        .put("port", "8080")
        .put("ratio", "0.75")
        .put("enabled", "yes")
        .put("timeout", "PT1.5S")
        .put("mask", "0xFF")
        .put("serial", "123456789012345678901234567890")
        .build();
    assert_eq!(config.get_integer("port")?, 8080);
    assert_eq!(config.get_double("ratio")?, 0.75);
    assert!(config.get_boolean("enabled")?);
    assert_eq!(config.get_duration("timeout")?, Duration::from_millis(1_500));
    assert_eq!(config.get_long("mask")?, 255);
    assert_eq!(
        config.get_big_integer("serial")?,
        BigInt::from_str("123456789012345678901234567890").expect("合法整数")
    );
    Ok(())
}

#[test]
fn interpolated_template_resolves() -> Result<(), PropertyError> {
    let config = MapConfig::builder()
        .put("tpl", "${a}-${b}")
        .put("a", "1")
        .put("b", "2")
        .put("n", 7i32)
        .put("ref", "${n}")
        .build();
    assert_eq!(config.get_string("tpl")?, "1-2");
    assert_eq!(config.get_integer("ref")?, 7, "非文本值经规范渲染后参与插值");
    assert_eq!(config.resolve_as::<i64>("${a}${b}"), Ok(12));
    Ok(())
}

#[test]
fn missing_key_reports_not_found_unless_defaulted() {
    let config = MapConfig::new();
    let error = config.get::<i32>("missing").expect_err("缺失的键必须报错");
    assert!(error.is_not_found());
    assert_eq!(error.key(), "missing");
    assert_eq!(error.to_string(), "'missing' not found");
    assert_eq!(config.get_or::<i32>("missing", 7).ok(), Some(7));
    assert_eq!(config.get_optional::<i32>("missing").ok(), Some(None));
}

#[test]
fn defaults_are_not_decoded_but_textual_defaults_are_interpolated() -> Result<(), PropertyError>
{
    let config = MapConfig::builder().put("host", "example.org").build();
    assert_eq!(config.get_double_or("missing", 1.5)?, 1.5);
    assert_eq!(
        config.get_duration_or("missing", Duration::from_secs(3))?,
        Duration::from_secs(3)
    );
    assert_eq!(
        config.get_string_or("missing", "https://${host}")?,
        "https://example.org"
    );
    Ok(())
}

#[test]
fn present_but_invalid_value_ignores_default() {
    let config = MapConfig::builder().put("port", "eighty").build();
    let error = config
        .get_integer_or("port", 80)
        .expect_err("存在但非法的值不能回退到默认值");
    match error {
        PropertyError::Parse { key, value, cause } => {
            assert_eq!(key, "port");
            assert_eq!(value, "eighty");
            assert!(matches!(
                cause,
                ResolutionError::Decode(DecodeError::Malformed { .. })
            ));
        }
        other => panic!("期望解析错误，实际为 {other:?}"),
    }
}

#[test]
fn interpolation_cycles_surface_as_parse_errors() {
    let config = MapConfig::builder()
        .put("a", "${b}")
        .put("b", "${a}")
        .build();
    let error = config.get_string("a").expect_err("循环引用必须报错");
    assert_eq!(error.kind(), PropertyErrorKind::Parse);
    assert!(matches!(
        error,
        PropertyError::Parse {
            cause: ResolutionError::Interpolation(InterpolationError::Cycle { .. }),
            ..
        }
    ));
}

#[test]
fn non_numeric_natives_do_not_convert() {
    let config = MapConfig::builder()
        .put("flag", true)
        .put("window", Duration::from_secs(90))
        .build();
    assert!(config.get_boolean("flag").expect("布尔值原样返回"));
    assert_eq!(
        config.get_string("window").expect("时间间隔可渲染为文本"),
        "PT1M30S"
    );
    let error = config.get_integer("flag").expect_err("布尔值不能转换为整数");
    assert_eq!(error.kind(), PropertyErrorKind::TypeMismatch);
    assert_eq!(
        error.to_string(),
        "property 'flag' with value 'true' is not convertible to i32"
    );
}

#[test]
fn lists_split_on_the_configured_delimiter() -> Result<(), PropertyError> {
    let config = MapConfig::builder()
        .put("csv", "x,y,z")
        .put("ports", "80,443,8080,")
        .build();
    assert_eq!(config.get_list::<String>("csv")?, vec!["x", "y", "z"]);
    assert_eq!(config.get_list::<i32>("ports")?, vec![80, 443, 8080]);

    config.set_list_delimiter(";");
    config.set_property("csv", "x;y;z");
    assert_eq!(config.get_list::<String>("csv")?, vec!["x", "y", "z"]);
    assert_eq!(config.get_list_raw("csv")?, vec!["x", "y", "z"]);
    Ok(())
}

#[test]
fn list_with_default_always_splits_on_comma() -> Result<(), PropertyError> {
    let config = MapConfig::builder().put("csv", "a,b;c").build();
    config.set_list_delimiter(";");
    assert_eq!(
        config.get_list_or("csv", Vec::new())?,
        vec!["a", "b;c"],
        "带默认值的列表读取固定按逗号切分"
    );
    assert_eq!(
        config.get_list_or("absent", vec!["d".to_owned()])?,
        vec!["d"]
    );
    Ok(())
}

#[test]
fn list_element_failure_fails_the_whole_call() {
    let config = MapConfig::builder().put("ports", "80,http,443").build();
    let error = config.get_list::<i32>("ports").expect_err("任一片段非法即整体失败");
    assert!(matches!(error, PropertyError::Parse { ref value, .. } if value == "http"));
    assert!(config.get_list::<i32>("absent").expect_err("缺失").is_not_found());
}

#[derive(Clone, Debug, PartialEq)]
struct Endpoint {
    host: String,
    port: u16,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl PropertyType for Endpoint {
    fn type_tag() -> TypeTag {
        TypeTag::Native("Endpoint")
    }

    fn from_raw(raw: &RawValue) -> Option<Self> {
        native_from_raw(raw)
    }
}

struct EndpointDecoder;

impl Decoder for EndpointDecoder {
    fn decode(&self, target: TypeTag, text: &str) -> Result<RawValue, DecodeError> {
        match target {
            TypeTag::Native("Endpoint") => {
                let malformed = || DecodeError::Malformed {
                    type_name: "Endpoint",
                    text: text.to_owned(),
                };
                let (host, port) = text.split_once(':').ok_or_else(malformed)?;
                let port = port.parse().map_err(|_| malformed())?;
                Ok(RawValue::native(Endpoint {
                    host: host.to_owned(),
                    port,
                }))
            }
            other => vane_core::DefaultDecoder.decode(other, text),
        }
    }
}

#[test]
fn custom_types_flow_through_native_values_and_decoders() -> Result<(), PropertyError> {
    let endpoint = Endpoint {
        host: "db".to_owned(),
        port: 5432,
    };
    let config = MapConfig::builder()
        .put("primary", RawValue::native(endpoint.clone()))
        .put("replica", "replica.local:5433")
        .build();
    assert_eq!(config.get::<Endpoint>("primary")?, endpoint);
    assert_eq!(config.get_string("primary")?, "db:5432");

    let unsupported = config
        .get::<Endpoint>("replica")
        .expect_err("默认解码器不支持原生类型");
    assert!(matches!(
        unsupported,
        PropertyError::Parse {
            cause: ResolutionError::Decode(DecodeError::Unsupported { .. }),
            ..
        }
    ));

    config.set_decoder(Arc::new(EndpointDecoder));
    assert_eq!(config.get::<Endpoint>("replica")?.port, 5433);
    assert_eq!(config.get_integer_or("absent", 1)?, 1);
    Ok(())
}

#[test]
fn interpolator_swap_applies_to_later_reads() -> Result<(), PropertyError> {
    let config = MapConfig::builder()
        .put("h", "db")
        .put("url", "%{h}/${h}")
        .build();
    assert_eq!(config.get_string("url")?, "%{h}/db");

    config.set_interpolator(Arc::new(PlaceholderInterpolator::new(InterpolationSettings {
        prefix: "%{".to_owned(),
        escape: None,
        ..InterpolationSettings::default()
    })));
    assert_eq!(config.get_string("url")?, "db/${h}", "替换后的调用必须使用新语法");
    assert_eq!(config.resolve("${h}").as_deref(), Ok("${h}"));
    Ok(())
}

/// 在默认错误上附带属性空间名称的存储。
struct DiagnosticConfig {
    state: ConfigState,
}

impl Config for DiagnosticConfig {
    fn contains_key(&self, _key: &str) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        true
    }

    fn raw_property(&self, _key: &str) -> Option<RawValue> {
        None
    }

    fn keys(&self) -> Box<dyn Iterator<Item = String> + '_> {
        Box::new(std::iter::empty())
    }

    fn state(&self) -> &ConfigState {
        &self.state
    }

    fn not_found(&self, key: &str) -> PropertyError {
        PropertyError::not_found(&format!("{}/{key}", self.name()))
    }
}

#[test]
fn overridden_not_found_hook_shapes_missing_key_errors() {
    let config = DiagnosticConfig {
        state: ConfigState::named("diagnostic"),
    };
    let error = config.get::<i32>("port").expect_err("缺失的键必须报错");
    assert_eq!(error.key(), "diagnostic/port", "get 必须返回存储自定义的错误");
    assert!(error.is_not_found());
    assert_eq!(error.to_string(), "'diagnostic/port' not found");
    assert_eq!(config.get_or::<i32>("port", 9).ok(), Some(9), "默认值路径不经过该钩子");
    assert_eq!(
        config
            .get_list::<String>("hosts")
            .expect_err("列表读取同样缺失")
            .key(),
        "diagnostic/hosts"
    );
}

proptest! {
    #[test]
    fn integral_sources_cast_like_c(value in any::<i64>()) {
        let config = MapConfig::builder().put("n", value).build();
        prop_assert_eq!(config.get_integer("n").ok(), Some(value as i32));
        prop_assert_eq!(config.get_short("n").ok(), Some(value as i32 as i16));
        prop_assert_eq!(config.get_byte("n").ok(), Some(value as i32 as i8));
        prop_assert_eq!(config.get_double("n").ok(), Some(value as f64));
        prop_assert_eq!(config.get_big_integer("n").ok(), Some(BigInt::from(value)));
    }

    #[test]
    fn floating_sources_truncate_toward_zero(value in -1.0e15f64..1.0e15f64) {
        let config = MapConfig::builder().put("n", value).build();
        prop_assert_eq!(config.get_long("n").ok(), Some(value as i64));
        prop_assert_eq!(config.get_integer("n").ok(), Some(value as i32));
        prop_assert_eq!(config.get_byte("n").ok(), Some(value as i32 as i8));
        prop_assert_eq!(config.get_float("n").ok(), Some(value as f32));
    }

    #[test]
    fn text_rendering_round_trips_through_the_decoder(value in any::<i32>()) {
        let config = MapConfig::builder().put("n", value).build();
        let rendered = config.get_string("n").unwrap_or_default();
        config.set_property("n", rendered);
        prop_assert_eq!(config.get_integer("n").ok(), Some(value));
    }
}
