//! 初始化参数的反序列化测试：宿主以 TOML/JSON 片段描述属性空间时，缺省字段应取默认值。

use vane_core::{
    Config, ConfigOptions, InterpolationSettings, MapConfig, PropertyAccess, PropertyError,
};

#[test]
fn empty_documents_yield_defaults() {
    let from_toml: ConfigOptions = toml::from_str("").expect("空 TOML 文档应可解析");
    let from_json: ConfigOptions = serde_json::from_str("{}").expect("空 JSON 对象应可解析");
    assert_eq!(from_toml, ConfigOptions::default());
    assert_eq!(from_json, ConfigOptions::default());
    assert_eq!(from_toml.list_delimiter, ",");
    assert_eq!(from_toml.interpolation.prefix, "${");
    assert_eq!(from_toml.interpolation.max_depth, 32);
}

#[test]
fn toml_overrides_selected_fields() {
    let document = r#"
        name = "gateway"
        list_delimiter = ";"

        [interpolation]
        prefix = "%{"
        escape = "%"
    "#;
    let options: ConfigOptions = toml::from_str(document).expect("合法 TOML 文档");
    assert_eq!(options.name.as_deref(), Some("gateway"));
    assert_eq!(
        options.interpolation,
        InterpolationSettings {
            prefix: "%{".to_owned(),
            escape: Some('%'),
            ..InterpolationSettings::default()
        }
    );
}

#[test]
fn options_drive_the_property_space() -> Result<(), PropertyError> {
    let options: ConfigOptions = serde_json::from_str(
        r#"{ "name": "svc", "list_delimiter": "|", "interpolation": { "prefix": "%{", "escape": null } }"#,
    )
    .expect("合法 JSON 文档");
    let config = MapConfig::builder()
        .options(options)
        .put("host", "db")
        .put("url", "jdbc://%{host}/${host}")
        .put("hosts", "a|b")
        .build();
    assert_eq!(config.name(), "svc");
    assert_eq!(config.get_string("url")?, "jdbc://db/${host}");
    assert_eq!(config.get_list::<String>("hosts")?, vec!["a", "b"]);
    Ok(())
}
