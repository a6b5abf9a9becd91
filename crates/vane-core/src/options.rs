use serde::{Deserialize, Serialize};

/// 属性空间的初始化参数。
///
/// ### 设计目标（Why）
/// - 宿主通常从 TOML/JSON 片段中读取配置层的基础设定，核心层只负责承接反序列化结果，不解析文件格式；
/// - 所有字段都有默认值，调用方仅需声明关心的部分。
///
/// ### 契约说明（What）
/// - `name`：属性空间名称；缺省时自动生成 `unnamed-<n>`；
/// - `list_delimiter`：`get_list` 使用的分隔符，缺省为 `,`；
/// - `interpolation`：默认插值器的语法设定，见 [`InterpolationSettings`]。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigOptions {
    pub name: Option<String>,
    pub list_delimiter: String,
    pub interpolation: InterpolationSettings,
}

impl Default for ConfigOptions {
    fn default() -> Self {
        Self {
            name: None,
            list_delimiter: String::from(","),
            interpolation: InterpolationSettings::default(),
        }
    }
}

/// 默认插值器的语法设定。
///
/// - `prefix` / `suffix`：引用的起止标记，缺省 `${` 与 `}`；
/// - `escape`：紧贴在 `prefix` 前时输出字面前缀，缺省 `$`；
/// - `default_separator`：`${key:default}` 中键与默认值的分隔符，缺省 `:`，为空表示不支持默认值；
/// - `max_depth`：递归替换的最大深度，超出视为错误。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolationSettings {
    pub prefix: String,
    pub suffix: String,
    pub escape: Option<char>,
    pub default_separator: String,
    pub max_depth: usize,
}

impl Default for InterpolationSettings {
    fn default() -> Self {
        Self {
            prefix: String::from("${"),
            suffix: String::from("}"),
            escape: Some('$'),
            default_separator: String::from(":"),
            max_depth: 32,
        }
    }
}
