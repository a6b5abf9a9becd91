//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 为属性读取路径提供统一的错误语义：键缺失、文本无法解析、原生值无法转换三类失败互不混淆；
//! - 所有错误均同步、立即返回，不做重试，也不存在全局错误通道。
//!
//! ## 设计要求（What）
//! - 错误类型派生 [`thiserror::Error`]，兼容 `std::error::Error` 生态；
//! - 解析错误必须携带键名与原始字面量，方便排障；
//! - 监听器回调自身的 panic 不经过本模块，直接向触发通知的一方传播。

use core::fmt;

use thiserror::Error;

use crate::decoder::DecodeError;
use crate::interpolate::InterpolationError;

/// 属性读取失败的统一错误。
///
/// # 教案式说明
/// - **意图 (Why)**：调用方只需匹配一个枚举即可区分“没配”“配错”“类型不符”，
///   其中仅“缺失且提供默认值”会在本地恢复，其余均立即上抛。
/// - **契约 (What)**：
///   - `NotFound`：键不存在且未提供默认值；
///   - `Parse`：文本值在插值或解码阶段失败，`value` 为插值前的原始字面量；
///   - `TypeMismatch`：原生值无法按任何规则转换为目标类型。
/// - **设计权衡 (Trade-offs)**：`value` 统一保存为字符串，牺牲少量分配换取错误可直接打印。
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PropertyError {
    #[error("'{key}' not found")]
    NotFound { key: String },

    #[error("error parsing value '{value}' for property '{key}'")]
    Parse {
        key: String,
        value: String,
        #[source]
        cause: ResolutionError,
    },

    #[error("property '{key}' with value '{value}' is not convertible to {type_name}")]
    TypeMismatch {
        key: String,
        value: String,
        type_name: &'static str,
    },
}

impl PropertyError {
    /// 构造 `NotFound`；自定义存储覆盖 [`crate::Config::not_found`] 时以此附带诊断信息。
    pub fn not_found(key: &str) -> Self {
        Self::NotFound {
            key: key.to_owned(),
        }
    }

    /// 返回错误类别。
    pub fn kind(&self) -> PropertyErrorKind {
        match self {
            Self::NotFound { .. } => PropertyErrorKind::NotFound,
            Self::Parse { .. } => PropertyErrorKind::Parse,
            Self::TypeMismatch { .. } => PropertyErrorKind::TypeMismatch,
        }
    }

    /// 返回出错的键。
    pub fn key(&self) -> &str {
        match self {
            Self::NotFound { key } | Self::Parse { key, .. } | Self::TypeMismatch { key, .. } => {
                key
            }
        }
    }

    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// 错误类别，便于日志与指标按维度聚合。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PropertyErrorKind {
    NotFound,
    Parse,
    TypeMismatch,
}

impl fmt::Display for PropertyErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotFound => "not-found",
            Self::Parse => "parse",
            Self::TypeMismatch => "type-mismatch",
        };
        f.write_str(name)
    }
}

/// 文本值“插值 → 解码”链路上的失败原因。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ResolutionError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Interpolation(#[from] InterpolationError),
}

const _: fn() = || {
    fn assert_error_traits<T: std::error::Error + Send + Sync + 'static>() {}

    assert_error_traits::<PropertyError>();
    assert_error_traits::<ResolutionError>();
};
