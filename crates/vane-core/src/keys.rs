use thiserror::Error;

/// 键迭代器的操作失败。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum KeyIterationError {
    #[error("no more keys with the requested prefix")]
    Exhausted,
    #[error("removing keys through a read-only view is not supported")]
    RemoveUnsupported,
}

/// 按前缀过滤的惰性键序列。
///
/// ### 设计目的（Why）
/// - 前缀扫描常用于读取一组相关配置，底层键集合可能很大，过滤必须惰性完成；
/// - 保留“先探测再取值”的游标式接口（`has_next` / `next_key`），同时实现标准 [`Iterator`]。
///
/// ### 契约说明（What）
/// - 构造时即向前查找第一个匹配键，之后每次取值后再向前查找一个；
/// - 产出的是完整键，不去除前缀；
/// - 序列耗尽后 `next_key` 返回 [`KeyIterationError::Exhausted`]；
/// - 本迭代器只读，`remove` 恒返回 [`KeyIterationError::RemoveUnsupported`]。
pub struct KeysWithPrefix<'a> {
    inner: Box<dyn Iterator<Item = String> + 'a>,
    prefix: String,
    pending: Option<String>,
}

impl<'a> KeysWithPrefix<'a> {
    pub fn new(inner: Box<dyn Iterator<Item = String> + 'a>, prefix: &str) -> Self {
        let mut keys = Self {
            inner,
            prefix: prefix.to_owned(),
            pending: None,
        };
        keys.advance();
        keys
    }

    fn advance(&mut self) {
        let prefix = &self.prefix;
        self.pending = self.inner.by_ref().find(|key| key.starts_with(prefix.as_str()));
    }

    pub fn has_next(&self) -> bool {
        self.pending.is_some()
    }

    pub fn next_key(&mut self) -> Result<String, KeyIterationError> {
        let current = self.pending.take().ok_or(KeyIterationError::Exhausted)?;
        self.advance();
        Ok(current)
    }

    pub fn remove(&mut self) -> Result<(), KeyIterationError> {
        Err(KeyIterationError::RemoveUnsupported)
    }
}

impl Iterator for KeysWithPrefix<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_key().ok()
    }
}
