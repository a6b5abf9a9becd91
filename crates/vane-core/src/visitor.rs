use std::io;

use crate::value::RawValue;

/// 逐键访问属性空间的访问者。
///
/// 每个键恰好访问一次，值为未经插值的原始值。闭包 `FnMut(&str, &RawValue)` 自动实现本 trait。
pub trait ConfigVisitor {
    fn visit_key(&mut self, key: &str, value: &RawValue);
}

impl<F> ConfigVisitor for F
where
    F: FnMut(&str, &RawValue),
{
    fn visit_key(&mut self, key: &str, value: &RawValue) {
        self(key, value)
    }
}

/// 把属性以 `key=value` 行写入任意 [`io::Write`]，常用于排障时导出当前配置。
///
/// 写入失败后停止输出，并在 [`WriterVisitor::into_inner`] 中返回首个错误。
#[derive(Debug)]
pub struct WriterVisitor<W> {
    writer: W,
    error: Option<io::Error>,
}

impl<W: io::Write> WriterVisitor<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            error: None,
        }
    }

    pub fn into_inner(self) -> io::Result<W> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.writer),
        }
    }
}

impl<W: io::Write> ConfigVisitor for WriterVisitor<W> {
    fn visit_key(&mut self, key: &str, value: &RawValue) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = writeln!(self.writer, "{key}={value}") {
            self.error = Some(error);
        }
    }
}
