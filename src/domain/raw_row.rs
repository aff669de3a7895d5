// ==========================================
// 货运智能追踪系统 - 原始行模型
// ==========================================
// 职责: 表格原始行（列名 → 单元格值，保持列顺序）
// 红线: 读取后不可变，导出时原样回写
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// CellValue - 单元格值
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
    #[default]
    Empty,
}

impl CellValue {
    /// 由文本构造（空白文本视为 Empty）
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// 仅当单元格为文本时返回其内容
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// 渲染为标签字符串（Empty → None）
    pub fn to_label(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{}", s),
            // 整数值不输出小数部分（12.0 → "12"）
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Empty => Ok(()),
        }
    }
}

// ==========================================
// RawRow - 原始行（有序关联表）
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawRow {
    cells: Vec<(String, CellValue)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self { cells: Vec::new() }
    }

    /// 追加一列（同名列覆盖原值，位置不变）
    pub fn push(&mut self, key: impl Into<String>, value: CellValue) {
        let key = key.into();
        match self.cells.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.cells.push((key, value)),
        }
    }

    /// 链式构造（测试与 fixture 常用）
    pub fn with(mut self, key: impl Into<String>, value: CellValue) -> Self {
        self.push(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// 按列位置取值（0 起）
    pub fn value_at(&self, position: usize) -> Option<&CellValue> {
        self.cells.get(position).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// 所有单元格均为空
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, v)| v.is_empty())
    }
}

impl FromIterator<(String, CellValue)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (String, CellValue)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (k, v) in iter {
            row.push(k, v);
        }
        row
    }
}
