// ==========================================
// 货运智能追踪系统 - 导入管道 Trait
// ==========================================
// 职责: 定义导入各阶段接口（不包含实现）
// 流程: 解析 → 字段标准化 → 分类过滤
// ==========================================

use crate::domain::{NormalizedFields, RawRow, Shipment};
use crate::importer::error::ImportResult;
use crate::importer::file_parser::ParsedSheet;
use std::path::Path;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（阶段 0）
// 实现者: CsvParser, ExcelParser, UniversalFileParser
pub trait FileParser: Send + Sync {
    /// 解析文件第一个工作表为有序原始行
    ///
    /// # 参数
    /// - file_path: 文件路径
    ///
    /// # 返回
    /// - Ok(ParsedSheet): 表头模式 + 行记录
    /// - Err: 文件不存在、格式不支持、解码失败
    fn parse_sheet(&self, file_path: &Path) -> ImportResult<ParsedSheet>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 字段标准化接口（阶段 1）
// 实现者: RowNormalizer
pub trait FieldMapper: Send + Sync {
    /// 将原始行映射为标准化字段
    ///
    /// # 约束
    /// - 纯函数、全函数、确定性：每个 RawRow 恰好产出一个 NormalizedFields
    fn normalize(&self, row: &RawRow) -> NormalizedFields;
}

// ==========================================
// Classifier Trait
// ==========================================
// 用途: 承运人规范化 + 运输方式判定 + 过滤（阶段 2）
// 实现者: ShipmentClassifier
pub trait Classifier: Send + Sync {
    /// 分类单条候选记录
    ///
    /// # 返回
    /// - Some(Shipment): 保留
    /// - None: 追踪号为空或为哨兵值，丢弃
    fn classify(&self, fields: NormalizedFields, raw: RawRow, ordinal: usize) -> Option<Shipment>;
}
