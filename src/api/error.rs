// ==========================================
// 货运智能追踪系统 - API 层错误类型
// ==========================================
// 职责: 汇总各层错误，供调用方统一处理
// 说明: 单条补全失败不会出现在这里（已在引擎内消化为行状态）
// ==========================================

use crate::config::ConfigError;
use crate::engine::EnrichmentError;
use crate::exporter::ExportError;
use crate::importer::ImportError;
use thiserror::Error;

/// API 层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("导入失败: {0}")]
    Import(#[from] ImportError),

    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    #[error("追踪客户端初始化失败: {0}")]
    Enrichment(#[from] EnrichmentError),

    #[error("导出失败: {0}")]
    Export(#[from] ExportError),

    #[error("无效输入: {0}")]
    InvalidInput(String),
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
