// ==========================================
// 货运智能追踪系统 - 补全引擎错误类型
// ==========================================
// 说明: 单条补全失败只在引擎内部消化（标记 Error），从不上抛中断批次
// ==========================================

use thiserror::Error;

/// 单条追踪请求错误
#[derive(Error, Debug)]
pub enum EnrichmentError {
    #[error("追踪服务连接失败: {0}")]
    Transport(String),

    #[error("追踪请求超时: {0}")]
    Timeout(String),

    #[error("追踪服务返回错误状态: {status}")]
    HttpStatus { status: u16 },

    #[error("追踪响应无法解析: {0}")]
    Decode(String),

    #[error("追踪客户端初始化失败: {0}")]
    ClientBuild(String),
}

// 实现 From<reqwest::Error>
impl From<reqwest::Error> for EnrichmentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            EnrichmentError::Timeout(err.to_string())
        } else if err.is_decode() {
            EnrichmentError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            EnrichmentError::HttpStatus {
                status: status.as_u16(),
            }
        } else if err.is_builder() {
            EnrichmentError::ClientBuild(err.to_string())
        } else {
            EnrichmentError::Transport(err.to_string())
        }
    }
}

/// Result 类型别名
pub type EnrichmentResult<T> = Result<T, EnrichmentError>;
