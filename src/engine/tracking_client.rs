// ==========================================
// 货运智能追踪系统 - 远程追踪服务客户端
// ==========================================
// 协议: POST JSON {tracking_number, carrier, type}
//       → JSON {live_eta?, status?, smart_summary?}
// 说明: 传输失败 / 非 2xx / 响应不可解析统一视为补全失败
// ==========================================

use crate::config::BackendConfig;
use crate::domain::{Shipment, ShipmentType, TrackingUpdate};
use crate::engine::error::{EnrichmentError, EnrichmentResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

// ==========================================
// 请求 / 响应结构
// ==========================================

/// 追踪请求体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRequest {
    pub tracking_number: String,
    pub carrier: String,
    #[serde(rename = "type")]
    pub shipment_type: ShipmentType,
}

impl From<&Shipment> for TrackRequest {
    fn from(shipment: &Shipment) -> Self {
        Self {
            tracking_number: shipment.tracking_number.clone(),
            carrier: shipment.carrier.clone(),
            shipment_type: shipment.shipment_type,
        }
    }
}

/// 追踪响应体（所有字段可选）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackResponse {
    #[serde(default)]
    pub live_eta: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub smart_summary: Option<String>,

    // ===== 回显字段（仅记录日志）=====
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub raw_data_snippet: Option<String>,
}

impl From<TrackResponse> for TrackingUpdate {
    fn from(resp: TrackResponse) -> Self {
        Self {
            live_eta: resp.live_eta,
            status: resp.status,
            summary: resp.smart_summary,
        }
    }
}

// ==========================================
// TrackingClient Trait
// ==========================================
// 用途: 远程追踪服务端口
// 实现者: HttpTrackingClient（测试中可替换为脚本化实现）
#[async_trait]
pub trait TrackingClient: Send + Sync {
    /// 查询单条货运的实时追踪信息
    async fn track(&self, request: &TrackRequest) -> EnrichmentResult<TrackResponse>;
}

// ==========================================
// HttpTrackingClient - reqwest 实现
// ==========================================
pub struct HttpTrackingClient {
    client: reqwest::Client,
    url: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl HttpTrackingClient {
    /// 按后端配置创建客户端
    ///
    /// # 说明
    /// - request_timeout_secs 缺省时不设超时（请求可能无限挂起）
    /// - max_retries 缺省为 0（失败即终止该条）
    pub fn from_config(config: &BackendConfig) -> EnrichmentResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| EnrichmentError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            url: config.url.clone(),
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn send_once(&self, request: &TrackRequest) -> EnrichmentResult<TrackResponse> {
        let response = self
            .client
            .post(self.url.as_str())
            .json(request)
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        serde_json::from_str::<TrackResponse>(&body).map_err(|e| EnrichmentError::Decode(e.to_string()))
    }
}

#[async_trait]
impl TrackingClient for HttpTrackingClient {
    async fn track(&self, request: &TrackRequest) -> EnrichmentResult<TrackResponse> {
        let mut attempt = 0;
        loop {
            match self.send_once(request).await {
                Ok(resp) => {
                    debug!(
                        tracking_number = %request.tracking_number,
                        echoed = ?resp.tracking_number,
                        snippet = ?resp.raw_data_snippet,
                        "追踪服务响应"
                    );
                    return Ok(resp);
                }
                Err(e) if attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        tracking_number = %request.tracking_number,
                        attempt,
                        error = %e,
                        "追踪请求失败，准备重试"
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
