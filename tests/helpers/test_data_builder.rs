// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

#![allow(dead_code)]

use cargo_tracker::domain::{CellValue, RawRow, Shipment, ShipmentType};

// ==========================================
// Shipment 构建器
// ==========================================

pub struct ShipmentBuilder {
    id: usize,
    tracking_number: String,
    carrier: String,
    shipment_type: ShipmentType,
    system_eta: String,
    live_eta: Option<String>,
    status: Option<String>,
    summary: Option<String>,
    raw: RawRow,
}

impl ShipmentBuilder {
    pub fn new(id: usize, tracking_number: &str) -> Self {
        Self {
            id,
            tracking_number: tracking_number.to_string(),
            carrier: "Unknown".to_string(),
            shipment_type: ShipmentType::Sea,
            system_eta: "N/A".to_string(),
            live_eta: None,
            status: None,
            summary: None,
            raw: RawRow::new().with("Container", CellValue::text(tracking_number)),
        }
    }

    pub fn carrier(mut self, carrier: &str) -> Self {
        self.carrier = carrier.to_string();
        self
    }

    pub fn air(mut self) -> Self {
        self.shipment_type = ShipmentType::Air;
        self
    }

    pub fn system_eta(mut self, eta: &str) -> Self {
        self.system_eta = eta.to_string();
        self.raw.push("ETA", CellValue::text(eta));
        self
    }

    pub fn live_eta(mut self, eta: &str) -> Self {
        self.live_eta = Some(eta.to_string());
        self
    }

    pub fn status(mut self, status: &str) -> Self {
        self.status = Some(status.to_string());
        self
    }

    pub fn summary(mut self, summary: &str) -> Self {
        self.summary = Some(summary.to_string());
        self
    }

    pub fn raw_column(mut self, key: &str, value: CellValue) -> Self {
        self.raw.push(key, value);
        self
    }

    pub fn build(self) -> Shipment {
        Shipment {
            id: self.id,
            tracking_number: self.tracking_number,
            carrier: self.carrier,
            shipment_type: self.shipment_type,
            system_eta: self.system_eta,
            live_eta: self.live_eta,
            status: self.status,
            summary: self.summary,
            loading: false,
            raw: self.raw,
        }
    }
}
