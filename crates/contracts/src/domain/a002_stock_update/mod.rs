use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Обновление остатка одного предложения
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockUpdate {
    #[serde(rename = "offerId")]
    pub offer_id: String,

    /// Склад; заполняется только для маркетплейсов с адресацией по складам
    #[serde(rename = "warehouseId", skip_serializing_if = "Option::is_none")]
    pub warehouse_id: Option<String>,

    pub count: u32,

    #[serde(rename = "observedAt")]
    pub observed_at: DateTime<Utc>,
}

impl StockUpdate {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
