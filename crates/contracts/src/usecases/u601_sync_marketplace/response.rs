use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::a002_stock_update::StockUpdate;
use crate::domain::a003_price_update::PriceUpdate;
use crate::enums::marketplace_type::MarketplaceType;

/// Итог синхронизации одного аккаунта маркетплейса
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    pub marketplace: MarketplaceType,

    /// Имя аккаунта из конфигурации (например, "yandex-fbs")
    pub account: String,

    /// Остатки с ненулевым количеством
    #[serde(rename = "nonZeroStocks")]
    pub non_zero_stocks: Vec<StockUpdate>,

    /// Все отправленные остатки, включая обнулённые
    pub stocks: Vec<StockUpdate>,

    pub prices: Vec<PriceUpdate>,

    #[serde(rename = "stockBatches")]
    pub stock_batches: usize,

    #[serde(rename = "priceBatches")]
    pub price_batches: usize,

    #[serde(rename = "startedAt")]
    pub started_at: DateTime<Utc>,

    #[serde(rename = "finishedAt")]
    pub finished_at: DateTime<Utc>,
}

impl SyncReport {
    /// Количество предложений, обнулённых из-за отсутствия в прайсе или остатка
    pub fn zeroed_count(&self) -> usize {
        self.stocks.len() - self.non_zero_stocks.len()
    }
}
