use serde::{Deserialize, Serialize};

/// Обновление цены одного предложения (целые рубли)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceUpdate {
    #[serde(rename = "offerId")]
    pub offer_id: String,
    pub amount: u64,
    pub currency: String,
}
