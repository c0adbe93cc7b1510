use async_trait::async_trait;
use contracts::domain::a002_stock_update::StockUpdate;
use contracts::domain::a003_price_update::PriceUpdate;
use contracts::enums::marketplace_type::MarketplaceType;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{build_http_client, ApiError, MarketplaceApi, OfferIdPage};
use crate::shared::api_log::{body_preview, ApiRequestLog};
use crate::shared::config::OzonConnection;

/// HTTP-клиент для работы с OZON Seller API
pub struct OzonApiClient {
    client: reqwest::Client,
    connection: OzonConnection,
    request_log: ApiRequestLog,
}

impl OzonApiClient {
    pub fn new(
        connection: OzonConnection,
        timeout: Duration,
        request_log: ApiRequestLog,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            client: build_http_client(timeout)?,
            connection,
            request_log,
        })
    }

    async fn post<B, R>(&self, path: &str, request: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.connection.base_url.trim_end_matches('/'), path);
        let body = serde_json::to_string(request).map_err(|e| ApiError::Request(e.to_string()))?;
        self.request_log.write(&format!(
            "=== REQUEST ===\nPOST {}\nClient-Id: {}\nApi-Key: ****\nBody: {}",
            url, self.connection.client_id, body
        ));

        let response = self
            .client
            .post(&url)
            .header("Client-Id", &self.connection.client_id)
            .header("Api-Key", &self.connection.api_key)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        self.request_log.write(&format!("Response status: {}", status));

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            self.request_log.write(&format!("ERROR Response body:\n{}", body));
            tracing::error!("OZON API request {} failed: {}", path, body_preview(&body));
            return Err(ApiError::from_status(status, body));
        }

        let body = response.text().await?;
        self.request_log
            .write(&format!("=== RESPONSE BODY ===\n{}\n", body_preview(&body)));

        serde_json::from_str::<R>(&body).map_err(|e| {
            tracing::error!("Failed to parse OZON API response. Error: {}", e);
            ApiError::Decode(format!("{}. Response: {}", e, body_preview(&body)))
        })
    }

    /// Получить список товаров через POST /v3/product/list
    pub async fn fetch_product_list(
        &self,
        last_id: Option<String>,
    ) -> Result<OzonProductListResponse, ApiError> {
        let request = OzonProductListRequest {
            filter: OzonProductListFilter {
                visibility: "ALL".to_string(),
            },
            last_id: last_id.unwrap_or_default(),
            limit: self.connection.page_limit,
        };
        self.post("/v3/product/list", &request).await
    }

    /// Обновить остатки через POST /v1/product/import/stocks
    pub async fn import_stocks(&self, stocks: Vec<OzonStockItem>) -> Result<OzonImportResponse, ApiError> {
        self.post("/v1/product/import/stocks", &OzonStocksRequest { stocks })
            .await
    }

    /// Обновить цены через POST /v1/product/import/prices
    pub async fn import_prices(&self, prices: Vec<OzonPriceItem>) -> Result<OzonImportResponse, ApiError> {
        self.post("/v1/product/import/prices", &OzonPricesRequest { prices })
            .await
    }
}

/// Ozon принимает пачку целиком, но может отклонить отдельные позиции
fn warn_rejected(kind: &str, response: &OzonImportResponse) {
    for item in response.result.iter().filter(|r| !r.updated) {
        tracing::warn!(
            "OZON rejected {} update for offer {}: {:?}",
            kind,
            item.offer_id,
            item.errors
        );
    }
}

#[async_trait]
impl MarketplaceApi for OzonApiClient {
    fn marketplace(&self) -> MarketplaceType {
        MarketplaceType::Ozon
    }

    async fn fetch_offer_ids_page(&self, cursor: Option<String>) -> Result<OfferIdPage, ApiError> {
        let response = self.fetch_product_list(cursor).await?;
        let result = response.result;
        tracing::debug!(
            "OZON product list: {} items, total: {}, last_id: {}",
            result.items.len(),
            result.total,
            result.last_id
        );

        let full_page = result.items.len() >= self.connection.page_limit as usize;
        let next_cursor = (full_page && !result.last_id.is_empty()).then_some(result.last_id);

        Ok(OfferIdPage {
            offer_ids: result.items.into_iter().map(|item| item.offer_id).collect(),
            next_cursor,
        })
    }

    async fn submit_stock_batch(&self, batch: &[StockUpdate]) -> Result<(), ApiError> {
        let stocks = batch
            .iter()
            .map(|s| OzonStockItem {
                offer_id: s.offer_id.clone(),
                stock: s.count,
            })
            .collect();
        let response = self.import_stocks(stocks).await?;
        warn_rejected("stock", &response);
        Ok(())
    }

    async fn submit_price_batch(&self, batch: &[PriceUpdate]) -> Result<(), ApiError> {
        let prices = batch
            .iter()
            .map(|p| OzonPriceItem {
                auto_action_enabled: "UNKNOWN".to_string(),
                currency_code: p.currency.clone(),
                offer_id: p.offer_id.clone(),
                old_price: "0".to_string(),
                price: p.amount.to_string(),
            })
            .collect();
        let response = self.import_prices(prices).await?;
        warn_rejected("price", &response);
        Ok(())
    }
}

// ============================================================================
// Request/Response structures для OZON API
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonProductListRequest {
    pub filter: OzonProductListFilter,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_id: String,
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonProductListFilter {
    pub visibility: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonProductListResponse {
    pub result: OzonProductListResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonProductListResult {
    pub items: Vec<OzonProductListItem>,
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub last_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonProductListItem {
    #[serde(default)]
    pub product_id: i64,
    pub offer_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonStocksRequest {
    pub stocks: Vec<OzonStockItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonStockItem {
    pub offer_id: String,
    pub stock: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonPricesRequest {
    pub prices: Vec<OzonPriceItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonPriceItem {
    pub auto_action_enabled: String,
    pub currency_code: String,
    pub offer_id: String,
    pub old_price: String,
    pub price: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OzonImportResponse {
    #[serde(default)]
    pub result: Vec<OzonImportResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonImportResult {
    pub offer_id: String,
    #[serde(default)]
    pub updated: bool,
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
}
