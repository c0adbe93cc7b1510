use async_trait::async_trait;
use contracts::domain::a002_stock_update::StockUpdate;
use contracts::domain::a003_price_update::PriceUpdate;
use contracts::enums::marketplace_type::MarketplaceType;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{build_http_client, ApiError, MarketplaceApi, OfferIdPage};
use crate::shared::api_log::{body_preview, ApiRequestLog};
use crate::shared::config::YandexConnection;

/// Формат `updatedAt`, который принимает Yandex Market (без долей секунды)
const UPDATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// HTTP-клиент для работы с Yandex Market Partner API (уровень кампании)
pub struct YandexApiClient {
    client: reqwest::Client,
    connection: YandexConnection,
    request_log: ApiRequestLog,
}

impl YandexApiClient {
    pub fn new(
        connection: YandexConnection,
        timeout: Duration,
        request_log: ApiRequestLog,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            client: build_http_client(timeout)?,
            connection,
            request_log,
        })
    }

    fn campaign_url(&self, suffix: &str) -> String {
        format!(
            "{}/campaigns/{}/{}",
            self.connection.base_url.trim_end_matches('/'),
            self.connection.campaign_id,
            suffix
        )
    }

    async fn execute<R: DeserializeOwned>(
        &self,
        method: Method,
        url: String,
        query: &[(&str, String)],
        body: Option<String>,
    ) -> Result<R, ApiError> {
        self.request_log.write(&format!(
            "=== REQUEST ===\n{} {}\nAuthorization: Bearer ****\nQuery: {:?}\nBody: {}",
            method,
            url,
            query,
            body.as_deref().unwrap_or("")
        ));

        let mut request = self
            .client
            .request(method, &url)
            .header("Authorization", format!("Bearer {}", &self.connection.token))
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .query(query);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        self.request_log.write(&format!("Response status: {}", status));

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            self.request_log.write(&format!("ERROR Response body:\n{}", body));
            tracing::error!(
                "Yandex Market API request failed: {}",
                body_preview(&body)
            );
            return Err(ApiError::from_status(status, body));
        }

        let body = response.text().await?;
        self.request_log
            .write(&format!("=== RESPONSE BODY ===\n{}\n", body_preview(&body)));

        serde_json::from_str::<R>(&body).map_err(|e| {
            tracing::error!("Failed to parse Yandex Market API response. Error: {}", e);
            ApiError::Decode(format!("{}. Response: {}", e, body_preview(&body)))
        })
    }

    /// Получить список товаров кампании
    /// Endpoint: GET /campaigns/{campaignId}/offer-mapping-entries
    pub async fn fetch_offer_mapping_entries(
        &self,
        page_token: Option<String>,
    ) -> Result<YandexOfferMappingEntriesResponse, ApiError> {
        let mut query = vec![("limit", self.connection.page_limit.to_string())];
        if let Some(token) = page_token.filter(|t| !t.is_empty()) {
            query.push(("page_token", token));
        }
        self.execute(
            Method::GET,
            self.campaign_url("offer-mapping-entries"),
            &query,
            None,
        )
        .await
    }

    /// Обновить остатки
    /// Endpoint: PUT /campaigns/{campaignId}/offers/stocks
    pub async fn update_stocks(&self, skus: Vec<YandexSkuStock>) -> Result<YandexStatusResponse, ApiError> {
        let body = serde_json::to_string(&YandexStocksRequest { skus })
            .map_err(|e| ApiError::Request(e.to_string()))?;
        self.execute(Method::PUT, self.campaign_url("offers/stocks"), &[], Some(body))
            .await
    }

    /// Обновить цены
    /// Endpoint: POST /campaigns/{campaignId}/offer-prices/updates
    pub async fn update_prices(&self, offers: Vec<YandexOfferPrice>) -> Result<YandexStatusResponse, ApiError> {
        let body = serde_json::to_string(&YandexPricesRequest { offers })
            .map_err(|e| ApiError::Request(e.to_string()))?;
        self.execute(
            Method::POST,
            self.campaign_url("offer-prices/updates"),
            &[],
            Some(body),
        )
        .await
    }
}

fn warn_not_ok(kind: &str, response: &YandexStatusResponse) {
    if response.status != "OK" {
        tracing::warn!(
            "Yandex Market {} update returned status {}",
            kind,
            response.status
        );
    }
}

#[async_trait]
impl MarketplaceApi for YandexApiClient {
    fn marketplace(&self) -> MarketplaceType {
        MarketplaceType::YandexMarket
    }

    async fn fetch_offer_ids_page(&self, cursor: Option<String>) -> Result<OfferIdPage, ApiError> {
        let response = self.fetch_offer_mapping_entries(cursor).await?;
        let result = response.result;
        tracing::debug!(
            "Yandex Market offer mappings: {} items, nextPageToken: {:?}",
            result.offer_mapping_entries.len(),
            result.paging.next_page_token
        );

        Ok(OfferIdPage {
            offer_ids: result
                .offer_mapping_entries
                .into_iter()
                .map(|e| e.offer.shop_sku)
                .collect(),
            next_cursor: result.paging.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    async fn submit_stock_batch(&self, batch: &[StockUpdate]) -> Result<(), ApiError> {
        let skus = batch
            .iter()
            .map(|s| {
                let warehouse_id = s.warehouse_id.clone().ok_or_else(|| {
                    ApiError::Request(format!(
                        "warehouse id is required for Yandex Market stock of offer {}",
                        s.offer_id
                    ))
                })?;
                Ok(YandexSkuStock {
                    sku: s.offer_id.clone(),
                    warehouse_id,
                    items: vec![YandexStockItem {
                        count: s.count,
                        stock_type: "FIT".to_string(),
                        updated_at: s.observed_at.format(UPDATED_AT_FORMAT).to_string(),
                    }],
                })
            })
            .collect::<Result<Vec<_>, ApiError>>()?;
        let response = self.update_stocks(skus).await?;
        warn_not_ok("stock", &response);
        Ok(())
    }

    async fn submit_price_batch(&self, batch: &[PriceUpdate]) -> Result<(), ApiError> {
        let offers = batch
            .iter()
            .map(|p| YandexOfferPrice {
                id: p.offer_id.clone(),
                price: YandexPrice {
                    value: p.amount,
                    currency_id: p.currency.clone(),
                },
            })
            .collect();
        let response = self.update_prices(offers).await?;
        warn_not_ok("price", &response);
        Ok(())
    }
}

// ============================================================================
// Request/Response structures для Yandex Market API
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YandexOfferMappingEntriesResponse {
    pub result: YandexOfferMappingEntriesResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YandexOfferMappingEntriesResult {
    #[serde(rename = "offerMappingEntries", default)]
    pub offer_mapping_entries: Vec<YandexOfferMappingEntry>,
    #[serde(default)]
    pub paging: YandexPaging,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YandexOfferMappingEntry {
    pub offer: YandexOffer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YandexOffer {
    #[serde(rename = "shopSku")]
    pub shop_sku: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YandexPaging {
    #[serde(rename = "nextPageToken", skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YandexStocksRequest {
    pub skus: Vec<YandexSkuStock>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YandexSkuStock {
    pub sku: String,
    #[serde(rename = "warehouseId")]
    pub warehouse_id: String,
    pub items: Vec<YandexStockItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YandexStockItem {
    pub count: u32,
    #[serde(rename = "type")]
    pub stock_type: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YandexPricesRequest {
    pub offers: Vec<YandexOfferPrice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YandexOfferPrice {
    pub id: String,
    pub price: YandexPrice,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YandexPrice {
    pub value: u64,
    #[serde(rename = "currencyId")]
    pub currency_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YandexStatusResponse {
    #[serde(default)]
    pub status: String,
}
