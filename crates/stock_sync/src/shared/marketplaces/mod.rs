pub mod ozon;
pub mod yandex_market;

use async_trait::async_trait;
use contracts::domain::a002_stock_update::StockUpdate;
use contracts::domain::a003_price_update::PriceUpdate;
use contracts::enums::marketplace_type::MarketplaceType;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::shared::api_log::ApiRequestLog;
use crate::shared::config::{AccountConfig, Connection};

pub use ozon::OzonApiClient;
pub use yandex_market::YandexApiClient;

/// Ошибки обращения к API маркетплейса
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("authorization rejected (HTTP {status}): {body}")]
    Unauthorized { status: u16, body: String },

    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to parse response JSON: {0}")]
    Decode(String),

    #[error("request error: {0}")]
    Request(String),
}

impl ApiError {
    /// Ошибка по неуспешному HTTP-статусу; 401 и 403 считаются отказом в авторизации
    pub fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            401 | 403 => ApiError::Unauthorized {
                status: status.as_u16(),
                body,
            },
            code => ApiError::Status { status: code, body },
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// Сообщение для оператора
    pub fn user_message(&self) -> &'static str {
        match self {
            ApiError::Timeout(_) => "Превышено время ожидания...",
            ApiError::Connection(_) => "Ошибка соединения",
            ApiError::Unauthorized { .. } => "Ошибка авторизации: проверьте токены доступа",
            _ => "Ошибка синхронизации",
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout(e.to_string())
        } else if e.is_connect() {
            ApiError::Connection(e.to_string())
        } else if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Request(e.to_string())
        }
    }
}

/// Страница артикулов, полученная от маркетплейса
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OfferIdPage {
    pub offer_ids: Vec<String>,
    /// Курсор следующей страницы; `None` на последней странице
    pub next_cursor: Option<String>,
}

/// Трейт для клиента API маркетплейса, через который идёт выгрузка
#[async_trait]
pub trait MarketplaceApi: Send + Sync {
    fn marketplace(&self) -> MarketplaceType;

    /// Получить одну страницу артикулов
    async fn fetch_offer_ids_page(&self, cursor: Option<String>) -> Result<OfferIdPage, ApiError>;

    /// Отправить пачку остатков
    async fn submit_stock_batch(&self, batch: &[StockUpdate]) -> Result<(), ApiError>;

    /// Отправить пачку цен
    async fn submit_price_batch(&self, batch: &[PriceUpdate]) -> Result<(), ApiError>;
}

pub(crate) fn build_http_client(timeout: Duration) -> Result<reqwest::Client, ApiError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ApiError::Request(format!("failed to create HTTP client: {}", e)))
}

/// Создать клиента маркетплейса для аккаунта
pub fn connect(
    account: &AccountConfig,
    timeout: Duration,
    log_dir: Option<&Path>,
) -> Result<Arc<dyn MarketplaceApi>, ApiError> {
    let client: Arc<dyn MarketplaceApi> = match &account.connection {
        Connection::Ozon(conn) => Arc::new(OzonApiClient::new(
            conn.clone(),
            timeout,
            ApiRequestLog::in_dir(log_dir, "ozon_api_requests.log"),
        )?),
        Connection::YandexMarket(conn) => Arc::new(YandexApiClient::new(
            conn.clone(),
            timeout,
            ApiRequestLog::in_dir(log_dir, "yandex_api_requests.log"),
        )?),
    };
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_status_classification() {
        assert!(ApiError::from_status(StatusCode::UNAUTHORIZED, String::new()).is_unauthorized());
        assert!(ApiError::from_status(StatusCode::FORBIDDEN, String::new()).is_unauthorized());

        let err = ApiError::from_status(StatusCode::BAD_REQUEST, "bad".into());
        assert!(matches!(err, ApiError::Status { status: 400, .. }));
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn test_user_messages_are_distinct() {
        let timeout = ApiError::Timeout("t".into()).user_message();
        let connection = ApiError::Connection("c".into()).user_message();
        let generic = ApiError::Decode("d".into()).user_message();
        assert_eq!(timeout, "Превышено время ожидания...");
        assert_eq!(connection, "Ошибка соединения");
        assert_ne!(generic, timeout);
        assert_ne!(generic, connection);
    }
}
