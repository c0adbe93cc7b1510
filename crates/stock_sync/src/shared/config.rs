use contracts::enums::marketplace_type::MarketplaceType;
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use crate::usecases::u601_sync_marketplace::SyncContext;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub inventory: InventorySettings,
    pub http: HttpSettings,
    pub logging: LoggingSettings,
    pub ozon: OzonSettings,
    pub yandex_market: YandexMarketSettings,
}

/// Откуда и как читать прайс поставщика
#[derive(Debug, Deserialize, Clone)]
pub struct InventorySettings {
    pub url: String,
    /// Имя файла таблицы внутри zip-архива
    pub entry_name: String,
    /// Номер строки заголовка (с нуля)
    pub header_row: usize,
    pub columns: ColumnNames,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ColumnNames {
    pub code: String,
    pub name: String,
    pub price: String,
    pub quantity: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpSettings {
    pub timeout_secs: u64,
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    /// Каталог для логов запросов к API маркетплейсов; пустая строка отключает их
    pub request_log_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OzonSettings {
    pub enabled: bool,
    pub base_url: String,
    pub page_limit: u32,
    pub stock_batch_size: NonZeroUsize,
    pub price_batch_size: NonZeroUsize,
    pub client_id_env: String,
    pub api_key_env: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct YandexMarketSettings {
    pub enabled: bool,
    pub base_url: String,
    pub page_limit: u32,
    pub stock_batch_size: NonZeroUsize,
    pub price_batch_size: NonZeroUsize,
    pub token_env: String,
    #[serde(default)]
    pub campaigns: Vec<YandexCampaignSettings>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct YandexCampaignSettings {
    pub name: String,
    pub campaign_id_env: String,
    pub warehouse_id_env: String,
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[inventory]
url = "https://timeworld.ru/upload/files/ostatki.zip"
entry_name = "ostatki.xls"
header_row = 17

[inventory.columns]
code = "Код"
name = "Наименование товара"
price = "Цена"
quantity = "Количество"

[http]
timeout_secs = 30

[logging]
request_log_dir = "target/logs"

[ozon]
enabled = true
base_url = "https://api-seller.ozon.ru"
page_limit = 1000
stock_batch_size = 100
price_batch_size = 1000
client_id_env = "CLIENT_ID"
api_key_env = "SELLER_TOKEN"

[yandex_market]
enabled = true
base_url = "https://api.partner.market.yandex.ru"
page_limit = 200
stock_batch_size = 2000
price_batch_size = 500
token_env = "MARKET_TOKEN"

[[yandex_market.campaigns]]
name = "yandex-fbs"
campaign_id_env = "FBS_ID"
warehouse_id_env = "WAREHOUSE_FBS_ID"

[[yandex_market.campaigns]]
name = "yandex-dbs"
campaign_id_env = "DBS_ID"
warehouse_id_env = "WAREHOUSE_DBS_ID"
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                return parse_config(&contents);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    parse_config(DEFAULT_CONFIG)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents)?;
    Ok(config)
}

/// Каталог логов запросов; относительный путь считается от текущего каталога.
/// `None`, если логи запросов отключены.
pub fn request_log_dir(config: &Config) -> Option<PathBuf> {
    let dir = config.logging.request_log_dir.trim();
    (!dir.is_empty()).then(|| PathBuf::from(dir))
}

// ============================================================================
// Accounts
// ============================================================================

/// Аккаунт маркетплейса с разрешёнными из окружения учётными данными
#[derive(Debug, Clone)]
pub struct AccountConfig {
    pub name: String,
    pub warehouse_id: Option<String>,
    pub stock_batch_size: NonZeroUsize,
    pub price_batch_size: NonZeroUsize,
    pub connection: Connection,
}

#[derive(Debug, Clone)]
pub enum Connection {
    Ozon(OzonConnection),
    YandexMarket(YandexConnection),
}

#[derive(Clone)]
pub struct OzonConnection {
    pub base_url: String,
    pub client_id: String,
    pub api_key: String,
    pub page_limit: u32,
}

#[derive(Clone)]
pub struct YandexConnection {
    pub base_url: String,
    pub campaign_id: String,
    pub token: String,
    pub page_limit: u32,
}

impl std::fmt::Debug for OzonConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OzonConnection")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("api_key", &"****")
            .field("page_limit", &self.page_limit)
            .finish()
    }
}

impl std::fmt::Debug for YandexConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YandexConnection")
            .field("base_url", &self.base_url)
            .field("campaign_id", &self.campaign_id)
            .field("token", &"****")
            .field("page_limit", &self.page_limit)
            .finish()
    }
}

impl AccountConfig {
    pub fn marketplace(&self) -> MarketplaceType {
        match self.connection {
            Connection::Ozon(_) => MarketplaceType::Ozon,
            Connection::YandexMarket(_) => MarketplaceType::YandexMarket,
        }
    }

    pub fn sync_context(&self) -> SyncContext {
        SyncContext {
            account: self.name.clone(),
            warehouse_id: self.warehouse_id.clone(),
            stock_batch_size: self.stock_batch_size,
            price_batch_size: self.price_batch_size,
        }
    }
}

impl Config {
    /// Собрать список аккаунтов для синхронизации.
    ///
    /// `lookup` возвращает значение переменной окружения. Аккаунт, для
    /// которого не заданы все переменные, пропускается с предупреждением.
    pub fn resolve_accounts<F>(&self, lookup: F) -> Vec<AccountConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut accounts = Vec::new();

        if self.ozon.enabled {
            match (var(&self.ozon.client_id_env), var(&self.ozon.api_key_env)) {
                (Some(client_id), Some(api_key)) => accounts.push(AccountConfig {
                    name: "ozon".to_string(),
                    warehouse_id: None,
                    stock_batch_size: self.ozon.stock_batch_size,
                    price_batch_size: self.ozon.price_batch_size,
                    connection: Connection::Ozon(OzonConnection {
                        base_url: self.ozon.base_url.clone(),
                        client_id,
                        api_key,
                        page_limit: self.ozon.page_limit,
                    }),
                }),
                _ => tracing::warn!(
                    "Ozon account skipped: {} or {} is not set",
                    self.ozon.client_id_env,
                    self.ozon.api_key_env
                ),
            }
        }

        if self.yandex_market.enabled {
            let token = var(&self.yandex_market.token_env);
            for campaign in &self.yandex_market.campaigns {
                let campaign_id = var(&campaign.campaign_id_env);
                let warehouse_id = var(&campaign.warehouse_id_env);
                match (&token, campaign_id, warehouse_id) {
                    (Some(token), Some(campaign_id), Some(warehouse_id)) => {
                        accounts.push(AccountConfig {
                            name: campaign.name.clone(),
                            warehouse_id: Some(warehouse_id),
                            stock_batch_size: self.yandex_market.stock_batch_size,
                            price_batch_size: self.yandex_market.price_batch_size,
                            connection: Connection::YandexMarket(YandexConnection {
                                base_url: self.yandex_market.base_url.clone(),
                                campaign_id,
                                token: token.clone(),
                                page_limit: self.yandex_market.page_limit,
                            }),
                        })
                    }
                    _ => tracing::warn!(
                        "Yandex Market campaign '{}' skipped: {}, {} or {} is not set",
                        campaign.name,
                        self.yandex_market.token_env,
                        campaign.campaign_id_env,
                        campaign.warehouse_id_env
                    ),
                }
            }
        }

        accounts
    }
}
