use stock_sync::domain::a001_inventory_record::InventoryDownloader;
use stock_sync::shared::config::{self, AccountConfig, Config};
use stock_sync::shared::marketplaces;
use stock_sync::usecases::u601_sync_marketplace::SyncExecutor;

use contracts::domain::a001_inventory_record::InventoryRecord;
use contracts::usecases::u601_sync_marketplace::SyncReport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    // .env рядом с запуском необязателен: переменные могут прийти из окружения
    dotenvy::dotenv().ok();

    let log_dir = std::path::Path::new("target").join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("stock_sync.log"))?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,reqwest=warn,hyper=warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Arc::new(log_file))
                .with_ansi(false),
        )
        .init();

    let config = config::load_config()?;
    let accounts = config.resolve_accounts(|name| std::env::var(name).ok());
    if accounts.is_empty() {
        anyhow::bail!("no marketplace accounts configured: set credentials in the environment or .env");
    }

    let downloader = InventoryDownloader::new(config.inventory.clone(), config.http.timeout())?;
    let inventory = match downloader.download_inventory().await {
        Ok(records) => records,
        Err(e) => {
            tracing::error!("Inventory download failed: {}", e);
            eprintln!("{}: {}", e.user_message(), e);
            return Err(e.into());
        }
    };

    let mut failed = 0;
    for account in &accounts {
        match sync_account(&config, account, &inventory).await {
            Ok(report) => print_report(&report),
            Err(e) => {
                failed += 1;
                tracing::error!("Sync of account '{}' failed: {}", account.name, e);
                eprintln!("{}: {}", e.user_message(), e);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} accounts failed to sync", failed, accounts.len());
    }
    Ok(())
}

async fn sync_account(
    config: &Config,
    account: &AccountConfig,
    inventory: &[InventoryRecord],
) -> Result<SyncReport, SyncFailure> {
    let api = marketplaces::connect(
        account,
        config.http.timeout(),
        config::request_log_dir(config).as_deref(),
    )?;
    let report = SyncExecutor::new(api)
        .run(inventory, &account.sync_context())
        .await?;
    Ok(report)
}

/// Ошибка аккаунта: не удалось создать клиента или выполнить синхронизацию
#[derive(Debug, thiserror::Error)]
enum SyncFailure {
    #[error(transparent)]
    Client(#[from] marketplaces::ApiError),
    #[error(transparent)]
    Sync(#[from] stock_sync::usecases::u601_sync_marketplace::SyncError),
}

impl SyncFailure {
    fn user_message(&self) -> &'static str {
        match self {
            SyncFailure::Client(e) => e.user_message(),
            SyncFailure::Sync(e) => e.user_message(),
        }
    }
}

fn print_report(report: &SyncReport) {
    let elapsed = report.finished_at - report.started_at;
    println!(
        "\x1b[36m{}\x1b[0m | {:<12} | остатки: {:>6} (ненулевых {:>6}, обнулено {:>6}) | цены: {:>6} | {} ms",
        report.marketplace.display_name(),
        report.account,
        report.stocks.len(),
        report.non_zero_stocks.len(),
        report.zeroed_count(),
        report.prices.len(),
        elapsed.num_milliseconds()
    );
}
