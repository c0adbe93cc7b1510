use chrono::{SubsecRound, Utc};
use contracts::domain::a001_inventory_record::InventoryRecord;
use contracts::domain::a002_stock_update::StockUpdate;
use contracts::domain::a003_price_update::PriceUpdate;
use contracts::usecases::common::UseCaseMetadata;
use contracts::usecases::u601_sync_marketplace::{SyncMarketplace, SyncReport};
use std::num::NonZeroUsize;
use std::sync::Arc;

use super::error::{Operation, SyncError};
use super::reconciler::{reconcile, OfferIdSet, ReconcileContext};
use crate::shared::batch::{batch_count, batches};
use crate::shared::marketplaces::{ApiError, MarketplaceApi};

/// Параметры аккаунта для одного запуска синхронизации
#[derive(Debug, Clone)]
pub struct SyncContext {
    pub account: String,
    pub warehouse_id: Option<String>,
    pub stock_batch_size: NonZeroUsize,
    pub price_batch_size: NonZeroUsize,
}

/// Executor для UseCase выгрузки остатков и цен в маркетплейс
pub struct SyncExecutor {
    api: Arc<dyn MarketplaceApi>,
}

impl SyncExecutor {
    pub fn new(api: Arc<dyn MarketplaceApi>) -> Self {
        Self { api }
    }

    /// Получить все артикулы маркетплейса, проходя по страницам
    pub async fn fetch_offer_ids(&self) -> Result<OfferIdSet, ApiError> {
        let mut offer_ids = OfferIdSet::new();
        let mut cursor: Option<String> = None;
        let mut page_number = 0;

        loop {
            let page = self.api.fetch_offer_ids_page(cursor.clone()).await?;
            page_number += 1;
            tracing::info!(
                "Offer ids page {}: {} items, next cursor: {:?}",
                page_number,
                page.offer_ids.len(),
                page
                    .next_cursor
                    .as_ref()
                    .map(|t| t.chars().take(50).collect::<String>())
            );

            offer_ids.extend(page.offer_ids);

            match page.next_cursor {
                Some(next) if cursor.as_deref() == Some(next.as_str()) => {
                    tracing::warn!("Cursor did not advance ({}), stopping pagination", next);
                    break;
                }
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        Ok(offer_ids)
    }

    /// Выполнить синхронизацию: артикулы, сверка, выгрузка остатков и цен
    pub async fn run(
        &self,
        inventory: &[InventoryRecord],
        ctx: &SyncContext,
    ) -> Result<SyncReport, SyncError> {
        let marketplace = self.api.marketplace();
        let started_at = Utc::now();
        tracing::info!(
            "{}: starting {} [{}]",
            SyncMarketplace::full_name(),
            marketplace.display_name(),
            ctx.account
        );

        let known_offer_ids = self.fetch_offer_ids().await.map_err(|source| {
            SyncError::FetchOfferIds {
                marketplace,
                account: ctx.account.clone(),
                source,
            }
        })?;
        tracing::info!("Known offer ids: {}", known_offer_ids.len());

        let reconcile_ctx = ReconcileContext {
            warehouse_id: ctx.warehouse_id.as_deref(),
            currency: marketplace.currency_code(),
            observed_at: started_at.trunc_subsecs(0),
        };
        let reconciliation = reconcile(inventory, known_offer_ids, &reconcile_ctx).map_err(
            |source| SyncError::Reconcile {
                marketplace,
                account: ctx.account.clone(),
                source,
            },
        )?;

        let stock_batches = self.submit_stocks(&reconciliation.stocks, ctx).await?;
        let price_batches = self.submit_prices(&reconciliation.prices, ctx).await?;

        let non_zero_stocks = reconciliation.non_zero_stocks();
        tracing::info!(
            "{} [{}] synced: {} stocks ({} non-zero) in {} batches, {} prices in {} batches",
            marketplace.display_name(),
            ctx.account,
            reconciliation.stocks.len(),
            non_zero_stocks.len(),
            stock_batches,
            reconciliation.prices.len(),
            price_batches
        );

        Ok(SyncReport {
            marketplace,
            account: ctx.account.clone(),
            non_zero_stocks,
            stocks: reconciliation.stocks,
            prices: reconciliation.prices,
            stock_batches,
            price_batches,
            started_at,
            finished_at: Utc::now(),
        })
    }

    async fn submit_stocks(
        &self,
        stocks: &[StockUpdate],
        ctx: &SyncContext,
    ) -> Result<usize, SyncError> {
        let total = batch_count(stocks.len(), ctx.stock_batch_size);
        for (index, batch) in batches(stocks, ctx.stock_batch_size).enumerate() {
            self.api.submit_stock_batch(batch).await.map_err(|source| {
                tracing::error!("Stock batch {}/{} failed: {}", index + 1, total, source);
                SyncError::PartialSubmission {
                    marketplace: self.api.marketplace(),
                    account: ctx.account.clone(),
                    operation: Operation::Stocks,
                    succeeded_batches: index,
                    total_batches: total,
                    source,
                }
            })?;
            tracing::debug!("Stock batch {}/{} sent ({} items)", index + 1, total, batch.len());
        }
        Ok(total)
    }

    async fn submit_prices(
        &self,
        prices: &[PriceUpdate],
        ctx: &SyncContext,
    ) -> Result<usize, SyncError> {
        let total = batch_count(prices.len(), ctx.price_batch_size);
        for (index, batch) in batches(prices, ctx.price_batch_size).enumerate() {
            self.api.submit_price_batch(batch).await.map_err(|source| {
                tracing::error!("Price batch {}/{} failed: {}", index + 1, total, source);
                SyncError::PartialSubmission {
                    marketplace: self.api.marketplace(),
                    account: ctx.account.clone(),
                    operation: Operation::Prices,
                    succeeded_batches: index,
                    total_batches: total,
                    source,
                }
            })?;
            tracing::debug!("Price batch {}/{} sent ({} items)", index + 1, total, batch.len());
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::marketplaces::OfferIdPage;
    use async_trait::async_trait;
    use contracts::enums::marketplace_type::MarketplaceType;
    use std::sync::Mutex;

    /// Маркетплейс в памяти: страницы артикулов и журнал принятых пачек
    struct FakeMarketplace {
        marketplace: MarketplaceType,
        pages: Vec<OfferIdPage>,
        fail_stock_batch: Option<(usize, fn() -> ApiError)>,
        fail_price_batch: Option<usize>,
        cursors: Mutex<Vec<Option<String>>>,
        stock_batches: Mutex<Vec<Vec<StockUpdate>>>,
        price_batches: Mutex<Vec<Vec<PriceUpdate>>>,
    }

    impl FakeMarketplace {
        fn new(marketplace: MarketplaceType, pages: Vec<OfferIdPage>) -> Self {
            Self {
                marketplace,
                pages,
                fail_stock_batch: None,
                fail_price_batch: None,
                cursors: Mutex::new(Vec::new()),
                stock_batches: Mutex::new(Vec::new()),
                price_batches: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MarketplaceApi for FakeMarketplace {
        fn marketplace(&self) -> MarketplaceType {
            self.marketplace
        }

        async fn fetch_offer_ids_page(&self, cursor: Option<String>) -> Result<OfferIdPage, ApiError> {
            let mut cursors = self.cursors.lock().unwrap();
            let index = cursors.len();
            cursors.push(cursor);
            Ok(self.pages.get(index).cloned().unwrap_or_default())
        }

        async fn submit_stock_batch(&self, batch: &[StockUpdate]) -> Result<(), ApiError> {
            let mut sent = self.stock_batches.lock().unwrap();
            if let Some((at, make_error)) = self.fail_stock_batch {
                if sent.len() == at {
                    return Err(make_error());
                }
            }
            sent.push(batch.to_vec());
            Ok(())
        }

        async fn submit_price_batch(&self, batch: &[PriceUpdate]) -> Result<(), ApiError> {
            let mut sent = self.price_batches.lock().unwrap();
            if self.fail_price_batch == Some(sent.len()) {
                return Err(ApiError::Timeout("operation timed out".into()));
            }
            sent.push(batch.to_vec());
            Ok(())
        }
    }

    fn connection_reset() -> ApiError {
        ApiError::Connection("connection reset".into())
    }

    fn unauthorized() -> ApiError {
        ApiError::Unauthorized {
            status: 401,
            body: "invalid token".into(),
        }
    }

    fn page(ids: &[&str], next: Option<&str>) -> OfferIdPage {
        OfferIdPage {
            offer_ids: ids.iter().map(|s| s.to_string()).collect(),
            next_cursor: next.map(str::to_string),
        }
    }

    fn ctx(stock: usize, price: usize) -> SyncContext {
        SyncContext {
            account: "test".into(),
            warehouse_id: None,
            stock_batch_size: NonZeroUsize::new(stock).unwrap(),
            price_batch_size: NonZeroUsize::new(price).unwrap(),
        }
    }

    fn inventory() -> Vec<InventoryRecord> {
        vec![
            InventoryRecord::new("123", "BA-110-4A1", "16'590.00 руб.", ">10"),
            InventoryRecord::new("777", "GA-2100", "9'990.00 руб.", "4"),
        ]
    }

    #[tokio::test]
    async fn test_fetch_offer_ids_follows_cursor() {
        let fake = Arc::new(FakeMarketplace::new(
            MarketplaceType::YandexMarket,
            vec![
                page(&["1", "2"], Some("p2")),
                page(&["3"], Some("p3")),
                page(&["4"], None),
            ],
        ));
        let executor = SyncExecutor::new(fake.clone());

        let ids = executor.fetch_offer_ids().await.unwrap();
        assert_eq!(ids.len(), 4);
        assert_eq!(
            *fake.cursors.lock().unwrap(),
            vec![None, Some("p2".to_string()), Some("p3".to_string())]
        );
    }

    #[tokio::test]
    async fn test_fetch_offer_ids_continues_past_empty_page_with_cursor() {
        let fake = Arc::new(FakeMarketplace::new(
            MarketplaceType::Ozon,
            vec![
                page(&["1"], Some("p2")),
                page(&[], Some("p3")),
                page(&["2", "3"], None),
            ],
        ));
        let ids = SyncExecutor::new(fake.clone()).fetch_offer_ids().await.unwrap();
        assert_eq!(
            ids,
            ["1", "2", "3"].iter().map(|s| s.to_string()).collect::<OfferIdSet>()
        );
        assert_eq!(fake.cursors.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_offers_after_empty_page_are_zero_filled() {
        let fake = Arc::new(FakeMarketplace::new(
            MarketplaceType::Ozon,
            vec![
                page(&["1"], Some("p2")),
                page(&[], Some("p3")),
                page(&["2", "3"], None),
            ],
        ));
        let report = SyncExecutor::new(fake.clone())
            .run(&[], &ctx(10, 10))
            .await
            .unwrap();
        let zeroed: Vec<&str> = report.stocks.iter().map(|s| s.offer_id.as_str()).collect();
        assert_eq!(zeroed, vec!["1", "2", "3"]);
        assert!(report.stocks.iter().all(|s| s.count == 0));
    }

    #[tokio::test]
    async fn test_fetch_offer_ids_stops_on_empty_last_page() {
        let fake = Arc::new(FakeMarketplace::new(
            MarketplaceType::YandexMarket,
            vec![page(&["1"], Some("p2")), page(&[], None)],
        ));
        let ids = SyncExecutor::new(fake.clone()).fetch_offer_ids().await.unwrap();
        assert_eq!(ids.len(), 1);
        assert_eq!(fake.cursors.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_offer_ids_stops_on_repeated_cursor() {
        let fake = Arc::new(FakeMarketplace::new(
            MarketplaceType::Ozon,
            vec![
                page(&["1"], Some("same")),
                page(&["2"], Some("same")),
                page(&["3"], None),
            ],
        ));
        let ids = SyncExecutor::new(fake.clone()).fetch_offer_ids().await.unwrap();
        assert_eq!(ids.len(), 2);
    }

    #[tokio::test]
    async fn test_run_reports_and_batches() {
        let fake = Arc::new(FakeMarketplace::new(
            MarketplaceType::Ozon,
            vec![page(&["123", "456", "789"], None)],
        ));
        let report = SyncExecutor::new(fake.clone())
            .run(&inventory(), &ctx(2, 1))
            .await
            .unwrap();

        assert_eq!(report.marketplace, MarketplaceType::Ozon);
        assert_eq!(report.account, "test");
        let counts: Vec<(&str, u32)> = report
            .stocks
            .iter()
            .map(|s| (s.offer_id.as_str(), s.count))
            .collect();
        assert_eq!(counts, vec![("123", 100), ("456", 0), ("789", 0)]);
        assert_eq!(report.non_zero_stocks.len(), 1);
        assert_eq!(report.zeroed_count(), 2);
        assert_eq!(report.prices.len(), 1);
        assert_eq!(report.prices[0].currency, "RUB");
        assert_eq!(report.stock_batches, 2);
        assert_eq!(report.price_batches, 1);

        let sent = fake.stock_batches.lock().unwrap();
        let sizes: Vec<usize> = sent.iter().map(|b| b.len()).collect();
        assert_eq!(sizes, vec![2, 1]);
        assert_eq!(fake.price_batches.lock().unwrap().len(), 1);

        let observed_at = report.stocks[0].observed_at;
        assert_eq!(observed_at.timestamp_subsec_nanos(), 0);
        assert!(report.stocks.iter().all(|s| s.observed_at == observed_at));
    }

    #[tokio::test]
    async fn test_run_with_empty_catalog_sends_nothing() {
        let fake = Arc::new(FakeMarketplace::new(MarketplaceType::Ozon, vec![]));
        let report = SyncExecutor::new(fake.clone())
            .run(&inventory(), &ctx(100, 1000))
            .await
            .unwrap();
        assert!(report.stocks.is_empty());
        assert_eq!(report.stock_batches, 0);
        assert_eq!(report.price_batches, 0);
        assert!(fake.stock_batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_partial_stock_submission() {
        let mut fake = FakeMarketplace::new(
            MarketplaceType::YandexMarket,
            vec![page(&["1", "2", "3", "4", "5"], None)],
        );
        fake.fail_stock_batch = Some((1, connection_reset as fn() -> ApiError));
        let fake = Arc::new(fake);

        let err = SyncExecutor::new(fake.clone())
            .run(&[], &ctx(2, 500))
            .await
            .unwrap_err();
        match &err {
            SyncError::PartialSubmission {
                operation,
                succeeded_batches,
                total_batches,
                source,
                ..
            } => {
                assert_eq!(*operation, Operation::Stocks);
                assert_eq!(*succeeded_batches, 1);
                assert_eq!(*total_batches, 3);
                assert!(matches!(source, ApiError::Connection(_)));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.user_message(), "Ошибка соединения");
        // первая пачка уже отправлена, остальные — нет
        assert_eq!(fake.stock_batches.lock().unwrap().len(), 1);
        assert!(fake.price_batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_authorization_failure_stops_immediately() {
        let mut fake = FakeMarketplace::new(MarketplaceType::Ozon, vec![page(&["123"], None)]);
        fake.fail_stock_batch = Some((0, unauthorized as fn() -> ApiError));
        let fake = Arc::new(fake);

        let err = SyncExecutor::new(fake.clone())
            .run(&inventory(), &ctx(100, 1000))
            .await
            .unwrap_err();
        assert!(err.api_error().map_or(false, ApiError::is_unauthorized));
        assert!(fake.stock_batches.lock().unwrap().is_empty());
        assert!(fake.price_batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_partial_price_submission() {
        let mut fake = FakeMarketplace::new(
            MarketplaceType::Ozon,
            vec![page(&["123", "777"], None)],
        );
        fake.fail_price_batch = Some(1);
        let fake = Arc::new(fake);

        let err = SyncExecutor::new(fake.clone())
            .run(&inventory(), &ctx(100, 1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SyncError::PartialSubmission {
                operation: Operation::Prices,
                succeeded_batches: 1,
                total_batches: 2,
                ..
            }
        ));
        assert_eq!(err.user_message(), "Превышено время ожидания...");
    }

    #[tokio::test]
    async fn test_bad_quantity_aborts_before_submission() {
        let fake = Arc::new(FakeMarketplace::new(
            MarketplaceType::Ozon,
            vec![page(&["123"], None)],
        ));
        let inventory = vec![InventoryRecord::new("123", "x", "100.00", "n/a")];
        let err = SyncExecutor::new(fake.clone())
            .run(&inventory, &ctx(100, 1000))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Reconcile { .. }));
        assert!(fake.stock_batches.lock().unwrap().is_empty());
    }
}
