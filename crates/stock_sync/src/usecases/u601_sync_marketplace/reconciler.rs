use chrono::{DateTime, Utc};
use contracts::domain::a001_inventory_record::InventoryRecord;
use contracts::domain::a002_stock_update::StockUpdate;
use contracts::domain::a003_price_update::PriceUpdate;
use std::collections::BTreeSet;
use thiserror::Error;

use crate::domain::a001_inventory_record::{map_quantity, price_amount, QuantityParseError};

/// Артикулы, известные маркетплейсу
pub type OfferIdSet = BTreeSet<String>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("offer '{code}': {source}")]
pub struct ReconcileError {
    pub code: String,
    #[source]
    pub source: QuantityParseError,
}

/// Параметры маркетплейса, нужные при сверке
#[derive(Debug, Clone)]
pub struct ReconcileContext<'a> {
    pub warehouse_id: Option<&'a str>,
    pub currency: &'a str,
    pub observed_at: DateTime<Utc>,
}

impl ReconcileContext<'_> {
    fn stock(&self, offer_id: String, count: u32) -> StockUpdate {
        StockUpdate {
            offer_id,
            warehouse_id: self.warehouse_id.map(str::to_string),
            count,
            observed_at: self.observed_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub stocks: Vec<StockUpdate>,
    pub prices: Vec<PriceUpdate>,
}

impl Reconciliation {
    pub fn non_zero_stocks(&self) -> Vec<StockUpdate> {
        self.stocks.iter().filter(|s| !s.is_empty()).cloned().collect()
    }
}

/// Сверить прайс с артикулами маркетплейса.
///
/// Цены строятся по исходному набору артикулов, остатки "съедают" набор:
/// каждый артикул попадает в остатки ровно один раз, а отсутствующие в
/// прайсе обнуляются.
pub fn reconcile(
    inventory: &[InventoryRecord],
    known_offer_ids: OfferIdSet,
    ctx: &ReconcileContext<'_>,
) -> Result<Reconciliation, ReconcileError> {
    let prices = build_prices(inventory, &known_offer_ids, ctx.currency);
    let stocks = build_stocks(inventory, known_offer_ids, ctx)?;
    Ok(Reconciliation { stocks, prices })
}

/// Остатки: сначала в порядке прайса, затем обнулённый остаток набора
pub fn build_stocks(
    inventory: &[InventoryRecord],
    mut remaining: OfferIdSet,
    ctx: &ReconcileContext<'_>,
) -> Result<Vec<StockUpdate>, ReconcileError> {
    let mut stocks = Vec::with_capacity(remaining.len());

    for record in inventory {
        // повторный код в прайсе уже удалён из набора
        if !remaining.remove(&record.code) {
            continue;
        }
        let count = map_quantity(&record.quantity).map_err(|source| ReconcileError {
            code: record.code.clone(),
            source,
        })?;
        stocks.push(ctx.stock(record.code.clone(), count));
    }

    let zeroed = remaining.len();
    stocks.extend(remaining.into_iter().map(|offer_id| ctx.stock(offer_id, 0)));
    tracing::debug!(
        "Stocks built: {} matched, {} zero-filled",
        stocks.len() - zeroed,
        zeroed
    );

    Ok(stocks)
}

/// Цены по каждой записи прайса, артикул которой известен маркетплейсу
pub fn build_prices(
    inventory: &[InventoryRecord],
    known_offer_ids: &OfferIdSet,
    currency: &str,
) -> Vec<PriceUpdate> {
    inventory
        .iter()
        .filter(|record| known_offer_ids.contains(&record.code))
        .filter_map(|record| match price_amount(&record.price) {
            Some(amount) => Some(PriceUpdate {
                offer_id: record.code.clone(),
                amount,
                currency: currency.to_string(),
            }),
            None => {
                tracing::warn!(
                    "Skipping price for offer {}: cannot read price '{}'",
                    record.code,
                    record.price
                );
                None
            }
        })
        .collect()
}
