use contracts::enums::marketplace_type::MarketplaceType;
use thiserror::Error;

use super::reconciler::ReconcileError;
use crate::shared::marketplaces::ApiError;

/// Выгружаемые данные
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Stocks,
    Prices,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Stocks => f.write_str("stock update"),
            Operation::Prices => f.write_str("price update"),
        }
    }
}

/// Ошибки синхронизации одного аккаунта
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("{marketplace} [{account}]: failed to fetch offer ids: {source}")]
    FetchOfferIds {
        marketplace: MarketplaceType,
        account: String,
        #[source]
        source: ApiError,
    },

    #[error("{marketplace} [{account}]: reconciliation failed: {source}")]
    Reconcile {
        marketplace: MarketplaceType,
        account: String,
        #[source]
        source: ReconcileError,
    },

    /// Пачка не принята; предыдущие пачки уже применены маркетплейсом
    #[error(
        "{marketplace} [{account}]: {operation} failed after {succeeded_batches} of {total_batches} batches were sent: {source}"
    )]
    PartialSubmission {
        marketplace: MarketplaceType,
        account: String,
        operation: Operation,
        succeeded_batches: usize,
        total_batches: usize,
        #[source]
        source: ApiError,
    },
}

impl SyncError {
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            SyncError::FetchOfferIds { source, .. } => Some(source),
            SyncError::PartialSubmission { source, .. } => Some(source),
            SyncError::Reconcile { .. } => None,
        }
    }

    /// Сообщение для оператора
    pub fn user_message(&self) -> &'static str {
        match self.api_error() {
            Some(e) => e.user_message(),
            None => "Ошибка в данных прайса",
        }
    }
}
