pub mod error;
pub mod executor;
pub mod reconciler;

pub use error::{Operation, SyncError};
pub use executor::{SyncContext, SyncExecutor};
pub use reconciler::{reconcile, OfferIdSet, ReconcileContext, ReconcileError, Reconciliation};
