pub mod response;

pub use response::SyncReport;

use crate::usecases::common::UseCaseMetadata;

pub struct SyncMarketplace;

impl UseCaseMetadata for SyncMarketplace {
    fn usecase_index() -> &'static str {
        "u601"
    }

    fn usecase_name() -> &'static str {
        "sync_marketplace"
    }

    fn display_name() -> &'static str {
        "Выгрузка остатков и цен"
    }

    fn description() -> &'static str {
        "Сверка прайса поставщика с предложениями маркетплейса и выгрузка остатков и цен"
    }
}
