use thiserror::Error;

use crate::shared::marketplaces::ApiError;

/// Ошибки загрузки прайса поставщика
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("failed to download inventory archive: {0}")]
    Download(#[from] ApiError),

    #[error("invalid inventory archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("entry '{0}' not found in inventory archive")]
    MissingEntry(String),

    #[error("failed to read archive entry: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read spreadsheet: {0}")]
    Spreadsheet(String),

    #[error("spreadsheet has no worksheets")]
    NoWorksheet,

    #[error("header row {row} not found (sheet has {rows} rows)")]
    MissingHeaderRow { row: usize, rows: usize },

    #[error("column '{0}' not found in header row")]
    MissingColumn(String),
}

impl InventoryError {
    /// Сообщение для оператора
    pub fn user_message(&self) -> &'static str {
        match self {
            InventoryError::Download(e) => e.user_message(),
            _ => "Не удалось прочитать файл остатков",
        }
    }
}
