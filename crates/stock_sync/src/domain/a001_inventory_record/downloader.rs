use contracts::domain::a001_inventory_record::InventoryRecord;
use std::io::{Cursor, Read};
use std::time::Duration;
use zip::result::ZipError;

use super::error::InventoryError;
use super::spreadsheet;
use crate::shared::config::InventorySettings;
use crate::shared::marketplaces::{build_http_client, ApiError};

/// Предел предварительного выделения памяти под распакованный файл
const MAX_PREALLOCATION: u64 = 16 * 1024 * 1024;

/// Загрузчик прайса поставщика: zip-архив с таблицей остатков
pub struct InventoryDownloader {
    client: reqwest::Client,
    settings: InventorySettings,
}

impl InventoryDownloader {
    pub fn new(settings: InventorySettings, timeout: Duration) -> Result<Self, InventoryError> {
        Ok(Self {
            client: build_http_client(timeout)?,
            settings,
        })
    }

    /// Скачать архив с остатками
    pub async fn fetch_archive(&self) -> Result<Vec<u8>, InventoryError> {
        tracing::info!("Downloading inventory from {}", self.settings.url);

        let response = self
            .client
            .get(&self.settings.url)
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, body).into());
        }

        let bytes = response.bytes().await.map_err(ApiError::from)?;
        tracing::info!("Inventory archive downloaded: {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }

    /// Скачать и разобрать прайс; результат — снимок на время одного запуска
    pub async fn download_inventory(&self) -> Result<Vec<InventoryRecord>, InventoryError> {
        let archive = self.fetch_archive().await?;
        let sheet = extract_entry(&archive, &self.settings.entry_name)?;
        let rows = spreadsheet::read_first_sheet(sheet)?;
        let records =
            spreadsheet::parse_records(&rows, self.settings.header_row, &self.settings.columns)?;

        tracing::info!("Inventory loaded: {} records", records.len());
        Ok(records)
    }
}

/// Достать файл из zip-архива в память
pub fn extract_entry(archive_bytes: &[u8], entry_name: &str) -> Result<Vec<u8>, InventoryError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(archive_bytes))?;
    let mut entry = match archive.by_name(entry_name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => {
            return Err(InventoryError::MissingEntry(entry_name.to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    let mut buf = Vec::with_capacity(preallocation(entry.size()));
    entry.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Размер из заголовка архива, но не больше `MAX_PREALLOCATION`
fn preallocation(declared_size: u64) -> usize {
    declared_size.min(MAX_PREALLOCATION) as usize
}
