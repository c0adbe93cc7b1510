pub mod downloader;
pub mod error;
pub mod price;
pub mod quantity;
pub mod spreadsheet;

pub use downloader::InventoryDownloader;
pub use error::InventoryError;
pub use price::{normalize_price, price_amount};
pub use quantity::{map_quantity, QuantityParseError};
