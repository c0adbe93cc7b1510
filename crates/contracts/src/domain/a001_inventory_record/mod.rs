use serde::{Deserialize, Serialize};

/// Строка прайса поставщика (остатки часов)
///
/// Все поля хранятся в том виде, в каком пришли из таблицы: нормализация
/// цены и количества выполняется при сверке.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    /// Код товара, совпадает с артикулом (offer id) на маркетплейсе
    pub code: String,

    /// Наименование товара
    pub name: String,

    /// Цена как в прайсе, например `16'590.00 руб.`
    pub price: String,

    /// Количество: число, `1` или `>10`
    pub quantity: String,
}

impl InventoryRecord {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        price: impl Into<String>,
        quantity: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            price: price.into(),
            quantity: quantity.into(),
        }
    }
}
