use std::num::ParseIntError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid quantity '{raw}': {source}")]
pub struct QuantityParseError {
    pub raw: String,
    #[source]
    pub source: ParseIntError,
}

/// Перевести количество из прайса в остаток.
///
/// `">10"` поставщик выгружает вместо точного числа, выставляем 100.
/// `"1"` — особенность выгрузки поставщика: такой товар фактически
/// отсутствует, поэтому остаток 0. Отрицательное количество тоже даёт 0.
pub fn map_quantity(raw: &str) -> Result<u32, QuantityParseError> {
    match raw.trim() {
        ">10" => Ok(100),
        "1" => Ok(0),
        other => match other.parse::<u32>() {
            Ok(count) => Ok(count),
            Err(source) => match other.parse::<i64>() {
                Ok(n) if n < 0 => Ok(0),
                _ => Err(QuantityParseError {
                    raw: raw.to_string(),
                    source,
                }),
            },
        },
    }
}
