/// Привести цену из прайса к строке из цифр целой части.
///
/// Дробная часть отбрасывается по первой точке (без округления), затем
/// удаляются все символы, кроме цифр: `"16'590.00 руб."` → `"16590"`.
/// Если цифр нет, возвращается пустая строка.
pub fn normalize_price(raw: &str) -> String {
    let integer_part = raw.split_once('.').map_or(raw, |(head, _)| head);
    integer_part.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Цена в целых единицах валюты; `None`, если цифр нет или число не помещается в `u64`
pub fn price_amount(raw: &str) -> Option<u64> {
    normalize_price(raw).parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_price() {
        assert_eq!(normalize_price("16'590.00 руб."), "16590");
        assert_eq!(normalize_price("5'990.00 руб."), "5990");
        assert_eq!(normalize_price("42"), "42");
        assert_eq!(normalize_price("abc"), "");
        assert_eq!(normalize_price(""), "");
    }

    #[test]
    fn test_fraction_is_truncated_not_rounded() {
        assert_eq!(normalize_price("99.99"), "99");
        assert_eq!(normalize_price("1 000.50.10"), "1000");
    }

    #[test]
    fn test_price_amount() {
        assert_eq!(price_amount("16'590.00 руб."), Some(16590));
        assert_eq!(price_amount("руб."), None);
        assert_eq!(price_amount("99999999999999999999999"), None);
    }
}
