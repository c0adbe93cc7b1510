use calamine::{open_workbook_auto_from_rs, Data, Reader};
use contracts::domain::a001_inventory_record::InventoryRecord;
use std::io::Cursor;

use super::error::InventoryError;
use crate::shared::config::ColumnNames;

/// Прочитать первый лист таблицы (xls/xlsx) как строки текстовых ячеек.
///
/// Индексы строк абсолютные: если лист начинается не с первой строки,
/// перед данными добавляются пустые строки.
pub fn read_first_sheet(bytes: Vec<u8>) -> Result<Vec<Vec<String>>, InventoryError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| InventoryError::Spreadsheet(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(InventoryError::NoWorksheet)?
        .map_err(|e| InventoryError::Spreadsheet(e.to_string()))?;

    let start_row = range.start().map_or(0, |(row, _)| row as usize);
    let mut rows: Vec<Vec<String>> = vec![Vec::new(); start_row];
    rows.extend(
        range
            .rows()
            .map(|row| row.iter().map(cell_to_string).collect::<Vec<String>>()),
    );
    Ok(rows)
}

/// Текстовое представление ячейки; целые числа без дробной части (`123.0` → `"123"`)
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => (*f as i64).to_string(),
        other => other.to_string(),
    }
}

fn cell(row: &[String], idx: usize) -> String {
    row.get(idx).cloned().unwrap_or_default()
}

/// Разобрать строки листа в записи прайса по строке заголовка
pub fn parse_records(
    rows: &[Vec<String>],
    header_row: usize,
    columns: &ColumnNames,
) -> Result<Vec<InventoryRecord>, InventoryError> {
    let header = rows.get(header_row).ok_or(InventoryError::MissingHeaderRow {
        row: header_row,
        rows: rows.len(),
    })?;

    let find = |name: &str| {
        header
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| InventoryError::MissingColumn(name.to_string()))
    };
    let code_idx = find(&columns.code)?;
    let name_idx = find(&columns.name)?;
    let price_idx = find(&columns.price)?;
    let quantity_idx = find(&columns.quantity)?;

    let records: Vec<InventoryRecord> = rows[header_row + 1..]
        .iter()
        .filter(|row| !cell(row, code_idx).is_empty())
        .map(|row| InventoryRecord {
            code: cell(row, code_idx),
            name: cell(row, name_idx),
            price: cell(row, price_idx),
            quantity: cell(row, quantity_idx),
        })
        .collect();

    tracing::debug!(
        "Parsed {} inventory records from {} data rows",
        records.len(),
        rows.len() - header_row - 1
    );
    Ok(records)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    /// Прайс в формате поставщика: заголовок на строке 17, данные ниже,
    /// первые строки листа пустые
    pub(crate) fn price_list_workbook() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(15, 0, "Остатки на складе").unwrap();
        for (col, title) in ["Код", "Наименование товара", "Цена", "Количество"]
            .into_iter()
            .enumerate()
        {
            sheet.write_string(17, col as u16 + 1, title).unwrap();
        }
        sheet.write_number(18, 1, 123).unwrap();
        sheet.write_string(18, 2, "BA-110-4A1").unwrap();
        sheet.write_string(18, 3, "16'590.00 руб.").unwrap();
        sheet.write_string(18, 4, ">10").unwrap();
        sheet.write_string(19, 2, "Итого").unwrap();
        sheet.write_string(20, 1, "456").unwrap();
        sheet.write_string(20, 2, "GA-2100").unwrap();
        sheet.write_string(20, 3, "9'990.00 руб.").unwrap();
        sheet.write_number(20, 4, 3).unwrap();
        workbook.save_to_buffer().unwrap()
    }

    fn columns() -> ColumnNames {
        ColumnNames {
            code: "Код".into(),
            name: "Наименование товара".into(),
            price: "Цена".into(),
            quantity: "Количество".into(),
        }
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(&Data::Empty), "");
        assert_eq!(cell_to_string(&Data::Float(123.0)), "123");
        assert_eq!(cell_to_string(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_to_string(&Data::Int(42)), "42");
        assert_eq!(cell_to_string(&Data::String(" >10 ".into())), ">10");
    }

    #[test]
    fn test_parse_records_after_header_row() {
        let rows = vec![
            row(&["Остатки на складе"]),
            Vec::new(),
            row(&["", "Код", "Наименование товара", "Цена", "Количество"]),
            row(&["", "123", "BA-110-4A1", "16'590.00 руб.", ">10"]),
            row(&["", "", "Итого", "", ""]),
            row(&["", "456", "GA-2100", "9'990.00 руб.", "3"]),
        ];

        let records = parse_records(&rows, 2, &columns()).unwrap();
        assert_eq!(
            records,
            vec![
                InventoryRecord::new("123", "BA-110-4A1", "16'590.00 руб.", ">10"),
                InventoryRecord::new("456", "GA-2100", "9'990.00 руб.", "3"),
            ]
        );
    }

    #[test]
    fn test_short_rows_yield_empty_fields() {
        let rows = vec![
            row(&["Код", "Наименование товара", "Цена", "Количество"]),
            row(&["789", "DW-5600"]),
        ];
        let records = parse_records(&rows, 0, &columns()).unwrap();
        assert_eq!(records[0].price, "");
        assert_eq!(records[0].quantity, "");
    }

    #[test]
    fn test_missing_header_row() {
        let rows = vec![row(&["Код"])];
        let err = parse_records(&rows, 17, &columns()).unwrap_err();
        assert!(matches!(
            err,
            InventoryError::MissingHeaderRow { row: 17, rows: 1 }
        ));
    }

    #[test]
    fn test_missing_column() {
        let rows = vec![row(&["Код", "Наименование товара", "Цена"])];
        let err = parse_records(&rows, 0, &columns()).unwrap_err();
        match err {
            InventoryError::MissingColumn(name) => assert_eq!(name, "Количество"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_read_first_sheet_keeps_absolute_rows() {
        let rows = read_first_sheet(price_list_workbook()).unwrap();
        assert_eq!(rows.len(), 21);
        assert!(rows[..15].iter().all(|row| row.is_empty()));
        assert_eq!(rows[15][0], "Остатки на складе");
        assert_eq!(rows[17][1], "Код");
        assert_eq!(rows[18][1], "123");
    }

    #[test]
    fn test_parse_workbook_from_header_row() {
        let rows = read_first_sheet(price_list_workbook()).unwrap();
        let records = parse_records(&rows, 17, &columns()).unwrap();
        assert_eq!(
            records,
            vec![
                InventoryRecord::new("123", "BA-110-4A1", "16'590.00 руб.", ">10"),
                InventoryRecord::new("456", "GA-2100", "9'990.00 руб.", "3"),
            ]
        );
    }

    #[test]
    fn test_unreadable_spreadsheet() {
        let err = read_first_sheet(b"not a spreadsheet".to_vec()).unwrap_err();
        assert!(matches!(err, InventoryError::Spreadsheet(_)));
    }
}
