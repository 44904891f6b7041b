// ==========================================
// 生产可行性核心 - 文件解析器
// ==========================================
// 支持: Excel (.xlsx) / CSV (.csv)
// 输出: 原始行（表头 -> 单元格文本）+ 源文件行号
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook, Reader, Xlsx};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// 原始行记录
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub row_number: usize, // 源文件行号（表头为第 1 行）
    pub cells: HashMap<String, String>,
}

impl RawRow {
    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells.get(header).map(String::as_str)
    }
}

/// 文件解析接口
pub trait FileParser: Send + Sync {
    /// 解析文件为原始行（跳过完全空白的行）
    fn parse_rows(&self, file_path: &Path) -> ImportResult<Vec<RawRow>>;
}

// ==========================================
// CSV Parser
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_rows(&self, file_path: &Path) -> ImportResult<Vec<RawRow>> {
        ensure_exists(file_path)?;

        if let Some(ext) = file_path.extension() {
            if !ext.eq_ignore_ascii_case("csv") {
                return Err(ImportError::UnsupportedFormat(
                    ext.to_string_lossy().to_string(),
                ));
            }
        }

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let cells = zip_cells(&headers, record.iter().map(str::to_string));
            if let Some(row) = non_blank(idx + 2, cells) {
                rows.push(row);
            }
        }

        Ok(rows)
    }
}

// ==========================================
// Excel Parser（读取第一个工作表）
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_rows(&self, file_path: &Path) -> ImportResult<Vec<RawRow>> {
        ensure_exists(file_path)?;

        let ext = file_path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !ext.eq_ignore_ascii_case("xlsx") {
            return Err(ImportError::UnsupportedFormat(ext.to_string()));
        }

        let mut workbook: Xlsx<_> = open_workbook(file_path)?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;

        let mut sheet_rows = range.rows();
        let header_row = sheet_rows
            .next()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无数据行".to_string()))?;

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (idx, data_row) in sheet_rows.enumerate() {
            let cells = zip_cells(&headers, data_row.iter().map(|cell| cell.to_string()));
            if let Some(row) = non_blank(idx + 2, cells) {
                rows.push(row);
            }
        }

        Ok(rows)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Vec<RawRow>> {
        let path = file_path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => CsvParser.parse_rows(path),
            "xlsx" => ExcelParser.parse_rows(path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn zip_cells(headers: &[String], values: impl Iterator<Item = String>) -> HashMap<String, String> {
    headers
        .iter()
        .zip(values)
        .map(|(header, value)| (header.clone(), value.trim().to_string()))
        .collect()
}

fn non_blank(row_number: usize, cells: HashMap<String, String>) -> Option<RawRow> {
    if cells.values().all(|v| v.is_empty()) {
        return None;
    }
    Some(RawRow { row_number, cells })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(lines: &[&str]) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[test]
    fn test_csv_parser_valid_file() {
        let file = csv_file(&["product_id,material_id,quantity", "P1,M1,2.5", "P1,M2,3"]);

        let rows = CsvParser.parse_rows(file.path()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row_number, 2);
        assert_eq!(rows[0].get("material_id"), Some("M1"));
        assert_eq!(rows[1].get("quantity"), Some("3"));
    }

    #[test]
    fn test_csv_parser_skips_blank_rows_but_keeps_numbering() {
        let file = csv_file(&["material_id,available", "M1,2.5", ",", "M2,3.0"]);

        let rows = CsvParser.parse_rows(file.path()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].row_number, 4);
    }

    #[test]
    fn test_missing_file() {
        let result = CsvParser.parse_rows(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_universal_parser_rejects_unknown_extension() {
        let result = UniversalFileParser.parse("inventory.json");
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }
}
