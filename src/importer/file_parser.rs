// ==========================================
// 柜内接线导入系统 - 文件解析器实现（Row Source）
// ==========================================
// 支持: CSV (.csv) / Excel (.xlsx/.xls)
// 接线导出文件表头前常有若干说明行，由 skip_leading_rows 跳过
// 行号从 1 开始，按文件物理行计（含说明行与表头）
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::wiring_importer_trait::{FileParser, RawRecord};
use calamine::{open_workbook_auto, Reader};
use csv::{ByteRecord, ReaderBuilder};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use tracing::{debug, warn};

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// 单元格按 UTF-8 解码，非法字节替换为 U+FFFD
fn decode_cells(row: &ByteRecord) -> Vec<String> {
    row.iter()
        .map(|cell| String::from_utf8_lossy(cell).into_owned())
        .collect()
}

/// 按表头把一行单元格组装成记录，完全空白的行返回 None
fn build_record<I>(headers: &[String], row_number: usize, cells: I) -> Option<RawRecord>
where
    I: IntoIterator<Item = String>,
{
    let mut fields = HashMap::new();
    for (col_idx, value) in cells.into_iter().enumerate() {
        if let Some(header) = headers.get(col_idx) {
            if !header.is_empty() {
                fields.insert(header.clone(), value.trim().to_string());
            }
        }
    }

    if fields.values().all(|v| v.is_empty()) {
        return None;
    }
    Some(RawRecord { row_number, fields })
}

// ==========================================
// CSV Parser 实现
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct CsvParser {
    pub skip_leading_rows: usize,
}

impl CsvParser {
    pub fn new(skip_leading_rows: usize) -> Self {
        Self { skip_leading_rows }
    }
}

impl FileParser for CsvParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRecord>> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 说明行与数据行列数不一致
            .from_reader(file);

        // 按字节读取，编码异常只影响单元格内容，不终止整个文件
        let mut rows = reader.byte_records();
        for _ in 0..self.skip_leading_rows {
            if rows.next().transpose()?.is_none() {
                return Ok(Vec::new());
            }
        }

        let headers: Vec<String> = match rows.next().transpose()? {
            Some(header_row) => decode_cells(&header_row)
                .into_iter()
                .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
                .collect(),
            None => return Ok(Vec::new()),
        };

        let first_data_row = self.skip_leading_rows + 2;
        let mut records = Vec::new();
        let mut lossy_rows = 0;
        for (idx, result) in rows.enumerate() {
            let row = result?;
            // 空行不产生记录，优先使用读取器给出的物理行号
            let row_number = row
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(first_data_row + idx);
            if std::str::from_utf8(row.as_slice()).is_err() {
                lossy_rows += 1;
                warn!(row = row_number, "行内含非 UTF-8 字节，按替换字符读取");
            }
            if let Some(record) = build_record(&headers, row_number, decode_cells(&row)) {
                records.push(record);
            }
        }

        debug!(
            file = %file_path.display(),
            row_count = records.len(),
            lossy_rows,
            "CSV 解析完成"
        );
        Ok(records)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ExcelParser {
    pub skip_leading_rows: usize,
}

impl ExcelParser {
    pub fn new(skip_leading_rows: usize) -> Self {
        Self { skip_leading_rows }
    }
}

impl FileParser for ExcelParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRecord>> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(file_path)?;

        // 读取第一个 sheet
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;

        let mut rows = range.rows().skip(self.skip_leading_rows);
        let headers: Vec<String> = match rows.next() {
            Some(header_row) => header_row
                .iter()
                .map(|cell| cell.to_string().trim().to_string())
                .collect(),
            None => return Ok(Vec::new()),
        };

        let first_data_row = self.skip_leading_rows + 2;
        let mut records = Vec::new();
        for (idx, data_row) in rows.enumerate() {
            let cells = data_row.iter().map(|cell| cell.to_string());
            if let Some(record) = build_record(&headers, first_data_row + idx, cells) {
                records.push(record);
            }
        }

        debug!(
            file = %file_path.display(),
            sheet = %sheet_name,
            row_count = records.len(),
            "Excel 解析完成"
        );
        Ok(records)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct UniversalFileParser {
    pub skip_leading_rows: usize,
}

impl UniversalFileParser {
    pub fn new(skip_leading_rows: usize) -> Self {
        Self { skip_leading_rows }
    }

    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Vec<RawRecord>> {
        let path = file_path.as_ref();
        match extension_of(path).as_str() {
            "csv" => CsvParser::new(self.skip_leading_rows).parse_to_raw_records(path),
            "xlsx" | "xls" => ExcelParser::new(self.skip_leading_rows).parse_to_raw_records(path),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl FileParser for UniversalFileParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRecord>> {
        self.parse(file_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn csv_file(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut temp_file = Builder::new().suffix(".csv").tempfile().unwrap();
        for line in lines {
            writeln!(temp_file, "{}", line).unwrap();
        }
        temp_file
    }

    #[test]
    fn test_csv_parser_valid_file() {
        let temp_file = csv_file(&[
            "source,target,Consecutive number",
            "=F+K1.2-K5:A1,=F+K1.2-X1:1,W1",
            "=F+K1.2-K5:A2,=F+K1.2-X1:2,W2",
        ]);

        let records = CsvParser::new(0)
            .parse_to_raw_records(temp_file.path())
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("source"), Some("=F+K1.2-K5:A1"));
        assert_eq!(records[0].get("Consecutive number"), Some("W1"));
        assert_eq!(records[0].row_number, 2);
    }

    #[test]
    fn test_csv_parser_skips_banner_rows() {
        let temp_file = csv_file(&[
            "Wiring export",
            "Project P001;generated",
            "source,target",
            "=F+L-K5:13,=F+L-K6:14",
        ]);

        let records = CsvParser::new(2)
            .parse_to_raw_records(temp_file.path())
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("target"), Some("=F+L-K6:14"));
        assert_eq!(records[0].row_number, 4);
    }

    #[test]
    fn test_csv_parser_skip_empty_rows() {
        let temp_file = csv_file(&["source,target", "A,B", ",", "C,D"]);

        let records = CsvParser::new(0)
            .parse_to_raw_records(temp_file.path())
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].row_number, 4);
    }

    #[test]
    fn test_csv_parser_keeps_rows_around_invalid_utf8() {
        let mut temp_file = Builder::new().suffix(".csv").tempfile().unwrap();
        temp_file
            .write_all(b"source,target,Consecutive number\n=F+L-K1:A1,=F+L-K1:A2,W1\n=F+L-K2:13,=F+L-K2:14,W\xff\n=F+L-K3:A1,=F+L-K3:A2,W3\n")
            .unwrap();

        let records = CsvParser::new(0)
            .parse_to_raw_records(temp_file.path())
            .unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[1].get("source"), Some("=F+L-K2:13"));
        assert_eq!(records[1].get("Consecutive number"), Some("W\u{fffd}"));
        assert_eq!(records[2].row_number, 4);
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser::new(0).parse_to_raw_records(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_universal_parser_rejects_unknown_extension() {
        let temp_file = Builder::new().suffix(".txt").tempfile().unwrap();
        let result = UniversalFileParser::new(0).parse(temp_file.path());
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }
}
