// ==========================================
// 生产可行性核心 - 导入层
// ==========================================
// 职责: 外部文件 → 边界记录（BOM / 库存 / 产品目录）
// 支持: Excel, CSV
// ==========================================

pub mod error;
pub mod file_parser;
pub mod record_mapper;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRow, UniversalFileParser};
pub use record_mapper::RecordMapper;
