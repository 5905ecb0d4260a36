//! 题库文件读取与导入入口
//! DOCX 通过 docx-rs 提取段落文本，XLSX 通过 calamine 读取首个工作表，
//! 文件级失败统一折叠为 `success=false` 的 ParseResult

use crate::error::{Error, Result};
use crate::models::ParseResult;
use crate::services::parser::WordBankParser;
use crate::services::sheet::questions_from_rows;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use log::{error, info};
use std::io::Cursor;
use std::path::Path;

/// 题库文件大小限制 (50MB)
pub const MAX_DOCUMENT_SIZE: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Word,
    Excel,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "docx" => Some(DocumentKind::Word),
            "xlsx" | "xlsm" | "xls" => Some(DocumentKind::Excel),
            _ => None,
        }
    }
}

/// 从 Word 文档提取的文本及转换提示
#[derive(Debug, Clone, Default)]
pub struct ExtractedText {
    pub text: String,
    pub messages: Vec<String>,
}

fn check_file_size(size: usize) -> Result<()> {
    if size > MAX_DOCUMENT_SIZE {
        return Err(Error::FileTooLarge(format!(
            "文件大小 {}MB 超过限制 {}MB",
            size / (1024 * 1024),
            MAX_DOCUMENT_SIZE / (1024 * 1024)
        )));
    }
    Ok(())
}

/// 提取 DOCX 正文，每个段落一行
pub fn extract_docx_text(bytes: &[u8]) -> Result<ExtractedText> {
    check_file_size(bytes.len())?;
    let docx = docx_rs::read_docx(bytes).map_err(|e| Error::Docx(e.to_string()))?;

    let mut text = String::with_capacity(8192);
    let mut images = 0usize;

    for child in &docx.document.children {
        match child {
            docx_rs::DocumentChild::Paragraph(para) => {
                let line = paragraph_text(para, &mut images);
                if !line.trim().is_empty() {
                    text.push_str(&line);
                    text.push('\n');
                }
            }
            docx_rs::DocumentChild::Table(table) => {
                table_text(table, &mut text, &mut images);
            }
            _ => {}
        }
    }

    let mut messages = Vec::new();
    if images > 0 {
        messages.push(format!("忽略了 {} 张嵌入图片", images));
    }

    Ok(ExtractedText { text, messages })
}

fn paragraph_text(para: &docx_rs::Paragraph, images: &mut usize) -> String {
    let mut line = String::new();
    for child in &para.children {
        match child {
            docx_rs::ParagraphChild::Run(run) => run_text(run, &mut line, images),
            docx_rs::ParagraphChild::Hyperlink(hyperlink) => {
                for run in &hyperlink.children {
                    if let docx_rs::ParagraphChild::Run(r) = run {
                        run_text(r, &mut line, images);
                    }
                }
            }
            docx_rs::ParagraphChild::Insert(ins) => {
                for ic in &ins.children {
                    if let docx_rs::InsertChild::Run(r) = ic {
                        run_text(r, &mut line, images);
                    }
                }
            }
            _ => {}
        }
    }
    line
}

fn run_text(run: &docx_rs::Run, out: &mut String, images: &mut usize) {
    for rc in &run.children {
        match rc {
            docx_rs::RunChild::Text(t) => out.push_str(&t.text),
            docx_rs::RunChild::Tab(_) => out.push('\t'),
            docx_rs::RunChild::Break(_) => out.push('\n'),
            docx_rs::RunChild::Drawing(_) => *images += 1,
            _ => {}
        }
    }
}

/// 表格按行输出，单元格之间以制表符分隔
fn table_text(table: &docx_rs::Table, out: &mut String, images: &mut usize) {
    for tc in &table.rows {
        let mut cells: Vec<String> = Vec::new();
        if let docx_rs::TableChild::TableRow(row) = tc {
            for rc in &row.cells {
                if let docx_rs::TableRowChild::TableCell(cell) = rc {
                    cells.push(cell_text(cell, images));
                }
            }
        }
        let line = cells.join("\t");
        if !line.trim().is_empty() {
            out.push_str(&line);
            out.push('\n');
        }
    }
}

fn cell_text(cell: &docx_rs::TableCell, images: &mut usize) -> String {
    let mut text = String::new();
    for cc in &cell.children {
        if let docx_rs::TableCellContent::Paragraph(para) = cc {
            let t = paragraph_text(para, images);
            if !t.trim().is_empty() {
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(t.trim());
            }
        }
    }
    text
}

/// 读取首个工作表的全部行
pub fn extract_sheet_rows(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    check_file_size(bytes.len())?;
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| Error::Excel(format!("无法解析Excel数据: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::Excel("工作簿中没有工作表".to_string()))?
        .map_err(|e| Error::Excel(e.to_string()))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(data_to_string).collect())
        .collect())
}

/// 单元格转字符串，整数值的浮点数不带小数点
fn data_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                format!("{:.0}", f)
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("#ERR:{:?}", e),
    }
}

/// 题库导入器，按文件类型选择解析流程
#[derive(Debug, Default)]
pub struct QuestionImporter {
    parser: WordBankParser,
}

impl QuestionImporter {
    pub fn new(parser: WordBankParser) -> Self {
        Self { parser }
    }

    pub fn parse_word(&self, bytes: &[u8]) -> ParseResult {
        match extract_docx_text(bytes) {
            Ok(extracted) => self.parser.parse_document(&extracted.text, extracted.messages),
            Err(e) => {
                error!("Word 题库读取失败: {}", e);
                ParseResult::failed(format!("解析Word文档失败: {}", e))
            }
        }
    }

    pub fn parse_excel(&self, bytes: &[u8]) -> ParseResult {
        match extract_sheet_rows(bytes) {
            Ok(rows) => {
                let questions = questions_from_rows(&rows);
                info!(
                    "Excel 题库解析完成，{} 行数据中识别 {} 道题目",
                    rows.len().saturating_sub(1),
                    questions.len()
                );
                ParseResult::completed(questions, Vec::new())
            }
            Err(e) => {
                error!("Excel 题库读取失败: {}", e);
                ParseResult::failed(format!("解析Excel文件失败: {}", e))
            }
        }
    }

    /// 从磁盘读取题库文件，按扩展名判断格式
    pub fn parse_file(&self, path: &Path) -> ParseResult {
        let Some(kind) = DocumentKind::from_path(path) else {
            return ParseResult::failed(
                Error::UnsupportedFormat(path.display().to_string()).to_string(),
            );
        };

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("读取文件失败 {}: {}", path.display(), e);
                return ParseResult::failed(format!("读取文件失败: {}", e));
            }
        };

        match kind {
            DocumentKind::Word => self.parse_word(&bytes),
            DocumentKind::Excel => self.parse_excel(&bytes),
        }
    }
}
