//! 题库导入相关命令
//! 供命令行和上层界面调用的解析接口

use crate::models::{ParseResult, ParsedQuestion, ValidationReport};
use crate::services::document::QuestionImporter;
use crate::services::parser::{ParserConfig, WordBankParser};
use crate::services::validator::validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 导入请求
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportOptions {
    pub report_skipped_blocks: bool,
    pub validate: bool,
}

/// 导入结果：解析结果 + 可选的校验报告
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReportDto {
    #[serde(flatten)]
    pub result: ParseResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationReport>,
}

fn importer(options: &ImportOptions) -> QuestionImporter {
    QuestionImporter::new(WordBankParser::with_config(ParserConfig {
        report_skipped_blocks: options.report_skipped_blocks,
    }))
}

/// 解析题库文件
pub fn import_question_file(file_path: &str, options: &ImportOptions) -> Result<ImportReportDto, String> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("文件不存在: {}", file_path));
    }

    let result = importer(options).parse_file(path);
    let validation = options.validate.then(|| validate(&result.questions));

    Ok(ImportReportDto { result, validation })
}

/// 解析已转换为 HTML 的 Word 内容
pub fn import_word_html(html: &str, options: &ImportOptions) -> ImportReportDto {
    let parser = WordBankParser::with_config(ParserConfig {
        report_skipped_blocks: options.report_skipped_blocks,
    });
    let result = parser.parse_html(html, Vec::new());
    let validation = options.validate.then(|| validate(&result.questions));

    ImportReportDto { result, validation }
}

/// 校验题目列表
pub fn validate_questions(questions: Vec<ParsedQuestion>) -> ValidationReport {
    validate(&questions)
}
