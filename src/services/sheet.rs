//! Excel 题库行映射
//! 第一行为表头，其余每行按列位置映射为一道题目

use crate::models::{Difficulty, ParsedQuestion, QuestionType};
use log::debug;

/// 表头行，导出模板时使用同样的列顺序
pub const SHEET_COLUMNS: [&str; 8] = [
    "题目", "题型", "难度", "科目", "正确答案", "答案解析", "选项", "标签",
];

fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(|s| s.trim()).unwrap_or_default()
}

fn split_cell(value: &str, separator: char) -> Option<Vec<String>> {
    let items: Vec<String> = value
        .split(separator)
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect();
    (!items.is_empty()).then_some(items)
}

/// 单行转换为题目，题目或答案为空时返回 None
pub fn question_from_row(row: &[String]) -> Option<ParsedQuestion> {
    let title = cell(row, 0);
    let correct_answer = cell(row, 4);
    if title.is_empty() || correct_answer.is_empty() {
        return None;
    }

    let question_type = QuestionType::from_label(cell(row, 1));
    let explanation = cell(row, 5);

    Some(ParsedQuestion {
        title: title.to_string(),
        question_type,
        difficulty: Difficulty::from_label(cell(row, 2)),
        subject: cell(row, 3).to_string(),
        options: if question_type.is_choice() {
            split_cell(cell(row, 6), '|')
        } else {
            None
        },
        correct_answer: correct_answer.to_string(),
        explanation: (!explanation.is_empty()).then(|| explanation.to_string()),
        tags: split_cell(cell(row, 7), ','),
    })
}

/// 跳过表头后逐行转换
pub fn questions_from_rows(rows: &[Vec<String>]) -> Vec<ParsedQuestion> {
    rows.iter()
        .enumerate()
        .skip(1)
        .filter_map(|(index, row)| {
            let question = question_from_row(row);
            if question.is_none() {
                debug!("Excel 第 {} 行缺少题目或答案，已跳过", index + 1);
            }
            question
        })
        .collect()
}
