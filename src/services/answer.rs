//! 答案判定
//! 练习详情与试卷回顾共用同一个判定函数，兼容字母/文本、JSON 数组/逗号列表等多种作答编码

use crate::models::{AnswerKey, QuestionType, UserAnswer};
use std::collections::BTreeSet;

/// 选项字母标记，A 对应第 0 个选项
pub const OPTION_LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

/// 填空题答案分隔符
const BLANK_SEPARATORS: [char; 4] = ['，', '、', '；', ','];

/// 选项下标转字母
pub fn option_letter(index: usize) -> Option<char> {
    u8::try_from(index)
        .ok()
        .filter(|i| *i < 26)
        .map(|i| char::from(b'A' + i))
}

/// 单个字母（不区分大小写）转选项下标
pub fn letter_index(letter: &str) -> Option<usize> {
    let mut chars = letter.trim().chars();
    let c = chars.next()?;
    if chars.next().is_some() || !c.is_ascii_alphabetic() {
        return None;
    }
    Some(usize::from(c.to_ascii_uppercase() as u8 - b'A'))
}

fn is_choice_letter(token: &str) -> bool {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => OPTION_LETTERS.contains(&c.to_ascii_uppercase()),
        _ => false,
    }
}

/// 判定用户作答是否正确。简答题永远返回 false，其正确性只以服务端评分为准。
pub fn check_answer(key: AnswerKey<'_>, user_answer: &UserAnswer) -> bool {
    if user_answer.is_blank() || key.correct_answer.trim().is_empty() {
        return false;
    }

    match key.question_type {
        QuestionType::SingleChoice => {
            check_single_choice(key.options, key.correct_answer, &single_text(user_answer))
        }
        QuestionType::TrueFalse => {
            normalize_judgement(key.correct_answer) == normalize_judgement(&single_text(user_answer))
        }
        QuestionType::MultipleChoice => {
            check_multiple_choice(key.options, key.correct_answer, &list_items(user_answer))
        }
        QuestionType::FillBlank => check_fill_blank(key.correct_answer, user_answer),
        QuestionType::ShortAnswer => false,
    }
}

/// 解析 JSON 数组字面量，非数组返回 None
fn decode_list(text: &str) -> Option<Vec<String>> {
    let trimmed = text.trim();
    if !trimmed.starts_with('[') {
        return None;
    }
    let values: Vec<serde_json::Value> = serde_json::from_str(trimmed).ok()?;
    Some(
        values
            .into_iter()
            .map(|value| match value {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
    )
}

fn single_text(answer: &UserAnswer) -> String {
    let text = match answer {
        UserAnswer::Text(text) => decode_list(text)
            .map(|items| items.join(","))
            .unwrap_or_else(|| text.clone()),
        UserAnswer::List(items) => items.join(","),
    };
    text.trim().to_string()
}

fn split_list(text: &str) -> Vec<String> {
    decode_list(text)
        .unwrap_or_else(|| text.split([',', '，']).map(str::to_string).collect())
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn list_items(answer: &UserAnswer) -> Vec<String> {
    match answer {
        UserAnswer::Text(text) => split_list(text),
        UserAnswer::List(items) => items
            .iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect(),
    }
}

fn check_single_choice(options: &[String], correct: &str, user: &str) -> bool {
    let correct = correct.trim();
    let correct_is_letter = letter_index(correct).is_some();

    // 作答为选项文本
    if let Some(index) = options.iter().position(|option| option.trim() == user) {
        if correct_is_letter {
            let matched = option_letter(index)
                .map(|letter| correct.eq_ignore_ascii_case(&letter.to_string()))
                .unwrap_or(false);
            if matched {
                return true;
            }
        } else if options[index].trim() == correct {
            return true;
        }
    }

    // 作答为选项字母
    if let Some(text) = letter_index(user).and_then(|index| options.get(index)) {
        if text.trim() == correct {
            return true;
        }
    }

    user == correct
}

fn normalize_judgement(value: &str) -> String {
    let lowered = value.trim().to_lowercase();
    match lowered.as_str() {
        "正确" => "true".to_string(),
        "错误" => "false".to_string(),
        _ => lowered,
    }
}

fn check_multiple_choice(options: &[String], correct: &str, user: &[String]) -> bool {
    let correct_items = split_list(correct);
    let letter_format =
        !correct_items.is_empty() && correct_items.iter().all(|item| is_choice_letter(item));

    if letter_format {
        let mut expected: Vec<String> = correct_items.iter().map(|item| item.to_uppercase()).collect();
        let mut selected: Vec<String> = user
            .iter()
            .map(|item| {
                match options.iter().position(|option| option.trim() == item) {
                    Some(index) => option_letter(index)
                        .map(String::from)
                        .unwrap_or_else(|| item.clone()),
                    None if is_choice_letter(item) => item.to_uppercase(),
                    None => item.clone(),
                }
            })
            .collect();
        expected.sort();
        selected.sort();
        expected == selected
    } else {
        let mut expected = correct_items;
        let mut selected = user.to_vec();
        expected.sort();
        selected.sort();
        expected == selected
    }
}

fn blank_tokens(text: &str) -> Vec<String> {
    text.split(BLANK_SEPARATORS)
        .map(|token| token.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase())
        .filter(|token| !token.is_empty())
        .collect()
}

fn check_fill_blank(correct: &str, answer: &UserAnswer) -> bool {
    let expected = blank_tokens(correct);
    let given: Vec<String> = match answer {
        UserAnswer::Text(text) => match decode_list(text) {
            Some(items) => items.iter().flat_map(|item| blank_tokens(item)).collect(),
            None => blank_tokens(text),
        },
        UserAnswer::List(items) => items.iter().flat_map(|item| blank_tokens(item)).collect(),
    };

    match expected.len() {
        0 => given.is_empty(),
        // 单个空只要求作答中包含该答案
        1 => given.contains(&expected[0]),
        _ => {
            expected.len() == given.len()
                && expected.iter().collect::<BTreeSet<_>>() == given.iter().collect::<BTreeSet<_>>()
        }
    }
}
