//! Word 题库文本解析引擎
//! 按题号把纯文本切成题目块，再从每块中依次提取题干、【】元数据、选项、答案与解析

use crate::models::{Difficulty, ParseResult, ParsedQuestion, QuestionType};
use crate::services::answer::{letter_index, OPTION_LETTERS};
use log::{debug, info, warn};
use regex::Regex;
use std::sync::OnceLock;

const META_OPEN: char = '【';
const META_CLOSE: char = '】';
const ANSWER_OPEN: char = '（';
const ANSWER_CLOSE: char = '）';
const EXPLANATION_MARKER: &str = "答案详解";

/// 题号：数字 + "." + 空白
fn question_number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+\.\s").expect("valid question number pattern"))
}

fn leading_number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\s*\d+\.\s*").expect("valid leading number pattern"))
}

fn html_tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid html tag pattern"))
}

/// 解析器配置
#[derive(Debug, Clone, Default)]
pub struct ParserConfig {
    /// 为无法识别的题目块追加错误信息；默认静默跳过
    pub report_skipped_blocks: bool,
}

/// Word 题库解析器
#[derive(Debug, Default)]
pub struct WordBankParser {
    config: ParserConfig,
}

impl WordBankParser {
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// 解析转换器输出的 HTML
    pub fn parse_html(&self, html: &str, diagnostics: Vec<String>) -> ParseResult {
        self.parse_document(&strip_html(html), diagnostics)
    }

    pub fn parse_text(&self, text: &str) -> ParseResult {
        self.parse_document(text, Vec::new())
    }

    /// 解析整份文本，`diagnostics` 为文档转换阶段产生的提示，原样进入 `errors`
    pub fn parse_document(&self, text: &str, diagnostics: Vec<String>) -> ParseResult {
        let mut questions = Vec::new();
        let mut errors = diagnostics;

        for (index, block) in split_blocks(text).into_iter().enumerate() {
            match parse_block(block) {
                Some(question) => questions.push(question),
                None => {
                    debug!("跳过无法识别的题目块 #{}: {:.40}", index + 1, block);
                    if self.config.report_skipped_blocks {
                        errors.push(format!("第{}段未能识别为题目", index + 1));
                    }
                }
            }
        }

        info!("Word 题库解析完成，共 {} 道题目", questions.len());
        ParseResult::completed(questions, errors)
    }
}

/// 去掉全部 HTML 标签，并把 `&nbsp;` 还原为空格
pub fn strip_html(html: &str) -> String {
    html_tag_pattern().replace_all(html, "").replace("&nbsp;", " ")
}

/// 在每个题号处切分文本，题号前的内容丢弃
pub fn split_blocks(text: &str) -> Vec<&str> {
    // HTML 去标签后段落首尾相接，题号前可能紧贴上一题的文字
    let starts: Vec<usize> = question_number_pattern()
        .find_iter(text)
        .map(|m| m.start())
        .collect();

    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            text[start..end].trim()
        })
        .filter(|block| !block.is_empty())
        .collect()
}

/// 解析单个题目块，结构不符时返回 None
pub fn parse_block(block: &str) -> Option<ParsedQuestion> {
    let body = match leading_number_pattern().find(block) {
        Some(m) => &block[m.end()..],
        None => block,
    };

    let meta_start = body.find(META_OPEN)?;
    let title = body[..meta_start].trim();
    if title.is_empty() {
        return None;
    }

    let (tokens, meta_len) = read_metadata(&body[meta_start..]);
    if tokens.len() < 3 {
        return None;
    }
    let rest = &body[meta_start + meta_len..];

    let question_type = QuestionType::from_label(&tokens[0]);
    let difficulty = Difficulty::from_label(&tokens[1]);
    let subject = tokens[2].clone();
    let tags: Vec<String> = tokens[3..]
        .iter()
        .filter(|tag| !tag.is_empty())
        .cloned()
        .collect();

    let slots = if question_type.is_choice() {
        option_slots(option_span(rest))
    } else {
        Vec::new()
    };

    let raw_answer = answer_key(rest).unwrap_or_default();
    let correct_answer = if question_type.is_choice() {
        resolve_answer_letters(raw_answer, &slots)
    } else {
        raw_answer.trim().to_string()
    };
    let options = non_empty(slots);

    Some(ParsedQuestion {
        title: title.to_string(),
        question_type,
        difficulty,
        subject,
        options: (!options.is_empty()).then_some(options),
        correct_answer,
        explanation: extract_explanation(rest),
        tags: (!tags.is_empty()).then_some(tags),
    })
}

/// 读取紧随题干的一串【】标记，返回标记内容与消耗的字节数
fn read_metadata(text: &str) -> (Vec<String>, usize) {
    let mut tokens = Vec::new();
    let mut consumed = 0;

    loop {
        let remaining = &text[consumed..];
        let skipped = remaining.len() - remaining.trim_start().len();
        let candidate = &remaining[skipped..];
        if !candidate.starts_with(META_OPEN) {
            break;
        }
        let inner = &candidate[META_OPEN.len_utf8()..];
        let Some(close) = inner.find(META_CLOSE) else {
            break;
        };
        tokens.push(inner[..close].trim().to_string());
        consumed += skipped + META_OPEN.len_utf8() + close + META_CLOSE.len_utf8();
    }

    (tokens, consumed)
}

/// 选项区域：元数据之后到第一个"（"，"答案详解"作为次要边界
fn option_span(rest: &str) -> &str {
    let end = [rest.find(ANSWER_OPEN), rest.find(EXPLANATION_MARKER)]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(rest.len());
    &rest[..end]
}

/// 按 A. B. C. D. 的顺序扫描字母标记，每个标记占一个位置（内容可能为空，如纯图片选项）。
/// 第一个标记之前的文本视为第一个选项（上游转换丢失了 "A." 前缀的情况）。
pub fn option_slots(span: &str) -> Vec<String> {
    let mut markers: Vec<(usize, usize)> = Vec::new();
    let mut cursor = 0;

    for letter in OPTION_LETTERS {
        let marker = format!("{}.", letter);
        if let Some(offset) = span[cursor..].find(&marker) {
            let start = cursor + offset;
            cursor = start + marker.len();
            markers.push((start, cursor));
        }
    }

    let mut options = Vec::new();
    let head_end = markers.first().map(|&(start, _)| start).unwrap_or(span.len());
    let head = span[..head_end].trim();
    if !head.is_empty() {
        options.push(head.to_string());
    }

    for (i, &(_, content_start)) in markers.iter().enumerate() {
        let content_end = markers
            .get(i + 1)
            .map(|&(start, _)| start)
            .unwrap_or(span.len());
        options.push(span[content_start..content_end].trim().to_string());
    }

    options
}

/// 切出选项并去掉空内容
pub fn extract_options(span: &str) -> Vec<String> {
    non_empty(option_slots(span))
}

fn non_empty(slots: Vec<String>) -> Vec<String> {
    slots.into_iter().filter(|slot| !slot.is_empty()).collect()
}

/// 第一个全角括号组内的答案
fn answer_key(rest: &str) -> Option<&str> {
    let open = rest.find(ANSWER_OPEN)?;
    let inner = &rest[open + ANSWER_OPEN.len_utf8()..];
    let close = inner.find(ANSWER_CLOSE)?;
    Some(inner[..close].trim())
}

/// 把答案字母按位置换成选项文本；找不到对应选项或选项内容为空的字母记录警告后丢弃
pub fn resolve_answer_letters(raw: &str, options: &[String]) -> String {
    let mut letters: Vec<String> = Vec::new();
    for token in raw.split([',', '，', '、', ' ']) {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        if token.len() > 1 && token.chars().all(|c| c.is_ascii_alphabetic()) {
            letters.extend(token.chars().map(String::from));
        } else {
            letters.push(token.to_string());
        }
    }

    let mut resolved = Vec::new();
    for letter in letters {
        match letter_index(&letter).and_then(|index| options.get(index)) {
            Some(text) if !text.is_empty() => resolved.push(text.clone()),
            Some(_) => warn!("答案 \"{}\" 对应的选项内容为空，已忽略", letter),
            None if options.contains(&letter) => resolved.push(letter),
            None => warn!(
                "答案 \"{}\" 没有对应的选项（共 {} 个选项），已忽略",
                letter,
                options.len()
            ),
        }
    }

    resolved.join(",")
}

/// "答案详解：" 之后到行尾的文本
fn extract_explanation(rest: &str) -> Option<String> {
    let start = rest.find(EXPLANATION_MARKER)? + EXPLANATION_MARKER.len();
    let after = rest[start..].trim_start_matches(['：', ':']);
    let line = after.lines().next().unwrap_or_default().trim();
    (!line.is_empty()).then(|| line.to_string())
}

/// 使用默认配置解析纯文本
pub fn parse_word_text(text: &str) -> ParseResult {
    WordBankParser::new().parse_text(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::answer::check_answer;

    #[test]
    fn test_parse_single_choice_block() {
        let text = "1. Title【单选题】【简单】【Subject】A. Opt1B. Opt2C. Opt3（B）答案详解：because";
        let result = parse_word_text(text);

        assert!(result.success);
        assert_eq!(result.total_count, 1);
        let q = &result.questions[0];
        assert_eq!(q.title, "Title");
        assert_eq!(q.question_type, QuestionType::SingleChoice);
        assert_eq!(q.difficulty, Difficulty::Easy);
        assert_eq!(q.subject, "Subject");
        assert_eq!(
            q.options,
            Some(vec!["Opt1".to_string(), "Opt2".to_string(), "Opt3".to_string()])
        );
        assert_eq!(q.correct_answer, "Opt2");
        assert_eq!(q.explanation.as_deref(), Some("because"));
        assert!(q.tags.is_none());
    }

    #[test]
    fn test_multiple_choice_answer_resolves_to_texts() {
        let text = "1. 选出元音【多选题】【中等】【英语】A. XB. YC. Z（A,C）";
        let q = &parse_word_text(text).questions[0];

        assert_eq!(q.question_type, QuestionType::MultipleChoice);
        assert_eq!(q.difficulty, Difficulty::Medium);
        assert_eq!(q.correct_answer, "X,Z");
    }

    #[test]
    fn test_malformed_block_is_skipped_silently() {
        let text = "1. 第一题【单选题】【简单】【数学】A. 1B. 2（A）\n\
                    2. 缺少元数据的题目（A）\n\
                    3. 第三题【判断题】【困难】【常识】（正确）";
        let result = parse_word_text(text);

        assert!(result.success);
        assert!(result.errors.is_empty());
        assert_eq!(result.total_count, 2);
        assert_eq!(result.questions[1].question_type, QuestionType::TrueFalse);
        assert_eq!(result.questions[1].correct_answer, "正确");
        assert!(result.questions[1].options.is_none());
    }

    #[test]
    fn test_too_few_metadata_tokens_rejects_block() {
        assert!(parse_block("1. 题目【单选题】【简单】A. 甲B. 乙（A）").is_none());
        assert!(parse_block("1. 【单选题】【简单】【数学】A. 甲（A）").is_none());
    }

    #[test]
    fn test_report_skipped_blocks() {
        let parser = WordBankParser::with_config(ParserConfig {
            report_skipped_blocks: true,
        });
        let result = parser.parse_text("1. 正常【填空题】【简单】【语文】（床前明月光）\n2. 没有标记");

        assert!(result.success);
        assert_eq!(result.total_count, 1);
        assert_eq!(result.errors, vec!["第2段未能识别为题目".to_string()]);
    }

    #[test]
    fn test_missing_first_letter_marker() {
        let options = extract_options(" 北京B. 上海C. 广州");
        assert_eq!(options, vec!["北京", "上海", "广州"]);
    }

    #[test]
    fn test_unresolved_letter_is_dropped() {
        let options = vec!["甲".to_string(), "乙".to_string()];
        assert_eq!(resolve_answer_letters("A,D", &options), "甲");
        assert_eq!(resolve_answer_letters("AB", &options), "甲,乙");
        assert_eq!(resolve_answer_letters("B，A", &options), "乙,甲");
    }

    #[test]
    fn test_tags_and_explanation_line() {
        let text = "12. 光速约为多少【填空题】【困难】【物理】【光学】【常数】（3×10^8 m/s）答案详解：真空中的光速\n13. 下一题";
        let result = parse_word_text(text);
        let q = &result.questions[0];

        assert_eq!(q.title, "光速约为多少");
        assert_eq!(q.tags, Some(vec!["光学".to_string(), "常数".to_string()]));
        assert_eq!(q.correct_answer, "3×10^8 m/s");
        assert_eq!(q.explanation.as_deref(), Some("真空中的光速"));
        assert_eq!(result.total_count, 1);
    }

    #[test]
    fn test_split_blocks_ignores_preamble() {
        let blocks = split_blocks("题库说明\n1. 第一题\n2. 第二题");
        assert_eq!(blocks, vec!["1. 第一题", "2. 第二题"]);
    }

    #[test]
    fn test_split_blocks_after_latin_text() {
        let blocks = split_blocks("1. 第一题 because2. 第二题 v1.0 12. 第三题");
        assert_eq!(blocks, vec!["1. 第一题 because", "2. 第二题 v1.0", "12. 第三题"]);
    }

    #[test]
    fn test_parse_html_paragraphs_without_separator() {
        let html = "<p>1. T【单选题】【简单】【S】A. aB. b（A）答案详解：because</p>\
                    <p>2. T2【判断题】【简单】【S】（正确）</p>";
        let result = WordBankParser::new().parse_html(html, Vec::new());

        assert_eq!(result.total_count, 2);
        assert_eq!(result.questions[0].explanation.as_deref(), Some("because"));
        assert_eq!(result.questions[1].title, "T2");
        assert_eq!(result.questions[1].correct_answer, "正确");
    }

    #[test]
    fn test_empty_option_keeps_letter_positions() {
        let q = parse_block("1. 选图【单选题】【简单】【S】A. B. 乙C. 丙（B）").unwrap();

        assert_eq!(q.options, Some(vec!["乙".to_string(), "丙".to_string()]));
        assert_eq!(q.correct_answer, "乙");
        assert!(check_answer(q.answer_key(), &"乙".into()));
        assert!(!check_answer(q.answer_key(), &"丙".into()));

        let blank_key = parse_block("1. 选图【多选题】【简单】【S】A. B. 乙C. 丙（A,C）").unwrap();
        assert_eq!(blank_key.correct_answer, "丙");
    }

    #[test]
    fn test_option_slots() {
        assert_eq!(option_slots("A. B. 乙C. 丙"), vec!["", "乙", "丙"]);
        assert_eq!(extract_options("A. B. 乙C. 丙"), vec!["乙", "丙"]);
    }

    #[test]
    fn test_strip_html() {
        let html = "<p>1.&nbsp;标题【单选题】</p><p><b>A.</b> 甲</p>";
        assert_eq!(strip_html(html), "1. 标题【单选题】A. 甲");
    }

    #[test]
    fn test_parse_html_keeps_diagnostics() {
        let html = "<p>1. 标题【单选题】【简单】【数学】A. 甲B. 乙（B）</p>";
        let result = WordBankParser::new().parse_html(html, vec!["忽略了 1 张图片".to_string()]);

        assert_eq!(result.total_count, 1);
        assert_eq!(result.questions[0].correct_answer, "乙");
        assert_eq!(result.errors, vec!["忽略了 1 张图片".to_string()]);
    }
}
