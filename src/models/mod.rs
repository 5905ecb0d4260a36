use serde::{Deserialize, Serialize};

/// 题目类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    SingleChoice,
    MultipleChoice,
    FillBlank,
    TrueFalse,
    ShortAnswer,
}

impl QuestionType {
    /// 从题库中的类型标签解析，无法识别时按单选题处理
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "单选题" | "单选" | "单项选择题" | "SINGLE_CHOICE" => QuestionType::SingleChoice,
            "多选题" | "多选" | "多项选择题" | "MULTIPLE_CHOICE" => QuestionType::MultipleChoice,
            "填空题" | "填空" | "FILL_BLANK" => QuestionType::FillBlank,
            "判断题" | "判断" | "TRUE_FALSE" => QuestionType::TrueFalse,
            "简答题" | "简答" | "问答题" | "SHORT_ANSWER" => QuestionType::ShortAnswer,
            _ => QuestionType::SingleChoice,
        }
    }

    pub fn is_choice(self) -> bool {
        matches!(self, QuestionType::SingleChoice | QuestionType::MultipleChoice)
    }
}

/// 难度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// 无法识别的标签默认为简单
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "简单" | "容易" | "EASY" => Difficulty::Easy,
            "中等" | "一般" | "适中" | "MEDIUM" => Difficulty::Medium,
            "困难" | "较难" | "难" | "HARD" => Difficulty::Hard,
            _ => Difficulty::Easy,
        }
    }
}

/// 从题库文档中解析出的题目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedQuestion {
    pub title: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub difficulty: Difficulty,
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// 选择题为选项文本（多选以逗号连接），其他题型为原文答案
    pub correct_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl ParsedQuestion {
    pub fn options(&self) -> &[String] {
        self.options.as_deref().unwrap_or(&[])
    }

    pub fn answer_key(&self) -> AnswerKey<'_> {
        AnswerKey {
            question_type: self.question_type,
            options: self.options(),
            correct_answer: &self.correct_answer,
        }
    }
}

/// 单次解析的结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub success: bool,
    pub questions: Vec<ParsedQuestion>,
    pub errors: Vec<String>,
    pub total_count: usize,
}

impl ParseResult {
    pub fn completed(questions: Vec<ParsedQuestion>, errors: Vec<String>) -> Self {
        let total_count = questions.len();
        Self {
            success: true,
            questions,
            errors,
            total_count,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            questions: Vec::new(),
            errors: vec![message.into()],
            total_count: 0,
        }
    }
}

/// 校验结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: Vec<ParsedQuestion>,
    pub invalid: Vec<String>,
}

/// 判分所需的最小题目信息
#[derive(Debug, Clone, Copy)]
pub struct AnswerKey<'a> {
    pub question_type: QuestionType,
    pub options: &'a [String],
    pub correct_answer: &'a str,
}

pub const UNANSWERED_MARKERS: [&str; 2] = ["未作答", "unanswered"];

/// 用户作答，文本作答也可能是 JSON 数组字面量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserAnswer {
    Text(String),
    List(Vec<String>),
}

impl UserAnswer {
    pub fn is_blank(&self) -> bool {
        match self {
            UserAnswer::Text(text) => {
                let text = text.trim();
                text.is_empty() || UNANSWERED_MARKERS.contains(&text)
            }
            UserAnswer::List(items) => items.iter().all(|item| item.trim().is_empty()),
        }
    }
}

impl From<&str> for UserAnswer {
    fn from(value: &str) -> Self {
        UserAnswer::Text(value.to_string())
    }
}

impl From<String> for UserAnswer {
    fn from(value: String) -> Self {
        UserAnswer::Text(value)
    }
}

impl From<Vec<String>> for UserAnswer {
    fn from(value: Vec<String>) -> Self {
        UserAnswer::List(value)
    }
}

/// 试卷回顾中的单道题
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewQuestion {
    pub question_id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub title: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_answer: String,
    #[serde(default)]
    pub user_answer: Option<UserAnswer>,
    #[serde(default)]
    pub explanation: Option<String>,
    /// 服务端给出的判定结果（简答题由 AI 评分）
    #[serde(default)]
    pub server_correct: Option<bool>,
    #[serde(default)]
    pub ai_score: Option<f64>,
}

/// 一份试卷的作答回顾
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperReview {
    pub paper_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub questions: Vec<ReviewQuestion>,
    #[serde(default)]
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedItem {
    pub question_id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub answered: bool,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedReview {
    pub paper_id: String,
    pub items: Vec<GradedItem>,
    pub correct_count: usize,
    pub answered_count: usize,
    pub total: usize,
    pub accuracy: f64,
}

/// 回顾数据的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewOrigin {
    Primary,
    Snapshot,
}
