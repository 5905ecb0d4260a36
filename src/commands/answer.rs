use crate::models::{AnswerKey, QuestionType, UserAnswer};
use crate::services::answer::check_answer;
use serde::{Deserialize, Serialize};

/// 判分请求
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckAnswerInput {
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_answer: String,
    pub user_answer: Option<UserAnswer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckAnswerDto {
    pub is_correct: bool,
}

/// 判定单题作答
pub fn check_user_answer(input: &CheckAnswerInput) -> CheckAnswerDto {
    let is_correct = input
        .user_answer
        .as_ref()
        .map(|answer| {
            check_answer(
                AnswerKey {
                    question_type: input.question_type,
                    options: &input.options,
                    correct_answer: &input.correct_answer,
                },
                answer,
            )
        })
        .unwrap_or(false);

    CheckAnswerDto { is_correct }
}

/// 批量判定，通常来自一份 JSON 作答记录
pub fn check_user_answers(inputs: &[CheckAnswerInput]) -> Vec<CheckAnswerDto> {
    inputs.iter().map(check_user_answer).collect()
}
