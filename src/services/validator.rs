use crate::models::{ParsedQuestion, ValidationReport};

/// 提交前校验题目，返回合格题目与"第N题: 原因"形式的问题列表
pub fn validate(questions: &[ParsedQuestion]) -> ValidationReport {
    let mut report = ValidationReport::default();

    for (index, question) in questions.iter().enumerate() {
        let mut reasons = Vec::new();
        if question.title.trim().is_empty() {
            reasons.push("题目标题不能为空");
        }
        if question.correct_answer.trim().is_empty() {
            reasons.push("正确答案不能为空");
        }
        if question.question_type.is_choice() && question.options().is_empty() {
            reasons.push("选择题必须包含选项");
        }

        if reasons.is_empty() {
            report.valid.push(question.clone());
        } else {
            report
                .invalid
                .push(format!("第{}题: {}", index + 1, reasons.join(", ")));
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Difficulty, QuestionType};

    fn question(question_type: QuestionType, options: Option<Vec<String>>) -> ParsedQuestion {
        ParsedQuestion {
            title: "题目".to_string(),
            question_type,
            difficulty: Difficulty::Easy,
            subject: "通用".to_string(),
            options,
            correct_answer: "答案".to_string(),
            explanation: None,
            tags: None,
        }
    }

    #[test]
    fn test_missing_options_only_matters_for_choice_types() {
        let questions = vec![
            question(QuestionType::SingleChoice, None),
            question(QuestionType::MultipleChoice, Some(Vec::new())),
            question(QuestionType::ShortAnswer, None),
        ];
        let report = validate(&questions);

        assert_eq!(report.valid.len(), 1);
        assert_eq!(report.valid[0].question_type, QuestionType::ShortAnswer);
        assert_eq!(
            report.invalid,
            vec![
                "第1题: 选择题必须包含选项".to_string(),
                "第2题: 选择题必须包含选项".to_string(),
            ]
        );
    }

    #[test]
    fn test_reasons_are_joined() {
        let mut q = question(QuestionType::SingleChoice, None);
        q.title = "  ".to_string();
        q.correct_answer = String::new();

        let report = validate(&[q]);
        assert!(report.valid.is_empty());
        assert_eq!(
            report.invalid,
            vec!["第1题: 题目标题不能为空, 正确答案不能为空, 选择题必须包含选项".to_string()]
        );
    }
}
