//! 试卷回顾数据源
//! 主数据源（后端接口）优先，失败时回退到按试卷 ID 缓存的本地快照；
//! 判分统一走 `check_answer`，简答题只采信服务端评分

use crate::error::{Error, Result};
use crate::models::{
    AnswerKey, GradedItem, GradedReview, PaperReview, QuestionType, ReviewOrigin, ReviewQuestion,
};
use crate::services::answer::check_answer;
use crate::services::snapshot::SnapshotStore;
use async_trait::async_trait;
use log::{info, warn};

/// 能按试卷 ID 提供回顾数据的来源
#[async_trait]
pub trait ReviewSource: Send + Sync {
    async fn fetch_review(&self, paper_id: &str) -> Result<PaperReview>;
}

/// 加载结果及其来源
#[derive(Debug, Clone)]
pub struct LoadedReview {
    pub review: PaperReview,
    pub origin: ReviewOrigin,
}

/// 两级数据源：主数据源 + 本地快照
pub struct TieredReviewRepository {
    primary: Box<dyn ReviewSource>,
    snapshots: SnapshotStore,
}

impl TieredReviewRepository {
    pub fn new(primary: Box<dyn ReviewSource>, snapshots: SnapshotStore) -> Self {
        Self { primary, snapshots }
    }

    /// 主数据源成功时刷新快照；失败时回退快照，没有快照则返回主数据源的错误。
    /// 未授权不回退。
    pub async fn load(&self, paper_id: &str) -> Result<LoadedReview> {
        match self.primary.fetch_review(paper_id).await {
            Ok(mut review) => {
                if review.paper_id.is_empty() {
                    review.paper_id = paper_id.to_string();
                }
                if let Err(e) = self.snapshots.save(&review) {
                    warn!("刷新试卷 {} 的本地快照失败: {}", paper_id, e);
                }
                Ok(LoadedReview {
                    review,
                    origin: ReviewOrigin::Primary,
                })
            }
            Err(Error::Unauthorized(msg)) => Err(Error::Unauthorized(msg)),
            Err(primary_error) => {
                warn!("加载试卷 {} 失败，尝试本地快照: {}", paper_id, primary_error);
                match self.snapshots.load(paper_id) {
                    Ok(Some(review)) => {
                        info!("试卷 {} 使用本地快照", paper_id);
                        Ok(LoadedReview {
                            review,
                            origin: ReviewOrigin::Snapshot,
                        })
                    }
                    Ok(None) => Err(primary_error),
                    Err(e) => {
                        warn!("读取试卷 {} 的本地快照失败: {}", paper_id, e);
                        Err(primary_error)
                    }
                }
            }
        }
    }
}

fn grade_question(question: &ReviewQuestion, short_answer_pass_score: f64) -> GradedItem {
    let answer = question.user_answer.as_ref().filter(|answer| !answer.is_blank());

    let is_correct = match (answer, question.question_type) {
        (None, _) => false,
        (Some(_), QuestionType::ShortAnswer) => question.server_correct.unwrap_or_else(|| {
            question
                .ai_score
                .is_some_and(|score| score >= short_answer_pass_score)
        }),
        (Some(answer), question_type) => check_answer(
            AnswerKey {
                question_type,
                options: &question.options,
                correct_answer: &question.correct_answer,
            },
            answer,
        ),
    };

    GradedItem {
        question_id: question.question_id.clone(),
        question_type: question.question_type,
        answered: answer.is_some(),
        is_correct,
    }
}

/// 对整份试卷逐题判分
pub fn grade_review(review: &PaperReview, short_answer_pass_score: f64) -> GradedReview {
    let items: Vec<GradedItem> = review
        .questions
        .iter()
        .map(|question| grade_question(question, short_answer_pass_score))
        .collect();

    let total = items.len();
    let correct_count = items.iter().filter(|item| item.is_correct).count();
    let answered_count = items.iter().filter(|item| item.answered).count();
    let accuracy = if total == 0 {
        0.0
    } else {
        correct_count as f64 / total as f64
    };

    GradedReview {
        paper_id: review.paper_id.clone(),
        items,
        correct_count,
        answered_count,
        total,
        accuracy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserAnswer;

    enum FakeSource {
        Ready(PaperReview),
        Offline,
        Unauthorized,
    }

    #[async_trait]
    impl ReviewSource for FakeSource {
        async fn fetch_review(&self, paper_id: &str) -> Result<PaperReview> {
            match self {
                FakeSource::Ready(review) => Ok(review.clone()),
                FakeSource::Offline => Err(Error::Upstream(503)),
                FakeSource::Unauthorized => Err(Error::Unauthorized(paper_id.to_string())),
            }
        }
    }

    fn question(
        id: &str,
        question_type: QuestionType,
        options: &[&str],
        correct: &str,
        answer: Option<UserAnswer>,
    ) -> ReviewQuestion {
        ReviewQuestion {
            question_id: id.to_string(),
            question_type,
            title: format!("题目 {}", id),
            options: options.iter().map(|s| s.to_string()).collect(),
            correct_answer: correct.to_string(),
            user_answer: answer,
            explanation: None,
            server_correct: None,
            ai_score: None,
        }
    }

    fn paper(paper_id: &str, title: &str) -> PaperReview {
        PaperReview {
            paper_id: paper_id.to_string(),
            title: title.to_string(),
            questions: vec![question(
                "q1",
                QuestionType::SingleChoice,
                &["甲", "乙"],
                "A",
                Some("甲".into()),
            )],
            submitted_at: None,
        }
    }

    #[tokio::test]
    async fn test_primary_success_refreshes_snapshot() {
        let store = SnapshotStore::open_in_memory().unwrap();
        let repo = TieredReviewRepository::new(
            Box::new(FakeSource::Ready(paper("p1", "最新"))),
            store.clone(),
        );

        let loaded = repo.load("p1").await.unwrap();
        assert_eq!(loaded.origin, ReviewOrigin::Primary);
        assert_eq!(store.load("p1").unwrap().unwrap().title, "最新");
    }

    #[tokio::test]
    async fn test_falls_back_to_snapshot() {
        let store = SnapshotStore::open_in_memory().unwrap();
        store.save(&paper("p1", "缓存")).unwrap();
        let repo = TieredReviewRepository::new(Box::new(FakeSource::Offline), store);

        let loaded = repo.load("p1").await.unwrap();
        assert_eq!(loaded.origin, ReviewOrigin::Snapshot);
        assert_eq!(loaded.review.title, "缓存");

        let missing = repo.load("p2").await;
        assert!(matches!(missing, Err(Error::Upstream(503))));
    }

    #[tokio::test]
    async fn test_unauthorized_does_not_fall_back() {
        let store = SnapshotStore::open_in_memory().unwrap();
        store.save(&paper("p1", "缓存")).unwrap();
        let repo = TieredReviewRepository::new(Box::new(FakeSource::Unauthorized), store);

        assert!(matches!(repo.load("p1").await, Err(Error::Unauthorized(_))));
    }

    #[test]
    fn test_grade_review() {
        let mut short = question("q5", QuestionType::ShortAnswer, &[], "所有权", Some("所有权".into()));
        short.ai_score = Some(72.0);
        let mut overridden = question("q6", QuestionType::ShortAnswer, &[], "借用", Some("借用".into()));
        overridden.server_correct = Some(false);
        overridden.ai_score = Some(95.0);

        let review = PaperReview {
            paper_id: "p1".to_string(),
            title: "综合".to_string(),
            questions: vec![
                question("q1", QuestionType::SingleChoice, &["甲", "乙"], "A", Some("甲".into())),
                question("q2", QuestionType::MultipleChoice, &["X", "Y", "Z"], "A,C", Some(UserAnswer::List(vec!["X".to_string()]))),
                question("q3", QuestionType::TrueFalse, &[], "正确", Some("未作答".into())),
                question("q4", QuestionType::FillBlank, &[], "猫", None),
                short,
                overridden,
            ],
            submitted_at: None,
        };

        let graded = grade_review(&review, 60.0);
        let correct: Vec<bool> = graded.items.iter().map(|item| item.is_correct).collect();
        assert_eq!(correct, vec![true, false, false, false, true, false]);
        assert_eq!(graded.correct_count, 2);
        assert_eq!(graded.answered_count, 4);
        assert_eq!(graded.total, 6);
        assert!((graded.accuracy - 2.0 / 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_grade_empty_review() {
        let review = PaperReview {
            paper_id: "p0".to_string(),
            title: String::new(),
            questions: Vec::new(),
            submitted_at: None,
        };
        let graded = grade_review(&review, 60.0);
        assert_eq!(graded.total, 0);
        assert_eq!(graded.accuracy, 0.0);
    }
}
