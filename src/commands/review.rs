use crate::models::{GradedReview, PaperReview, ReviewOrigin};
use crate::services::review::{grade_review, TieredReviewRepository};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDto {
    pub origin: ReviewOrigin,
    pub review: PaperReview,
    pub graded: GradedReview,
}

/// 加载试卷回顾并判分
pub async fn load_paper_review(
    repo: &TieredReviewRepository,
    paper_id: &str,
    short_answer_pass_score: f64,
) -> Result<ReviewDto, String> {
    let loaded = repo.load(paper_id).await.map_err(|e| e.to_string())?;
    let graded = grade_review(&loaded.review, short_answer_pass_score);

    Ok(ReviewDto {
        origin: loaded.origin,
        review: loaded.review,
        graded,
    })
}
