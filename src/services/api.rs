//! 后端接口数据源
//! 只覆盖试卷回顾一个只读接口，携带 Bearer token

use crate::error::{Error, Result};
use crate::models::PaperReview;
use crate::services::review::ReviewSource;
use async_trait::async_trait;
use log::debug;
use reqwest::{StatusCode, Url};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpReviewSource {
    http_client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpReviewSource {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("后端地址无效 {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!("后端地址无效: {}", base_url)));
        }

        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url,
            token,
        })
    }

    /// 试卷 ID 作为单个路径段编码，不会改变请求路径
    fn review_url(&self, paper_id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["exam-records", paper_id, "review"]);
        }
        url
    }
}

#[async_trait]
impl ReviewSource for HttpReviewSource {
    async fn fetch_review(&self, paper_id: &str) -> Result<PaperReview> {
        let url = self.review_url(paper_id);
        debug!("GET {}", url);

        let mut request = self.http_client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        match response.status() {
            status if status.is_success() => Ok(response.json::<PaperReview>().await?),
            StatusCode::UNAUTHORIZED => Err(Error::Unauthorized(format!("访问试卷 {} 需要重新登录", paper_id))),
            StatusCode::NOT_FOUND => Err(Error::NotFound(format!("试卷 {}", paper_id))),
            status => Err(Error::Upstream(status.as_u16())),
        }
    }
}
