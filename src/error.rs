pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("不支持的文件格式: {0}")]
    UnsupportedFormat(String),

    #[error("文件过大: {0}")]
    FileTooLarge(String),

    #[error("DOCX解析错误: {0}")]
    Docx(String),

    #[error("Excel解析错误: {0}")]
    Excel(String),

    #[error("未授权: {0}")]
    Unauthorized(String),

    #[error("未找到: {0}")]
    NotFound(String),

    #[error("上游服务返回状态码 {0}")]
    Upstream(u16),

    #[error("HTTP错误: {0}")]
    Http(#[from] reqwest::Error),

    #[error("数据库错误: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),
}
