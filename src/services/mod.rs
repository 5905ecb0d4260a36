// 服务模块
// 提供题库解析、校验、判分与试卷回顾等核心逻辑

pub mod answer;
pub mod api;
pub mod document;
pub mod parser;
pub mod review;
pub mod sheet;
pub mod snapshot;
pub mod validator;

pub use answer::{check_answer, letter_index, option_letter, OPTION_LETTERS};

pub use api::HttpReviewSource;

pub use document::{
    extract_docx_text,
    extract_sheet_rows,
    DocumentKind,
    ExtractedText,
    QuestionImporter,
    MAX_DOCUMENT_SIZE,
};

pub use parser::{
    extract_options,
    option_slots,
    parse_block,
    parse_word_text,
    resolve_answer_letters,
    split_blocks,
    strip_html,
    ParserConfig,
    WordBankParser,
};

pub use review::{grade_review, LoadedReview, ReviewSource, TieredReviewRepository};

pub use sheet::{question_from_row, questions_from_rows, SHEET_COLUMNS};

pub use snapshot::{SnapshotEntry, SnapshotStore};

pub use validator::validate;
