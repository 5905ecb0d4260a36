// 命令模块
// 提供供命令行及上层界面调用的接口

pub mod answer;
pub mod parser;
pub mod review;

pub use answer::{check_user_answer, check_user_answers, CheckAnswerDto, CheckAnswerInput};

pub use parser::{
    import_question_file,
    import_word_html,
    validate_questions,
    ImportOptions,
    ImportReportDto,
};

pub use review::{load_paper_review, ReviewDto};
