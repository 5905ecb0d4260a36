use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tiku::commands::{self, CheckAnswerInput, ImportOptions};
use tiku::config::AppConfig;
use tiku::models::{QuestionType, UserAnswer};
use tiku::services::{HttpReviewSource, SnapshotStore, TieredReviewRepository};
use tiku::utils;

#[derive(Parser)]
#[command(name = "tiku")]
#[command(about = "题库导入与判分工具", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 解析 Word/Excel 题库文件
    Parse {
        file: PathBuf,

        /// 同时输出校验报告
        #[arg(long)]
        validate: bool,

        /// 报告未能识别为题目的段落
        #[arg(long)]
        report_skipped: bool,
    },

    /// 判定单题作答
    Check {
        /// 题型，如 单选题 / MULTIPLE_CHOICE
        #[arg(long = "type")]
        question_type: String,

        #[arg(long)]
        correct: String,

        /// 作答，多个作答可写成 JSON 数组
        #[arg(long)]
        answer: String,

        #[arg(long = "option")]
        options: Vec<String>,
    },

    /// 加载并判分试卷回顾
    Review { paper_id: String },

    /// 列出本地缓存的试卷回顾
    Snapshots,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::from_env()?;
    utils::init_logging(config.log_level).context("初始化日志失败")?;

    match cli.command {
        Commands::Parse {
            file,
            validate,
            report_skipped,
        } => {
            let options = ImportOptions {
                report_skipped_blocks: report_skipped || config.report_skipped_blocks,
                validate,
            };
            let report = commands::import_question_file(&file.to_string_lossy(), &options)
                .map_err(anyhow::Error::msg)?;
            print_json(&report)?;
        }
        Commands::Check {
            question_type,
            correct,
            answer,
            options,
        } => {
            let input = CheckAnswerInput {
                question_type: QuestionType::from_label(&question_type),
                options,
                correct_answer: correct,
                user_answer: Some(UserAnswer::Text(answer)),
            };
            print_json(&commands::check_user_answer(&input))?;
        }
        Commands::Review { paper_id } => {
            let Some(base_url) = config.api_base_url.clone() else {
                bail!("未配置 TIKU_API_BASE_URL");
            };
            let source =
                HttpReviewSource::new(&base_url, config.api_token.clone(), config.request_timeout())?;
            let snapshots = SnapshotStore::open(&config.snapshot_db)
                .with_context(|| format!("打开快照数据库失败: {}", config.snapshot_db.display()))?;
            let repo = TieredReviewRepository::new(Box::new(source), snapshots);

            let dto = commands::load_paper_review(&repo, &paper_id, config.short_answer_pass_score)
                .await
                .map_err(anyhow::Error::msg)?;
            print_json(&dto)?;
        }
        Commands::Snapshots => {
            let snapshots = SnapshotStore::open(&config.snapshot_db)
                .with_context(|| format!("打开快照数据库失败: {}", config.snapshot_db.display()))?;
            print_json(&snapshots.list()?)?;
        }
    }

    Ok(())
}
