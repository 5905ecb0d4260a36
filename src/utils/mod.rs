use log::LevelFilter;
use std::path::PathBuf;

pub fn get_app_data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("tiku");
    path
}

pub fn get_snapshot_db_path() -> PathBuf {
    let mut path = get_app_data_dir();
    path.push("review_snapshots.db");
    path
}

/// 初始化日志，输出到 stderr，stdout 留给 JSON 结果
pub fn init_logging(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
}
