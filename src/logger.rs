//! 로그 출력 모듈
//!
//! 레벨 필터링, 타임스탬프, 콘솔 + 날짜별 로그 파일의 이중 출력을 담당합니다.
//! 로그 기록 실패는 절대 호출자에게 전파되지 않습니다.

use chrono::{NaiveDate, SecondsFormat, Utc};
use clap::ValueEnum;
use colored::Colorize;
use indicatif::ProgressBar;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// 로그 파일 이름 접두어
pub const TOOL_NAME: &str = "coverbatch";

/// 로그 레벨 (debug < info < warn < error)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// 필터링 순위
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// 로그 라인에 표시되는 대문자 이름
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 포맷된 로그 한 줄
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// ISO-8601 타임스탬프 (UTC, 밀리초)
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    /// 현재 시각으로 로그 항목 생성
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            level,
            message: message.into(),
        }
    }

    /// `[<timestamp>] [<LEVEL>] <message>` 형식의 문자열
    pub fn format(&self) -> String {
        format!("[{}] [{}] {}", self.timestamp, self.level, self.message)
    }
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format())
    }
}

/// 로거 설정
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// 출력 임계 레벨
    pub level: LogLevel,
    /// 로그 파일 폴더 (None이면 파일 출력 비활성화)
    pub log_dir: Option<PathBuf>,
    /// 콘솔 컬러 출력 여부
    pub color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            log_dir: Some(PathBuf::from("logs")),
            color: true,
        }
    }
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_log_dir(mut self, log_dir: Option<PathBuf>) -> Self {
        self.log_dir = log_dir;
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }
}

/// 날짜별 로그 파일 이름 (예: `coverbatch-2024-05-01.log`)
pub fn log_file_name(date: NaiveDate) -> String {
    format!("{}-{}.log", TOOL_NAME, date.format("%Y-%m-%d"))
}

/// 콘솔 + 파일 이중 출력 로거
///
/// 실행당 한 번 생성되어 각 컴포넌트에 참조로 전달됩니다.
/// 파일 추가 쓰기는 `Mutex`로 직렬화되므로 여러 스레드에서 호출해도
/// 줄이 섞이지 않습니다.
pub struct Logger {
    level: LogLevel,
    color: bool,
    console: Mutex<Box<dyn Write + Send>>,
    file: Mutex<Option<File>>,
    file_path: Option<PathBuf>,
    progress: Option<ProgressBar>,
}

impl Logger {
    /// 표준 출력을 콘솔로 사용하는 로거 생성
    pub fn new(config: LoggerConfig) -> Self {
        Self::with_console(config, Box::new(io::stdout()))
    }

    /// 임의의 콘솔 출력 대상을 사용하는 로거 생성
    ///
    /// 로그 파일 초기화에 실패하면 콘솔에만 에러를 남기고
    /// 파일 출력을 끈 채로 계속 진행합니다.
    pub fn with_console(config: LoggerConfig, console: Box<dyn Write + Send>) -> Self {
        let mut logger = Self {
            level: config.level,
            color: config.color,
            console: Mutex::new(console),
            file: Mutex::new(None),
            file_path: None,
            progress: None,
        };

        if let Some(dir) = config.log_dir {
            let path = dir.join(log_file_name(Utc::now().date_naive()));
            match open_log_file(&dir, &path) {
                Ok(file) => {
                    logger.file = Mutex::new(Some(file));
                    logger.file_path = Some(path);
                }
                Err(e) => {
                    let entry = LogEntry::new(
                        LogLevel::Error,
                        format!("로그 파일 초기화 실패 ({}): {}", path.display(), e),
                    );
                    logger.write_console(&entry);
                }
            }
        }

        logger
    }

    /// 이미 열린 파일을 로그 파일로 사용
    #[cfg(test)]
    fn with_file_sink(mut self, file: File, path: PathBuf) -> Self {
        self.file = Mutex::new(Some(file));
        self.file_path = Some(path);
        self
    }

    /// 진행률 바 연결 (콘솔 출력 시 바를 잠시 숨김)
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// 현재 임계 레벨
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// 로그 파일 경로 (파일 출력이 꺼져 있으면 None)
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// 해당 레벨이 출력 대상인지 확인
    pub fn enabled(&self, level: LogLevel) -> bool {
        level.rank() >= self.level.rank()
    }

    /// 로그 기록
    pub fn log(&self, level: LogLevel, message: &str) {
        if !self.enabled(level) {
            return;
        }

        let entry = LogEntry::new(level, message);
        self.write_console(&entry);
        self.write_file(&entry);
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Debug, message.as_ref());
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Info, message.as_ref());
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Warn, message.as_ref());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Error, message.as_ref());
    }

    fn write_console(&self, entry: &LogEntry) {
        let line = entry.format();
        let line = if self.color {
            match entry.level {
                LogLevel::Debug => line.dimmed().to_string(),
                LogLevel::Info => line,
                LogLevel::Warn => line.yellow().to_string(),
                LogLevel::Error => line.red().to_string(),
            }
        } else {
            line
        };

        let write = || {
            if let Ok(mut console) = self.console.lock() {
                let _ = writeln!(console, "{}", line);
                let _ = console.flush();
            }
        };

        match &self.progress {
            Some(pb) => pb.suspend(write),
            None => write(),
        }
    }

    fn write_file(&self, entry: &LogEntry) {
        let result = match self.file.lock() {
            Ok(mut guard) => match guard.as_mut() {
                Some(file) => writeln!(file, "{}", entry.format()),
                None => return,
            },
            Err(_) => return,
        };

        if let Err(e) = result {
            let path = self
                .file_path
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            let diagnostic =
                LogEntry::new(LogLevel::Error, format!("로그 파일 기록 실패 ({}): {}", path, e));
            self.write_console(&diagnostic);
        }
    }
}

/// 로그 폴더와 파일을 준비하고 추가 모드로 열기
fn open_log_file(dir: &Path, path: &Path) -> io::Result<File> {
    fs::create_dir_all(dir)?;
    OpenOptions::new().create(true).append(true).open(path)
}
