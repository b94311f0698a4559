//! 통합 테스트 모듈
//!
//! 가짜 변환기로 배치 처리 흐름 전체를 테스트합니다.

#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use coverbatch::{ConversionJob, CoverEmbedder, EmbedError, Logger, LoggerConfig};

/// 호출을 기록하고, 이름에 특정 문자열이 들어간 파일은 실패시키는 변환기
#[derive(Default)]
struct FakeEmbedder {
    available: bool,
    fail_when_contains: Option<String>,
    calls: RefCell<Vec<ConversionJob>>,
}

impl FakeEmbedder {
    fn working() -> Self {
        Self {
            available: true,
            ..Default::default()
        }
    }

    fn failing_on(marker: &str) -> Self {
        Self {
            available: true,
            fail_when_contains: Some(marker.to_string()),
            ..Default::default()
        }
    }

    fn unavailable() -> Self {
        Self::default()
    }

    fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl CoverEmbedder for FakeEmbedder {
    fn is_available(&self) -> bool {
        self.available
    }

    fn embed(&self, job: &ConversionJob) -> Result<(), EmbedError> {
        self.calls.borrow_mut().push(job.clone());

        let name = job.input.file_name().unwrap().to_string_lossy().to_string();
        if let Some(ref marker) = self.fail_when_contains {
            if name.contains(marker.as_str()) {
                return Err(EmbedError::NonZeroExit {
                    code: Some(1),
                    stderr: "Invalid data found when processing input".to_string(),
                });
            }
        }

        fs::write(&job.output, b"tagged").unwrap();
        Ok(())
    }
}

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
    }
}

fn quiet_logger() -> Logger {
    Logger::with_console(
        LoggerConfig::new().with_log_dir(None).with_color(false),
        Box::new(io::sink()),
    )
}

/// 테스트용 파일 생성 헬퍼
fn create_file(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"ID3").unwrap();
    path
}

/// 입력 폴더, 커버 이미지, 출력 경로 구성
struct Workspace {
    _temp_dir: TempDir,
    input: PathBuf,
    cover: PathBuf,
    output: PathBuf,
}

fn setup_workspace(files: &[&str]) -> Workspace {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("album");
    fs::create_dir(&input).unwrap();
    for name in files {
        create_file(&input, name);
    }
    let cover = create_file(temp_dir.path(), "cover.jpg");
    let output = temp_dir.path().join("out").join("nested");

    Workspace {
        _temp_dir: temp_dir,
        input,
        cover,
        output,
    }
}

mod batch_tests {
    use super::*;
    use coverbatch::{BatchOptions, BatchProcessor};

    #[test]
    fn test_all_files_converted() {
        let ws = setup_workspace(&["a.mp3", "b.MP3", "c.wav", "notes.txt"]);
        let logger = quiet_logger();
        let embedder = FakeEmbedder::working();

        let processor = BatchProcessor::new(&logger, &embedder, BatchOptions::new()).unwrap();
        let result = processor
            .process_folder(&ws.input, &ws.cover, &ws.output)
            .unwrap();

        assert_eq!(result.total_files, 2);
        assert_eq!(result.succeeded, 2);
        assert_eq!(result.failed, 0);
        assert_eq!(result.skipped, 0);
        assert!(result.is_consistent());
        assert!(ws.output.join("a.mp3").exists());
        assert!(ws.output.join("b.MP3").exists());
        assert_eq!(result.bytes_written, 12);
    }

    #[test]
    fn test_jobs_use_cover_and_preserve_names() {
        let ws = setup_workspace(&["01 Track.mp3"]);
        let logger = quiet_logger();
        let embedder = FakeEmbedder::working();

        let processor = BatchProcessor::new(&logger, &embedder, BatchOptions::new()).unwrap();
        processor
            .process_folder(&ws.input, &ws.cover, &ws.output)
            .unwrap();

        let calls = embedder.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].input, ws.input.join("01 Track.mp3"));
        assert_eq!(calls[0].cover, ws.cover);
        assert_eq!(calls[0].output, ws.output.join("01 Track.mp3"));
    }

    #[test]
    fn test_single_failure_does_not_abort_batch() {
        let ws = setup_workspace(&["1.mp3", "2-bad.mp3", "3.mp3"]);
        let logger = quiet_logger();
        let embedder = FakeEmbedder::failing_on("bad");

        let processor = BatchProcessor::new(&logger, &embedder, BatchOptions::new()).unwrap();
        let result = processor
            .process_folder(&ws.input, &ws.cover, &ws.output)
            .unwrap();

        assert_eq!(embedder.call_count(), 3);
        assert_eq!(result.total_files, 3);
        assert_eq!(result.succeeded, 2);
        assert_eq!(result.failed, 1);
        assert_eq!(result.skipped, 0);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].file, ws.input.join("2-bad.mp3"));
        assert!(result.failures[0].reason.contains("Invalid data"));
    }

    #[test]
    fn test_second_run_skips_everything() {
        let ws = setup_workspace(&["a.mp3", "b.mp3", "c.mp3"]);
        let logger = quiet_logger();

        let first = FakeEmbedder::working();
        let processor = BatchProcessor::new(&logger, &first, BatchOptions::new()).unwrap();
        let result = processor
            .process_folder(&ws.input, &ws.cover, &ws.output)
            .unwrap();
        assert_eq!(result.succeeded, 3);

        let second = FakeEmbedder::working();
        let processor = BatchProcessor::new(&logger, &second, BatchOptions::new()).unwrap();
        let result = processor
            .process_folder(&ws.input, &ws.cover, &ws.output)
            .unwrap();

        assert_eq!(second.call_count(), 0);
        assert_eq!(result.succeeded, 0);
        assert_eq!(result.skipped, result.total_files);
        assert!(result.is_consistent());
    }

    #[test]
    fn test_partial_output_only_fills_gaps() {
        let ws = setup_workspace(&["a.mp3", "b.mp3", "c.mp3"]);
        fs::create_dir_all(&ws.output).unwrap();
        fs::write(ws.output.join("b.mp3"), b"existing").unwrap();
        let logger = quiet_logger();
        let embedder = FakeEmbedder::working();

        let processor = BatchProcessor::new(&logger, &embedder, BatchOptions::new()).unwrap();
        let result = processor
            .process_folder(&ws.input, &ws.cover, &ws.output)
            .unwrap();

        assert_eq!(result.succeeded, 2);
        assert_eq!(result.skipped, 1);
        assert_eq!(fs::read(ws.output.join("b.mp3")).unwrap(), b"existing");
        assert!(embedder
            .calls
            .borrow()
            .iter()
            .all(|job| job.input.file_name().unwrap() != "b.mp3"));
    }

    #[test]
    fn test_empty_folder_creates_output_and_returns_zero() {
        let ws = setup_workspace(&["readme.txt"]);
        let logger = quiet_logger();
        let embedder = FakeEmbedder::working();

        let processor = BatchProcessor::new(&logger, &embedder, BatchOptions::new()).unwrap();
        let result = processor
            .process_folder(&ws.input, &ws.cover, &ws.output)
            .unwrap();

        assert_eq!(result.total_files, 0);
        assert!(result.is_consistent());
        assert!(ws.output.is_dir());
        assert_eq!(embedder.call_count(), 0);
    }

    #[test]
    fn test_existing_output_folder_is_accepted() {
        let ws = setup_workspace(&["a.mp3"]);
        fs::create_dir_all(&ws.output).unwrap();
        let logger = quiet_logger();
        let embedder = FakeEmbedder::working();

        let processor = BatchProcessor::new(&logger, &embedder, BatchOptions::new()).unwrap();
        let result = processor
            .process_folder(&ws.input, &ws.cover, &ws.output)
            .unwrap();
        assert_eq!(result.succeeded, 1);
    }

    #[test]
    fn test_output_folder_creation_failure_is_fatal() {
        let ws = setup_workspace(&["a.mp3"]);
        let blocker = ws.input.parent().unwrap().join("blocker");
        fs::write(&blocker, b"file").unwrap();
        let logger = quiet_logger();
        let embedder = FakeEmbedder::working();

        let processor = BatchProcessor::new(&logger, &embedder, BatchOptions::new()).unwrap();
        let result = processor.process_folder(&ws.input, &ws.cover, &blocker.join("out"));

        assert!(matches!(
            result,
            Err(coverbatch::CoverError::CreateOutputDir { .. })
        ));
        assert_eq!(embedder.call_count(), 0);
    }

    #[test]
    fn test_pattern_narrows_candidates() {
        let ws = setup_workspace(&["live_1.mp3", "LIVE_2.mp3", "studio.mp3"]);
        let logger = quiet_logger();
        let embedder = FakeEmbedder::working();

        let options = BatchOptions::new().with_pattern(Some("live_*".to_string()));
        let processor = BatchProcessor::new(&logger, &embedder, options).unwrap();
        let result = processor
            .process_folder(&ws.input, &ws.cover, &ws.output)
            .unwrap();

        assert_eq!(result.total_files, 2);
        assert!(!ws.output.join("studio.mp3").exists());
    }

    #[test]
    fn test_plan_reports_skips_without_converting() {
        let ws = setup_workspace(&["a.mp3", "b.mp3"]);
        fs::create_dir_all(&ws.output).unwrap();
        fs::write(ws.output.join("a.mp3"), b"done").unwrap();
        let logger = quiet_logger();
        let embedder = FakeEmbedder::working();

        let processor = BatchProcessor::new(&logger, &embedder, BatchOptions::new()).unwrap();
        let mut planned = processor.plan(&ws.input, &ws.cover, &ws.output).unwrap();
        planned.sort_by(|a, b| a.job.input.cmp(&b.job.input));

        assert_eq!(planned.len(), 2);
        assert!(planned[0].will_skip);
        assert!(!planned[1].will_skip);
        assert_eq!(planned[1].job.output, ws.output.join("b.mp3"));
        assert_eq!(embedder.call_count(), 0);
    }

    #[test]
    fn test_summary_is_logged() {
        let ws = setup_workspace(&["a.mp3", "b-bad.mp3"]);
        let buffer = SharedBuffer::default();
        let logger = Logger::with_console(
            LoggerConfig::new().with_log_dir(None).with_color(false),
            Box::new(buffer.clone()),
        );
        let embedder = FakeEmbedder::failing_on("bad");

        let processor = BatchProcessor::new(&logger, &embedder, BatchOptions::new()).unwrap();
        processor
            .process_folder(&ws.input, &ws.cover, &ws.output)
            .unwrap();

        let output = buffer.contents();
        assert!(output.contains("처리 통계"));
        assert!(output.contains("전체 파일:    2"));
        assert!(output.contains("성공:         1"));
        assert!(output.contains("실패:         1"));
        assert!(output.contains(&ws.output.display().to_string()));
    }
}

mod run_tests {
    use super::*;
    use coverbatch::{run, BatchOptions, CoverError};

    #[test]
    fn test_text_cover_rejected_before_any_conversion() {
        let ws = setup_workspace(&["a.mp3"]);
        let bad_cover = create_file(ws.input.parent().unwrap(), "cover.txt");
        let logger = quiet_logger();
        let embedder = FakeEmbedder::working();

        let result = run(
            &logger,
            &embedder,
            &ws.input,
            &bad_cover,
            &ws.output,
            BatchOptions::new(),
            None,
        );

        assert!(matches!(
            result,
            Err(CoverError::UnsupportedCoverFormat { .. })
        ));
        assert_eq!(embedder.call_count(), 0);
        assert!(!ws.output.exists());
    }

    #[test]
    fn test_unavailable_binary_aborts_run() {
        let ws = setup_workspace(&["a.mp3", "b.mp3"]);
        let logger = quiet_logger();
        let embedder = FakeEmbedder::unavailable();

        let result = run(
            &logger,
            &embedder,
            &ws.input,
            &ws.cover,
            &ws.output,
            BatchOptions::new(),
            None,
        );

        assert!(matches!(result, Err(CoverError::FfmpegUnavailable { .. })));
        assert_eq!(embedder.call_count(), 0);
        assert!(!ws.output.exists());
    }

    #[test]
    fn test_missing_input_folder() {
        let ws = setup_workspace(&[]);
        let logger = quiet_logger();
        let embedder = FakeEmbedder::working();

        let result = run(
            &logger,
            &embedder,
            &ws.input.join("missing"),
            &ws.cover,
            &ws.output,
            BatchOptions::new(),
            None,
        );

        assert!(matches!(result, Err(CoverError::InputNotFound { .. })));
    }

    #[test]
    fn test_successful_run() {
        let ws = setup_workspace(&["a.mp3", "b.mp3"]);
        let logger = quiet_logger();
        let embedder = FakeEmbedder::working();

        let result = run(
            &logger,
            &embedder,
            &ws.input,
            &ws.cover,
            &ws.output,
            BatchOptions::new(),
            None,
        )
        .unwrap();

        assert_eq!(result.succeeded, 2);
        assert!(result.is_consistent());
    }
}

mod logger_tests {
    use super::*;
    use coverbatch::LogLevel;

    #[test]
    fn test_warn_threshold_hides_debug_and_info_everywhere() {
        let temp_dir = TempDir::new().unwrap();
        let buffer = SharedBuffer::default();
        let logger = Logger::with_console(
            LoggerConfig::new()
                .with_level(LogLevel::Warn)
                .with_log_dir(Some(temp_dir.path().join("logs")))
                .with_color(false),
            Box::new(buffer.clone()),
        );

        logger.debug("d");
        logger.info("i");
        let log_path = logger.file_path().unwrap().to_path_buf();
        assert!(buffer.contents().is_empty());
        assert!(fs::read_to_string(&log_path).unwrap().is_empty());

        logger.warn("w");
        logger.error("e");
        let file_contents = fs::read_to_string(&log_path).unwrap();
        assert_eq!(file_contents.lines().count(), 2);
        assert!(file_contents.contains("[WARN] w"));
        assert!(file_contents.contains("[ERROR] e"));
        assert_eq!(buffer.contents().lines().count(), 2);
    }

    #[test]
    fn test_log_file_name_uses_tool_and_date() {
        let temp_dir = TempDir::new().unwrap();
        let logger = Logger::with_console(
            LoggerConfig::new()
                .with_log_dir(Some(temp_dir.path().to_path_buf()))
                .with_color(false),
            Box::new(io::sink()),
        );

        let name = logger
            .file_path()
            .unwrap()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .to_string();
        assert!(name.starts_with("coverbatch-"));
        assert!(name.ends_with(".log"));
        assert_eq!(name.len(), "coverbatch-YYYY-MM-DD.log".len());
    }
}

mod error_tests {
    use coverbatch::{CoverError, EmbedError};
    use std::path::PathBuf;

    #[test]
    fn test_fatal_error_display() {
        let error = CoverError::InputNotFound {
            path: PathBuf::from("/nonexistent"),
        };
        assert!(error.to_string().contains("입력 폴더를 찾을 수 없습니다"));
    }

    #[test]
    fn test_exit_code_in_message() {
        let error = EmbedError::NonZeroExit {
            code: Some(183),
            stderr: "Output file is empty".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("183"));
        assert!(msg.contains("Output file is empty"));
    }
}

mod cli_tests {
    use clap::Parser;
    use coverbatch::{Args, LogLevel};
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["coverbatch", "/music/album", "cover.jpg"]);

        assert_eq!(args.log_level, LogLevel::Info);
        assert_eq!(args.output_folder(), PathBuf::from("/music/output"));
        assert_eq!(args.embed_options().binary, PathBuf::from("ffmpeg"));
        assert_eq!(args.embed_options().timeout, None);
        assert_eq!(
            args.logger_config().log_dir,
            Some(PathBuf::from("logs"))
        );
        assert!(!args.strict);
    }

    #[test]
    fn test_explicit_options() {
        let args = Args::parse_from([
            "coverbatch",
            "album",
            "cover.png",
            "tagged",
            "--log-level",
            "debug",
            "--no-log-file",
            "--timeout",
            "90",
            "--pattern",
            "0*",
        ]);

        assert_eq!(args.output_folder(), PathBuf::from("tagged"));
        assert_eq!(args.log_level, LogLevel::Debug);
        assert_eq!(args.logger_config().log_dir, None);
        assert_eq!(args.embed_options().timeout, Some(Duration::from_secs(90)));
        assert_eq!(args.batch_options().pattern.as_deref(), Some("0*"));
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let result = Args::try_parse_from(["coverbatch", "album", "cover.jpg", "--log-level", "trace"]);
        assert!(result.is_err());
    }
}
