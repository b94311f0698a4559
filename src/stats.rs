//! 통계 및 유틸리티 모듈
//!
//! 배치 실행 집계, 요약 출력, JSON 리포트 저장을 담당합니다.

use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{CoverError, Result};
use crate::logger::Logger;

/// 변환에 실패한 파일
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedFile {
    pub file: PathBuf,
    pub reason: String,
}

/// 배치 실행 집계
///
/// 실행이 끝나면 항상 `total_files == succeeded + failed + skipped` 입니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchResult {
    /// 발견된 MP3 파일 수
    pub total_files: usize,
    /// 변환 성공 수
    pub succeeded: usize,
    /// 변환 실패 수
    pub failed: usize,
    /// 출력 파일이 이미 있어 건너뛴 수
    pub skipped: usize,
    /// 성공한 출력 파일 크기 합계
    pub bytes_written: u64,
    /// 처리 시간 (초)
    pub elapsed_secs: f64,
    /// 실패 파일 목록
    pub failures: Vec<FailedFile>,
}

impl BatchResult {
    pub fn new(total_files: usize) -> Self {
        Self {
            total_files,
            ..Default::default()
        }
    }

    pub fn record_success(&mut self, bytes: u64) {
        self.succeeded += 1;
        self.bytes_written += bytes;
    }

    pub fn record_failure(&mut self, file: PathBuf, reason: String) {
        self.failed += 1;
        self.failures.push(FailedFile { file, reason });
    }

    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    pub fn set_elapsed(&mut self, elapsed: Duration) {
        self.elapsed_secs = elapsed.as_secs_f64();
    }

    /// 모든 후보가 정확히 한 번씩 집계되었는지 확인
    pub fn is_consistent(&self) -> bool {
        self.total_files == self.succeeded + self.failed + self.skipped
    }

    /// 성공률 (%), 파일이 없으면 None
    pub fn success_rate(&self) -> Option<f64> {
        if self.total_files == 0 {
            return None;
        }
        Some(self.succeeded as f64 / self.total_files as f64 * 100.0)
    }

    /// 요약 블록을 로거로 출력
    pub fn log_summary(&self, logger: &Logger, output_folder: &Path) {
        logger.info("═".repeat(50));
        logger.info(" 📊 처리 통계");
        logger.info("═".repeat(50));
        logger.info(format!("  📁 전체 파일:    {}", self.total_files));
        logger.info(format!("  ✅ 성공:         {}", self.succeeded));
        logger.info(format!("  ❌ 실패:         {}", self.failed));
        logger.info(format!("  ⏭️ 건너뜀:       {}", self.skipped));

        if let Some(rate) = self.success_rate() {
            logger.info(format!("  📈 성공률:       {:.1}%", rate));
        }
        logger.info(format!("  📤 출력 용량:    {}", format_bytes(self.bytes_written)));
        logger.info(format!(
            "  ⏱️ 처리 시간:    {}",
            format_duration(Duration::from_secs_f64(self.elapsed_secs))
        ));

        for failure in &self.failures {
            logger.info(format!(
                "  • 실패: {}",
                failure.file.file_name().unwrap_or_default().to_string_lossy()
            ));
        }

        if self.succeeded > 0 {
            logger.info(format!("  📂 출력 폴더:    {}", output_folder.display()));
        }
        logger.info("═".repeat(50));
    }

    /// 집계를 JSON 파일로 저장
    pub fn write_report(&self, path: &Path) -> Result<()> {
        let report_error = |reason: String| CoverError::ReportWrite {
            path: path.to_path_buf(),
            reason,
        };

        let file = File::create(path).map_err(|e| report_error(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).map_err(|e| report_error(e.to_string()))?;
        writer.flush().map_err(|e| report_error(e.to_string()))
    }
}

/// 바이트를 읽기 쉬운 형식으로 변환
///
/// # Examples
/// ```
/// use coverbatch::stats::format_bytes;
///
/// assert_eq!(format_bytes(500), "500 B");
/// assert_eq!(format_bytes(1048576), "1.00 MB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// 경과 시간을 읽기 쉬운 형식으로 변환
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs >= 3600 {
        format!("{}시간 {}분", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{}분 {}초", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}.{:03}초", secs, millis)
    } else {
        format!("{}ms", millis)
    }
}
