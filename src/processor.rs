//! 배치 처리 모듈
//!
//! 입력 폴더의 MP3 파일을 찾아 한 번에 하나씩 변환하고 결과를 집계합니다.
//! 파일 하나의 실패는 배치 전체를 멈추지 않습니다.

use indicatif::ProgressBar;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

use crate::converter::{ConversionJob, CoverEmbedder};
use crate::error::{CoverError, Result};
use crate::logger::Logger;
use crate::pattern::PatternMatcher;
use crate::stats::BatchResult;

/// 처리 대상 오디오 확장자
pub const AUDIO_EXTENSION: &str = "mp3";

/// 배치 처리 옵션
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// 파일 이름 glob 필터 (None이면 모든 MP3)
    pub pattern: Option<String>,
}

impl BatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pattern(mut self, pattern: Option<String>) -> Self {
        self.pattern = pattern;
        self
    }
}

/// 드라이런에서 보여줄 예정 작업
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedJob {
    pub job: ConversionJob,
    /// 출력 파일이 이미 있어 건너뛸 예정인지 여부
    pub will_skip: bool,
}

/// 입력 폴더의 MP3 파일 목록 (하위 폴더는 탐색하지 않음)
///
/// 폴더 목록 순서를 그대로 유지하며, 확장자는 대소문자를 구분하지 않습니다.
pub fn discover_audio_files(input: &Path, matcher: &PatternMatcher) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(input).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| CoverError::ReadDir {
            path: input.to_path_buf(),
            reason: e.to_string(),
        })?;
        let path = entry.path();

        let is_audio = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.eq_ignore_ascii_case(AUDIO_EXTENSION))
            .unwrap_or(false);
        let name_matches =
            !matcher.has_pattern() || matcher.matches(&entry.file_name().to_string_lossy());

        if is_audio && name_matches && path.is_file() {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

/// 출력 폴더 생성 (이미 있어도 성공)
fn ensure_output_folder(output: &Path) -> Result<()> {
    fs::create_dir_all(output).map_err(|e| CoverError::CreateOutputDir {
        path: output.to_path_buf(),
        reason: e.to_string(),
    })
}

/// 순차 배치 처리기
pub struct BatchProcessor<'a, E: CoverEmbedder> {
    logger: &'a Logger,
    embedder: E,
    matcher: PatternMatcher,
    progress: ProgressBar,
}

impl<'a, E: CoverEmbedder> BatchProcessor<'a, E> {
    /// 처리기 생성 (패턴이 잘못되었으면 에러)
    pub fn new(logger: &'a Logger, embedder: E, options: BatchOptions) -> Result<Self> {
        Ok(Self {
            logger,
            embedder,
            matcher: PatternMatcher::new(options.pattern)?,
            progress: ProgressBar::hidden(),
        })
    }

    /// 진행률 바 연결
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// 변환 없이 처리 예정 목록만 계산
    pub fn plan(&self, input: &Path, cover: &Path, output: &Path) -> Result<Vec<PlannedJob>> {
        let files = discover_audio_files(input, &self.matcher)?;

        Ok(files
            .into_iter()
            .map(|path| {
                let destination = output.join(path.file_name().unwrap_or_default());
                let will_skip = destination.exists();
                PlannedJob {
                    job: ConversionJob::new(path, cover, destination),
                    will_skip,
                }
            })
            .collect())
    }

    /// 폴더 전체 처리
    ///
    /// 입력 폴더 조회 실패와 출력 폴더 생성 실패만 에러로 반환되며,
    /// 파일별 실패와 건너뜀은 반환되는 집계에만 반영됩니다.
    pub fn process_folder(
        &self,
        input: &Path,
        cover: &Path,
        output: &Path,
    ) -> Result<BatchResult> {
        let started = Instant::now();

        self.logger.info(format!("📁 파일 검색 중: {}", input.display()));
        if let Some(pattern) = self.matcher.as_str() {
            self.logger.debug(format!("🔍 패턴 필터: {}", pattern));
        }
        let files = discover_audio_files(input, &self.matcher)?;

        ensure_output_folder(output)?;

        if files.is_empty() {
            self.logger
                .warn(format!("⚠️ 처리할 MP3 파일이 없습니다: {}", input.display()));
            let mut result = BatchResult::new(0);
            result.set_elapsed(started.elapsed());
            result.log_summary(self.logger, output);
            return Ok(result);
        }

        self.logger
            .info(format!("📋 발견된 파일 수: {}", files.len()));

        let mut result = BatchResult::new(files.len());
        self.progress.set_length(files.len() as u64);

        for (index, path) in files.iter().enumerate() {
            let file_name = path.file_name().unwrap_or_default();
            let destination = output.join(file_name);
            self.progress
                .set_message(file_name.to_string_lossy().to_string());

            if destination.exists() {
                result.record_skip();
                self.logger.warn(format!(
                    "⏭️ 출력 파일이 이미 있어 건너뜁니다: {}",
                    file_name.to_string_lossy()
                ));
                self.progress.inc(1);
                continue;
            }

            self.logger.info(format!(
                "[{}/{}] {}",
                index + 1,
                files.len(),
                file_name.to_string_lossy()
            ));

            let job = ConversionJob::new(path, cover, &destination);
            match self.embedder.embed(&job) {
                Ok(()) => {
                    let bytes = fs::metadata(&destination).map(|m| m.len()).unwrap_or(0);
                    result.record_success(bytes);
                }
                Err(e) => {
                    self.discard_partial_output(&destination);
                    result.record_failure(path.clone(), e.to_string());
                }
            }
            self.progress.inc(1);
        }

        self.progress.finish_and_clear();
        result.set_elapsed(started.elapsed());
        result.log_summary(self.logger, output);

        Ok(result)
    }

    /// 실패한 변환이 남긴 출력 파일 삭제
    ///
    /// 변환 직전에 출력 파일이 없음을 확인했으므로 여기 있는 파일은 미완성본입니다.
    /// 남겨 두면 다음 실행에서 완료된 파일로 보고 건너뛰게 됩니다.
    fn discard_partial_output(&self, destination: &Path) {
        if !destination.exists() {
            return;
        }
        if let Err(e) = fs::remove_file(destination) {
            self.logger.warn(format!(
                "⚠️ 미완성 출력 파일을 삭제하지 못했습니다 ({}): {}",
                destination.display(),
                e
            ));
        }
    }
}
