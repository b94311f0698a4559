//! 실행 흐름 모듈
//!
//! 입력 검증 → ffmpeg 확인 → 배치 처리 순서로 한 번의 실행을 구성합니다.
//! 검증 실패나 ffmpeg 부재는 어떤 파일도 건드리기 전에 에러로 반환됩니다.

use std::path::{Path, PathBuf};

use indicatif::ProgressBar;

use crate::converter::CoverEmbedder;
use crate::error::{CoverError, Result};
use crate::logger::Logger;
use crate::processor::{BatchOptions, BatchProcessor};
use crate::stats::BatchResult;

/// 허용되는 커버 이미지 확장자
pub const COVER_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "gif"];

/// 입력 폴더 검증
pub fn validate_input_folder(input: &Path) -> Result<()> {
    if !input.exists() {
        return Err(CoverError::InputNotFound {
            path: input.to_path_buf(),
        });
    }
    if !input.is_dir() {
        return Err(CoverError::NotADirectory {
            path: input.to_path_buf(),
        });
    }
    Ok(())
}

/// 커버 이미지 검증 (존재 여부 + 확장자)
pub fn validate_cover_art(cover: &Path) -> Result<()> {
    if !cover.is_file() {
        return Err(CoverError::CoverNotFound {
            path: cover.to_path_buf(),
        });
    }

    let extension = cover
        .extension()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let supported = COVER_EXTENSIONS
        .iter()
        .any(|ext| ext.eq_ignore_ascii_case(&extension));

    if !supported {
        return Err(CoverError::UnsupportedCoverFormat {
            path: cover.to_path_buf(),
            extension,
        });
    }
    Ok(())
}

/// 기본 출력 폴더: 입력 폴더 옆의 `output`
pub fn default_output_folder(input: &Path) -> PathBuf {
    input
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("output")
}

/// 검증부터 배치 처리까지 한 번 실행
pub fn run<E: CoverEmbedder>(
    logger: &Logger,
    embedder: E,
    input: &Path,
    cover: &Path,
    output: &Path,
    options: BatchOptions,
    progress: Option<ProgressBar>,
) -> Result<BatchResult> {
    validate_input_folder(input)?;
    validate_cover_art(cover)?;

    let processor = BatchProcessor::new(logger, embedder, options)?;

    logger.debug("🔧 ffmpeg 확인 중...");
    if !processor.embedder().is_available() {
        return Err(CoverError::FfmpegUnavailable {
            binary: processor.embedder().name(),
        });
    }

    let processor = match progress {
        Some(pb) => processor.with_progress(pb),
        None => processor,
    };
    processor.process_folder(input, cover, output)
}
