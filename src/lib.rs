//! coverbatch - MP3 COVER ART BATCH EMBEDDER
//!
//! 폴더 내 MP3 파일들에 커버 이미지 하나를 일괄 삽입하는 CLI 도구입니다.
//! 실제 변환은 외부 ffmpeg 바이너리가 스트림 복사로 수행합니다.
//!
//! # 주요 기능
//!
//! - 🎵 **무손실 삽입**: 오디오/이미지 스트림 복사, 재인코딩 없음
//! - ⏭️ **멱등성**: 출력 파일이 이미 있으면 건너뛰어 중단된 작업을 이어서 처리
//! - 🛡️ **실패 격리**: 파일 하나의 실패가 배치 전체를 멈추지 않음
//! - 📝 **이중 로그**: 컬러 콘솔 + 날짜별 로그 파일
//! - 📊 **요약 통계**: 성공/실패/건너뜀 집계와 JSON 리포트
//! - 🧪 **드라이런 모드**: 실제 변환 없이 처리 예정 목록 확인
//!
//! # 예제
//!
//! ```bash
//! # 기본 사용법 (출력: ../output)
//! coverbatch ./album ./cover.jpg
//!
//! # 출력 폴더와 로그 레벨 지정
//! coverbatch ./album ./cover.png ./tagged --log-level debug
//! ```

pub mod app;
pub mod cli;
pub mod converter;
pub mod error;
pub mod logger;
pub mod pattern;
pub mod processor;
pub mod stats;

// Re-exports for convenient access
pub use app::{default_output_folder, run, validate_cover_art, validate_input_folder};
pub use cli::Args;
pub use converter::{check_available, ConversionJob, CoverEmbedder, EmbedOptions, FfmpegEmbedder};
pub use error::{CoverError, EmbedError, Result};
pub use logger::{LogEntry, LogLevel, Logger, LoggerConfig};
pub use pattern::PatternMatcher;
pub use processor::{discover_audio_files, BatchOptions, BatchProcessor, PlannedJob};
pub use stats::{format_bytes, format_duration, BatchResult, FailedFile};
