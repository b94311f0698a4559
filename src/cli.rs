//! CLI 인자 파싱 모듈
//!
//! clap을 사용한 명령줄 인자 정의와 각 컴포넌트 설정으로의 변환을 담당합니다.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::app::default_output_folder;
use crate::converter::EmbedOptions;
use crate::logger::{LogLevel, LoggerConfig};
use crate::processor::BatchOptions;

/// coverbatch CLI 인자 구조체
#[derive(Parser, Debug)]
#[command(
    name = "coverbatch",
    author = "YourName <your@email.com>",
    version,
    about = "MP3 COVER ART BATCH EMBEDDER - 폴더 내 MP3 파일들에 커버 이미지를 일괄 삽입하는 CLI 도구",
    long_about = r#"
MP3 COVER ART BATCH EMBEDDER
============================

지정된 폴더의 모든 MP3 파일에 하나의 커버 이미지를 삽입하여
출력 폴더에 같은 이름으로 저장합니다. (ffmpeg 필요)

특징:
  • 재인코딩 없는 스트림 복사 (음질 손실 없음)
  • 출력 파일이 이미 있으면 건너뛰므로 다시 실행해도 안전
  • 파일 하나가 실패해도 나머지는 계속 처리
  • 날짜별 로그 파일 (logs/coverbatch-YYYY-MM-DD.log)

지원 커버 형식: .jpg .jpeg .png .bmp .gif

예제:
  coverbatch ./album ./cover.jpg
  coverbatch ./album ./cover.png ./album_with_cover
  coverbatch ./album ./cover.jpg --log-level debug
  coverbatch ./album ./cover.jpg --dry-run
"#
)]
pub struct Args {
    /// MP3 파일들이 있는 입력 폴더 경로
    pub input: PathBuf,

    /// 삽입할 커버 이미지 파일 경로
    pub cover: PathBuf,

    /// 출력 폴더 경로 (기본값: 입력 폴더 옆의 output)
    pub output: Option<PathBuf>,

    /// 로그 레벨
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// 로그 파일 폴더
    #[arg(long, default_value = "logs")]
    pub log_dir: PathBuf,

    /// 로그 파일을 남기지 않음
    #[arg(long)]
    pub no_log_file: bool,

    /// 컬러 출력 끄기
    #[arg(long)]
    pub no_color: bool,

    /// ffmpeg 실행 파일 경로
    #[arg(long, default_value = "ffmpeg")]
    pub ffmpeg: PathBuf,

    /// 파일당 제한 시간 (초)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// 파일 이름 패턴 필터 (glob 형식, 예: "01*", "*live*")
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// 실제 변환 없이 처리될 파일 목록만 표시
    #[arg(long)]
    pub dry_run: bool,

    /// 진행률 바 표시
    #[arg(long)]
    pub progress: bool,

    /// 결과 리포트(JSON) 저장 경로
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// 실패한 파일이 하나라도 있으면 종료 코드 1로 종료
    #[arg(long)]
    pub strict: bool,
}

impl Args {
    /// 실제 출력 폴더 (지정하지 않았으면 기본값)
    pub fn output_folder(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_folder(&self.input))
    }

    pub fn logger_config(&self) -> LoggerConfig {
        LoggerConfig::new()
            .with_level(self.log_level)
            .with_log_dir((!self.no_log_file).then(|| self.log_dir.clone()))
            .with_color(!self.no_color)
    }

    pub fn embed_options(&self) -> EmbedOptions {
        EmbedOptions::new()
            .with_binary(&self.ffmpeg)
            .with_timeout(self.timeout.map(Duration::from_secs))
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions::new().with_pattern(self.pattern.clone())
    }
}
