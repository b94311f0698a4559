//! 에러 타입 정의 모듈
//!
//! 실행 전체를 중단시키는 설정 에러(`CoverError`)와
//! 파일 하나에만 영향을 주는 변환 에러(`EmbedError`)를 구분합니다.

use std::path::PathBuf;
use thiserror::Error;

/// 배치 실행 전체를 중단시키는 에러
#[derive(Error, Debug)]
pub enum CoverError {
    /// 입력 폴더가 존재하지 않음
    #[error("입력 폴더를 찾을 수 없습니다: {path}")]
    InputNotFound { path: PathBuf },

    /// 입력이 폴더가 아님
    #[error("입력 경로가 폴더가 아닙니다: {path}")]
    NotADirectory { path: PathBuf },

    /// 커버 이미지 파일이 없음
    #[error("커버 이미지 파일을 찾을 수 없습니다: {path}")]
    CoverNotFound { path: PathBuf },

    /// 지원하지 않는 커버 이미지 확장자
    #[error("지원하지 않는 커버 이미지 형식입니다 ({path}): .{extension}")]
    UnsupportedCoverFormat { path: PathBuf, extension: String },

    /// 외부 미디어 바이너리를 실행할 수 없음
    #[error("ffmpeg를 실행할 수 없습니다: {binary} (설치 여부와 PATH를 확인하세요)")]
    FfmpegUnavailable { binary: String },

    /// 입력 폴더 목록 조회 실패
    #[error("입력 폴더를 읽을 수 없습니다 ({path}): {reason}")]
    ReadDir { path: PathBuf, reason: String },

    /// 출력 폴더 생성 실패
    #[error("출력 폴더를 생성할 수 없습니다 ({path}): {reason}")]
    CreateOutputDir { path: PathBuf, reason: String },

    /// 유효하지 않은 패턴
    #[error("유효하지 않은 패턴: {pattern}")]
    InvalidPattern { pattern: String },

    /// 결과 리포트 저장 실패
    #[error("리포트 저장 실패 ({path}): {reason}")]
    ReportWrite { path: PathBuf, reason: String },
}

/// 파일 하나의 변환 실패 원인
///
/// 배치 처리기는 이 에러를 전파하지 않고 집계에 실패로 기록합니다.
#[derive(Error, Debug)]
pub enum EmbedError {
    /// 프로세스를 시작하지 못함 (바이너리 없음, 권한 없음 등)
    #[error("프로세스를 시작할 수 없습니다 ({binary}): {reason}")]
    Spawn { binary: PathBuf, reason: String },

    /// 0이 아닌 종료 코드
    #[error("ffmpeg 종료 코드 {}: {stderr}", .code.map_or_else(|| "없음(시그널)".to_string(), |c| c.to_string()))]
    NonZeroExit { code: Option<i32>, stderr: String },

    /// 제한 시간 초과로 강제 종료됨
    #[error("제한 시간 {secs}초 초과로 변환을 중단했습니다")]
    TimedOut { secs: u64 },

    /// 자식 프로세스 대기/종료 중 입출력 에러
    #[error("프로세스 대기 실패: {reason}")]
    Io { reason: String },
}

/// coverbatch 결과 타입 별칭
pub type Result<T> = std::result::Result<T, CoverError>;
