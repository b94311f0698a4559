//! 커버 이미지 삽입 모듈
//!
//! 외부 ffmpeg 바이너리를 파일당 한 번 실행하여 MP3에 커버 이미지를 삽입합니다.
//! 오디오/이미지 스트림은 재인코딩 없이 그대로 복사됩니다.

use std::ffi::OsString;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::EmbedError;
use crate::logger::Logger;

/// ffmpeg 진행 상황 라인을 식별하는 문자열
const PROGRESS_MARKER: &str = "time=";

/// 제한 시간 확인 주기
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// 변환 작업 하나 (입력, 커버, 출력)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    pub input: PathBuf,
    pub cover: PathBuf,
    pub output: PathBuf,
}

impl ConversionJob {
    pub fn new(
        input: impl Into<PathBuf>,
        cover: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input: input.into(),
            cover: cover.into(),
            output: output.into(),
        }
    }
}

/// 변환 방식 추상화
///
/// 배치 처리기는 이 트레이트만 알고 있으므로 테스트에서 대체 구현을 쓸 수 있습니다.
pub trait CoverEmbedder {
    /// 로그와 에러 메시지에 쓰이는 변환기 이름
    fn name(&self) -> String {
        "ffmpeg".to_string()
    }

    /// 변환기를 사용할 수 있는지 확인
    fn is_available(&self) -> bool;

    /// 작업 하나를 실행
    fn embed(&self, job: &ConversionJob) -> Result<(), EmbedError>;
}

impl<T: CoverEmbedder + ?Sized> CoverEmbedder for &T {
    fn name(&self) -> String {
        (**self).name()
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn embed(&self, job: &ConversionJob) -> Result<(), EmbedError> {
        (**self).embed(job)
    }
}

/// ffmpeg 실행 옵션
#[derive(Debug, Clone)]
pub struct EmbedOptions {
    /// ffmpeg 실행 파일 경로 또는 이름
    pub binary: PathBuf,
    /// 파일당 제한 시간 (None이면 무제한)
    pub timeout: Option<Duration>,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("ffmpeg"),
            timeout: None,
        }
    }
}

impl EmbedOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// 종료된 자식 프로세스의 결과
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// 바이너리가 실행 가능한지 확인
///
/// `-version` 인자로 실행하여 종료 코드 0이면 true를 반환합니다.
/// 실행 자체가 실패해도 에러를 반환하지 않습니다.
pub fn check_available(binary: &Path) -> bool {
    Command::new(binary)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// ffmpeg 인자 목록 생성
///
/// 순서가 중요합니다: 첫 번째 입력의 오디오와 두 번째 입력의 이미지를 매핑하고,
/// 둘 다 스트림 복사하며 ID3v2.3 태그와 attached_pic 처리를 지정합니다.
/// 경로는 UTF-8이 아니어도 그대로 전달됩니다.
pub fn build_ffmpeg_args(job: &ConversionJob) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::with_capacity(18);
    args.push("-i".into());
    args.push(job.input.clone().into_os_string());
    args.push("-i".into());
    args.push(job.cover.clone().into_os_string());
    for flag in [
        "-map",
        "0:a",
        "-map",
        "1:0",
        "-c:a",
        "copy",
        "-c:v",
        "copy",
        "-id3v2_version",
        "3",
        "-disposition:v:0",
        "attached_pic",
        "-y",
    ] {
        args.push(flag.into());
    }
    args.push(job.output.clone().into_os_string());
    args
}

/// ffmpeg 프로세스 기반 변환기
pub struct FfmpegEmbedder<'a> {
    options: EmbedOptions,
    logger: &'a Logger,
}

impl<'a> FfmpegEmbedder<'a> {
    pub fn new(options: EmbedOptions, logger: &'a Logger) -> Self {
        Self { options, logger }
    }

    pub fn options(&self) -> &EmbedOptions {
        &self.options
    }

    /// 프로세스를 실행하고 두 출력 스트림을 동시에 읽으며 종료를 기다림
    ///
    /// 읽기 스레드는 파이프가 닫힐 때까지 살아 있으므로, 제한 시간 초과 시에는
    /// 기다리지 않고 분리합니다. (손자 프로세스가 파이프를 잡고 있어도 멈추지 않음)
    fn run(&self, args: &[OsString]) -> Result<CommandOutput, EmbedError> {
        let binary = &self.options.binary;
        let mut child = Command::new(binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| EmbedError::Spawn {
                binary: binary.clone(),
                reason: e.to_string(),
            })?;

        // 파이프 버퍼가 가득 차 자식이 멈추지 않도록 두 스트림을 각각 별도 스레드에서 비움
        let (progress_tx, progress_rx) = mpsc::channel();
        let stdout_reader = child
            .stdout
            .take()
            .map(|stream| thread::spawn(move || drain_lines(stream, |_| {})));
        let stderr_reader = child.stderr.take().map(|stream| {
            thread::spawn(move || {
                drain_lines(stream, |line| {
                    if line.contains(PROGRESS_MARKER) {
                        let _ = progress_tx.send(line.trim().to_string());
                    }
                })
            })
        });

        let status = self.wait(&mut child, &progress_rx)?;
        let stdout = join_reader(stdout_reader);
        let stderr = join_reader(stderr_reader);
        for line in progress_rx.try_iter() {
            self.log_progress(&line);
        }

        Ok(CommandOutput {
            status,
            stdout,
            stderr,
        })
    }

    /// 종료 대기 (제한 시간이 있으면 초과 시 강제 종료)
    ///
    /// 기다리는 동안 도착한 진행 라인은 바로 debug 로그로 전달합니다.
    fn wait(
        &self,
        child: &mut Child,
        progress: &Receiver<String>,
    ) -> Result<ExitStatus, EmbedError> {
        let io_error = |e: io::Error| EmbedError::Io {
            reason: e.to_string(),
        };
        let started = Instant::now();

        loop {
            if let Some(status) = child.try_wait().map_err(io_error)? {
                return Ok(status);
            }

            if let Some(timeout) = self.options.timeout {
                if started.elapsed() >= timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(EmbedError::TimedOut {
                        secs: timeout.as_secs(),
                    });
                }
            }

            match progress.recv_timeout(POLL_INTERVAL) {
                Ok(line) => self.log_progress(&line),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => thread::sleep(POLL_INTERVAL),
            }
        }
    }

    fn log_progress(&self, line: &str) {
        self.logger.debug(format!("    {}", line));
    }
}

/// 읽기 스레드 결과 수집
fn join_reader(reader: Option<JoinHandle<String>>) -> String {
    reader
        .map(|handle| handle.join().unwrap_or_default())
        .unwrap_or_default()
}

impl CoverEmbedder for FfmpegEmbedder<'_> {
    fn name(&self) -> String {
        self.options.binary.display().to_string()
    }

    fn is_available(&self) -> bool {
        check_available(&self.options.binary)
    }

    fn embed(&self, job: &ConversionJob) -> Result<(), EmbedError> {
        let file_name = job.input.file_name().unwrap_or_default().to_string_lossy();
        self.logger.debug(format!("🎵 변환 시작: {}", file_name));

        let args = build_ffmpeg_args(job);
        let command_line: Vec<String> = args
            .iter()
            .map(|arg| arg.to_string_lossy().to_string())
            .collect();
        self.logger.debug(format!(
            "    {} {}",
            self.options.binary.display(),
            command_line.join(" ")
        ));

        let output = match self.run(&args) {
            Ok(output) => output,
            Err(e) => {
                match &e {
                    EmbedError::Spawn { .. } => {
                        self.logger.error(format!("❌ ffmpeg 실행 실패 ({}): {}", file_name, e))
                    }
                    _ => self.logger.error(format!("❌ 변환 실패 ({}): {}", file_name, e)),
                }
                return Err(e);
            }
        };

        if output.status.success() {
            self.logger
                .info(format!("✅ 변환 완료: {}", job.output.display()));
            Ok(())
        } else {
            let e = EmbedError::NonZeroExit {
                code: output.status.code(),
                stderr: output.stderr.trim().to_string(),
            };
            self.logger
                .error(format!("❌ 변환 실패 ({}): {}", file_name, e));
            Err(e)
        }
    }
}

/// 스트림을 끝까지 읽으면서 줄 단위(`\n` 또는 `\r`)로 콜백 호출
///
/// ffmpeg는 진행 상황을 `\r`로 덮어쓰므로 두 구분자를 모두 줄 끝으로 취급합니다.
/// 읽은 전체 내용은 문자열로 반환합니다.
fn drain_lines<R: Read>(mut stream: R, mut on_line: impl FnMut(&str)) -> String {
    let mut captured = Vec::new();
    let mut pending = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(_) => break,
        };
        captured.extend_from_slice(&chunk[..n]);

        for &byte in &chunk[..n] {
            if byte == b'\n' || byte == b'\r' {
                if !pending.is_empty() {
                    on_line(&String::from_utf8_lossy(&pending));
                    pending.clear();
                }
            } else {
                pending.push(byte);
            }
        }
    }

    if !pending.is_empty() {
        on_line(&String::from_utf8_lossy(&pending));
    }

    String::from_utf8_lossy(&captured).to_string()
}
