//! coverbatch - MP3 COVER ART BATCH EMBEDDER
//!
//! 메인 엔트리포인트

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

use coverbatch::{
    app::{validate_cover_art, validate_input_folder},
    cli::Args,
    converter::FfmpegEmbedder,
    logger::Logger,
    processor::BatchProcessor,
};

fn main() {
    let args = Args::parse();

    let progress = args.progress.then(create_progress_bar);
    let logger = Logger::new(args.logger_config());
    let logger = match &progress {
        Some(pb) => logger.with_progress(pb.clone()),
        None => logger,
    };

    if let Err(e) = run(&args, &logger, progress) {
        logger.error(format!("❌ {:#}", e));
        std::process::exit(1);
    }
}

/// 한 번의 실행 (에러는 모두 종료 코드 1)
fn run(args: &Args, logger: &Logger, progress: Option<ProgressBar>) -> Result<()> {
    let output = args.output_folder();
    print_header(args, logger, &output);

    let embedder = FfmpegEmbedder::new(args.embed_options(), logger);

    if args.dry_run {
        return run_dry_run(args, logger, embedder, &output);
    }

    let result = coverbatch::run(
        logger,
        embedder,
        &args.input,
        &args.cover,
        &output,
        args.batch_options(),
        progress,
    )?;

    if let Some(ref report_path) = args.report {
        result
            .write_report(report_path)
            .context("리포트 저장 실패")?;
        logger.info(format!("📝 리포트 저장: {}", report_path.display()));
    }

    if result.failed == 0 {
        logger.info("✅ 모든 작업이 완료되었습니다!");
    } else {
        logger.warn(format!(
            "⚠️ {} 개의 파일 변환에 실패했습니다.",
            result.failed
        ));
        if args.strict {
            anyhow::bail!("실패한 파일이 있습니다 (--strict): {}개", result.failed);
        }
    }

    Ok(())
}

/// 헤더 출력
fn print_header(args: &Args, logger: &Logger, output: &Path) {
    logger.info("═".repeat(50));
    logger.info(" 🎵 MP3 COVER ART BATCH EMBEDDER");
    logger.info("═".repeat(50));
    logger.info(format!("  📂 입력 폴더: {}", args.input.display()));
    logger.info(format!("  🖼️ 커버 이미지: {}", args.cover.display()));
    logger.info(format!("  📤 출력 폴더: {}", output.display()));

    if let Some(ref pattern) = args.pattern {
        logger.info(format!("  🔍 패턴 필터: {}", pattern));
    }

    if let Some(timeout) = args.timeout {
        logger.info(format!("  ⏱️ 제한 시간: {}초", timeout));
    }

    if args.dry_run {
        logger.info("  ⚠️ 드라이런 모드 (실제 변환 없음)");
    }

    if let Some(path) = logger.file_path() {
        logger.debug(format!("  📝 로그 파일: {}", path.display()));
    }

    logger.info("═".repeat(50));
}

/// 드라이런: 처리 예정 목록 출력
fn run_dry_run(
    args: &Args,
    logger: &Logger,
    embedder: FfmpegEmbedder<'_>,
    output: &Path,
) -> Result<()> {
    validate_input_folder(&args.input)?;
    validate_cover_art(&args.cover)?;

    let processor = BatchProcessor::new(logger, embedder, args.batch_options())?;
    let planned = processor.plan(&args.input, &args.cover, output)?;

    if planned.is_empty() {
        logger.warn("⚠️ 처리할 MP3 파일이 없습니다.");
        return Ok(());
    }

    logger.info("📋 처리 예정 파일 목록:");
    for (i, item) in planned.iter().enumerate() {
        let name = item.job.input.file_name().unwrap_or_default().to_string_lossy();
        if item.will_skip {
            logger.info(format!("  {}. {} (건너뜀: 출력 파일 있음)", i + 1, name));
        } else {
            logger.info(format!("  {}. {} → {}", i + 1, name, item.job.output.display()));
        }
    }

    let to_convert = planned.iter().filter(|p| !p.will_skip).count();
    logger.info(format!(
        "ℹ️ 총 {} 개 중 {} 개의 파일이 변환될 예정입니다.",
        planned.len(),
        to_convert
    ));

    Ok(())
}

/// 진행률 바 생성
fn create_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░");
    pb.set_style(style);
    pb
}
