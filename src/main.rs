//! sharegpt-convert - JSONL TO SHAREGPT CONVERTER
//!
//! 메인 엔트리포인트

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use sharegpt_convert::{
    batch::{plan_conversions, process_files, validate_input},
    cli::Args,
    processor::{FileOutcome, FilePair, FileReport},
};

fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(args.verbose);

    let config = args.to_config();

    // 입력 폴더 확인
    validate_input(&config.input_dir)?;

    if args.verbose {
        print_header(&args);
    }

    // 드라이런 모드
    if args.dry_run {
        let pairs = plan_conversions(&config)?;
        print_dry_run(&pairs);
        return Ok(());
    }

    let pb = if args.progress {
        let total = plan_conversions(&config)?.len();
        Some(create_progress_bar(total))
    } else {
        None
    };

    let report = process_files(&config, |file| {
        match &pb {
            Some(pb) => {
                pb.suspend(|| announce(file, &args));
                pb.inc(1);
            }
            None => announce(file, &args),
        }
    })?;

    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }

    if args.verbose {
        report.stats.print_summary();
    }

    report.into_result()?;
    Ok(())
}

/// 로깅 초기화 (RUST_LOG가 verbose 플래그보다 우선)
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "info" } else { "off" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

/// 파일 하나의 처리 결과 출력
fn announce(file: &FileReport, args: &Args) {
    match &file.outcome {
        FileOutcome::Converted(stats) if args.validate_only => {
            println!(
                "  {} {} ({} 줄)",
                "✓".green(),
                file.pair.source_name(),
                stats.lines
            );
        }
        FileOutcome::Converted(_) => println!("{}", file.pair.progress_line()),
        FileOutcome::Failed(error) => {
            eprintln!("{} {}", "❌".bright_red(), file.pair.source_name().red());
            if args.verbose {
                eprintln!("    {}", error.to_string().dimmed());
            }
        }
    }
}

/// 헤더 출력
fn print_header(args: &Args) {
    println!("\n{}", "═".repeat(50).bright_blue());
    println!(
        "{}",
        " 🚀 JSONL TO SHAREGPT CONVERTER".bright_white().bold()
    );
    println!("{}", "═".repeat(50).bright_blue());
    println!("  {} 입력 폴더: {:?}", "📂".bright_cyan(), args.input);

    if !args.validate_only {
        println!("  {} 출력 폴더: {:?}", "📄".bright_green(), args.output);
        println!("  {} 모드: {}", "⚙️".bright_yellow(), args.mode);
    }

    if let Some(ref pattern) = args.pattern {
        println!("  {} 패턴 필터: {}", "🔍".bright_magenta(), pattern);
    }

    if let Some(threads) = args.threads {
        println!("  {} 스레드 수: {}", "⚡".bright_white(), threads);
    }

    if args.dry_run {
        println!(
            "  {} {}",
            "⚠️".bright_yellow(),
            "드라이런 모드 (실제 변환 없음)".yellow()
        );
    }

    if args.validate_only {
        println!("  {} {}", "🔍".bright_cyan(), "유효성 검사 모드".cyan());
    }

    println!("{}", "═".repeat(50).bright_blue());
}

/// 드라이런 출력
fn print_dry_run(pairs: &[FilePair]) {
    println!("\n{}", "📋 처리 예정 파일 목록:".bright_cyan());
    for (i, pair) in pairs.iter().enumerate() {
        println!(
            "  {}. {} → {}",
            i + 1,
            pair.source_name(),
            pair.destination.display()
        );
    }
    println!(
        "\n{} 총 {} 개의 파일이 처리될 예정입니다.",
        "ℹ️".bright_blue(),
        pairs.len().to_string().bright_green()
    );
}

/// 진행률 바 생성
fn create_progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░"),
    );
    pb
}
