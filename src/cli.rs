//! CLI 인자 파싱 모듈
//!
//! clap을 사용한 명령줄 인자 정의 및 파싱을 담당합니다.

use clap::{Parser, ValueEnum};
use glob::Pattern;
use std::path::PathBuf;

use crate::batch::{BatchConfig, DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR};
use crate::processor::ConvertOptions;

/// 출력 파일 모드
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// 기존 파일이 있으면 덮어쓰기
    #[default]
    Overwrite,
    /// 기존 파일에 추가
    Append,
    /// 기존 파일이 있으면 에러
    Error,
}

impl std::fmt::Display for WriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteMode::Overwrite => write!(f, "Overwrite"),
            WriteMode::Append => write!(f, "Append"),
            WriteMode::Error => write!(f, "Error"),
        }
    }
}

/// CLI 인자 구조체
#[derive(Parser, Debug)]
#[command(
    name = "sharegpt-convert",
    author = "YourName <your@email.com>",
    version,
    about = "JSONL TO SHAREGPT CONVERTER - instruction/response JSONL을 ShareGPT 대화 형식으로 변환",
    long_about = r#"
JSONL TO SHAREGPT CONVERTER
===========================

입력 폴더 바로 아래의 *.jsonl 파일을 하나씩 읽어
각 줄의 {"instruction", "response"} 레코드를
{"conversations": [{"from": "human", ...}, {"from": "assistant", ...}]}
형식으로 변환하고, 출력 폴더에 sharegpt_<원본 이름> 파일로 저장합니다.

특징:
  • 인자 없이 실행하면 data/jsonl → data/sharegpt 변환
  • 잘못된 줄을 만나면 즉시 중단 (부분 출력 파일은 남음)
  • 다양한 출력 모드 지원 (덮어쓰기/추가/에러)
  • 선택적 병렬 처리

예제:
  sharegpt-convert
  sharegpt-convert -i ./raw -o ./out
  sharegpt-convert -i ./raw --pattern "train_*" --dry-run
  sharegpt-convert --validate-only --verbose
"#
)]
pub struct Args {
    /// JSONL 파일들이 있는 입력 폴더 경로
    #[arg(short, long, default_value = DEFAULT_INPUT_DIR)]
    pub input: PathBuf,

    /// 변환 결과를 저장할 출력 폴더 경로
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output: PathBuf,

    /// 출력 파일 모드
    #[arg(short, long, value_enum, default_value_t = WriteMode::Overwrite)]
    pub mode: WriteMode,

    /// 파일 이름 패턴 필터 (glob 형식, 예: "train_*", "part?.jsonl")
    #[arg(short, long, value_parser = parse_pattern)]
    pub pattern: Option<Pattern>,

    /// 상세 출력 모드
    #[arg(short, long)]
    pub verbose: bool,

    /// 실제 변환 없이 처리될 파일 목록만 표시
    #[arg(long)]
    pub dry_run: bool,

    /// 레코드 유효성 검사만 수행 (출력 파일 없음)
    #[arg(long)]
    pub validate_only: bool,

    /// 공백 없는 JSON 출력
    #[arg(long)]
    pub compact: bool,

    /// 진행률 바 표시
    #[arg(long)]
    pub progress: bool,

    /// 병렬 처리 스레드 수 (기본값: 순차 처리)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,
}

fn parse_pattern(pattern: &str) -> Result<Pattern, String> {
    Pattern::new(pattern).map_err(|e| format!("유효하지 않은 패턴 ({}): {}", pattern, e.msg))
}

impl Args {
    /// 인자로부터 배치 설정 생성
    pub fn to_config(&self) -> BatchConfig {
        let options = ConvertOptions::new()
            .with_compact(self.compact)
            .with_write_mode(self.mode)
            .with_validate_only(self.validate_only);

        BatchConfig::new(&self.input, &self.output)
            .with_pattern(self.pattern.clone())
            .with_threads(self.threads)
            .with_options(options)
    }
}
