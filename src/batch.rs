//! 폴더 단위 배치 변환 모듈
//!
//! 입력 폴더의 JSONL 파일을 찾아 파일마다 변환을 실행하고 결과를 모읍니다.

use glob::Pattern;
use rayon::prelude::*;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{ConvertError, Result};
use crate::processor::{convert_file, is_jsonl_name, ConvertOptions, FileOutcome, FilePair, FileReport};
use crate::stats::Statistics;

/// 기본 입력 폴더
pub const DEFAULT_INPUT_DIR: &str = "data/jsonl";
/// 기본 출력 폴더
pub const DEFAULT_OUTPUT_DIR: &str = "data/sharegpt";

/// 배치 변환 설정
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// 입력 폴더
    pub input_dir: PathBuf,
    /// 출력 폴더 (없으면 생성)
    pub output_dir: PathBuf,
    /// 파일 이름 glob 필터 (`.jsonl` 이름에 추가로 적용)
    pub pattern: Option<Pattern>,
    /// 병렬 처리 스레드 수 (None 또는 1이면 순차 처리)
    pub threads: Option<usize>,
    /// 파일 변환 옵션
    pub options: ConvertOptions,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR)
    }
}

impl BatchConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            pattern: None,
            threads: None,
            options: ConvertOptions::new(),
        }
    }

    /// 파일 이름 패턴 설정
    pub fn with_pattern(mut self, pattern: Option<Pattern>) -> Self {
        self.pattern = pattern;
        self
    }

    /// 병렬 처리 스레드 수 설정
    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads;
        self
    }

    /// 파일 변환 옵션 설정
    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }

    fn parallel_threads(&self) -> Option<usize> {
        self.threads.filter(|&n| n > 1)
    }

    fn accepts(&self, file_name: &OsStr) -> bool {
        if !is_jsonl_name(file_name) {
            return false;
        }
        match &self.pattern {
            Some(p) => p.matches(&file_name.to_string_lossy()),
            None => true,
        }
    }
}

/// 배치 변환 결과
#[derive(Debug)]
pub struct BatchReport {
    /// 처리된 파일별 결과 (파일 이름 순)
    pub reports: Vec<FileReport>,
    /// 처리 통계
    pub stats: Statistics,
}

impl BatchReport {
    /// 첫 번째 실패 결과
    pub fn first_failure(&self) -> Option<&FileReport> {
        self.reports.iter().find(|r| !r.is_converted())
    }

    /// 성공한 파일 결과
    pub fn converted(&self) -> impl Iterator<Item = &FileReport> {
        self.reports.iter().filter(|r| r.is_converted())
    }

    /// 실패가 있으면 첫 번째 실패 원인을 에러로 반환
    pub fn into_result(mut self) -> Result<Self> {
        if let Some(index) = self.reports.iter().position(|r| !r.is_converted()) {
            if let FileOutcome::Failed(e) = self.reports.swap_remove(index).outcome {
                return Err(e);
            }
        }
        Ok(self)
    }
}

/// 입력 폴더 확인
pub fn validate_input(input_dir: &Path) -> Result<()> {
    if !input_dir.exists() {
        return Err(ConvertError::DirectoryNotFound {
            path: input_dir.to_path_buf(),
        });
    }

    if !input_dir.is_dir() {
        return Err(ConvertError::NotADirectory {
            path: input_dir.to_path_buf(),
        });
    }

    Ok(())
}

/// 변환할 파일 쌍 수집
///
/// 입력 폴더 바로 아래에서 이름이 `.jsonl`로 끝나는 파일만 찾으며 하위 폴더는 탐색하지 않습니다.
/// 결과는 파일 이름 순으로 정렬됩니다.
pub fn plan_conversions(config: &BatchConfig) -> Result<Vec<FilePair>> {
    validate_input(&config.input_dir)?;

    let mut pairs = Vec::new();
    for entry in WalkDir::new(&config.input_dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| ConvertError::io(&config.input_dir, e.into()))?;

        if !entry.path().is_file() || !config.accepts(entry.file_name()) {
            continue;
        }

        if let Some(pair) = FilePair::for_input(entry.path(), &config.output_dir) {
            pairs.push(pair);
        }
    }

    pairs.sort_by(|a, b| a.source.file_name().cmp(&b.source.file_name()));
    debug!(count = pairs.len(), "변환 대상 파일 수집 완료");
    Ok(pairs)
}

/// 출력 폴더 생성 (이미 있으면 아무것도 하지 않음)
pub fn ensure_output_dir(output_dir: &Path) -> Result<()> {
    if !output_dir.is_dir() {
        fs::create_dir_all(output_dir).map_err(|e| ConvertError::io(output_dir, e))?;
        info!(path = %output_dir.display(), "출력 폴더 생성");
    }
    Ok(())
}

/// 입력 폴더의 모든 JSONL 파일 변환
///
/// 파일 하나를 처리할 때마다 `on_file`이 호출됩니다.
/// 첫 번째 실패한 파일에서 멈추고, 그 파일의 결과가 마지막 실패 항목이 됩니다.
/// 병렬 처리는 파일 이름 순으로 스레드 수만큼씩 묶어 실행하며,
/// 실패가 나온 묶음 이후의 파일은 시작하지 않습니다.
/// 이미 기록된 출력 파일은 실패 후에도 삭제하지 않습니다.
///
/// # Errors
/// 입력 폴더가 없거나 출력 폴더를 만들 수 없으면 파일 처리 전에 에러를 반환합니다.
/// 파일 단위 실패는 `BatchReport`에 담기며 `BatchReport::into_result`로 에러로 바꿀 수 있습니다.
pub fn process_files<F>(config: &BatchConfig, on_file: F) -> Result<BatchReport>
where
    F: Fn(&FileReport) + Sync,
{
    let pairs = plan_conversions(config)?;

    if !config.options.validate_only {
        ensure_output_dir(&config.output_dir)?;
    }

    let stats = Statistics::new(pairs.len());
    let options = &config.options;

    let reports: Vec<FileReport> = match config.parallel_threads() {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| ConvertError::ThreadPool {
                    reason: e.to_string(),
                })?;

            let mut reports = Vec::with_capacity(pairs.len());
            for wave in pairs.chunks(threads) {
                let done: Vec<FileReport> = pool.install(|| {
                    wave.par_iter()
                        .map(|pair| {
                            let report = convert_file(pair.clone(), options);
                            stats.record(&report);
                            on_file(&report);
                            report
                        })
                        .collect()
                });

                let failed = done.iter().any(|r| !r.is_converted());
                reports.extend(done);
                if failed {
                    break;
                }
            }
            reports
        }
        None => {
            let mut reports = Vec::with_capacity(pairs.len());
            for pair in pairs {
                let report = convert_file(pair, options);
                stats.record(&report);
                on_file(&report);

                let failed = !report.is_converted();
                reports.push(report);
                if failed {
                    break;
                }
            }
            reports
        }
    };

    info!(
        converted = stats.get_success_count(),
        failed = stats.get_error_count(),
        "배치 변환 종료"
    );

    Ok(BatchReport { reports, stats })
}
