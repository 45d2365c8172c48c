//! JSONL 파일 처리 모듈
//!
//! 개별 JSONL 파일을 한 줄씩 읽어 ShareGPT 형식으로 변환하고 기록합니다.

use memmap2::Mmap;
use serde_json::Value;
use std::ffi::{OsStr, OsString};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::cli::WriteMode;
use crate::error::{ConvertError, RecordError, Result};
use crate::record::to_sharegpt;

/// 출력 파일 이름 접두사
pub const OUTPUT_PREFIX: &str = "sharegpt_";

/// 입력 파일 확장자
pub const INPUT_EXTENSION: &str = ".jsonl";

/// 대용량 파일 기본 임계값 (10MB)
pub const DEFAULT_MMAP_THRESHOLD: u64 = 10 * 1024 * 1024;

/// 입력 파일과 출력 파일 경로 쌍
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair {
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl FilePair {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// 입력 파일 경로에서 출력 폴더 내 `sharegpt_<이름>` 경로를 만듦
    ///
    /// 파일 이름이 없는 경로면 `None`. UTF-8이 아닌 이름도 그대로 유지합니다.
    pub fn for_input(source: impl Into<PathBuf>, output_dir: &Path) -> Option<Self> {
        let source = source.into();
        let destination = output_dir.join(output_name(source.file_name()?));
        Some(Self {
            source,
            destination,
        })
    }

    /// 입력 파일 이름 (표시용)
    pub fn source_name(&self) -> String {
        display_name(&self.source)
    }

    /// 출력 파일 이름 (표시용)
    pub fn destination_name(&self) -> String {
        display_name(&self.destination)
    }

    /// 변환 완료 안내 문구
    ///
    /// # Examples
    /// ```
    /// use sharegpt_convert::processor::FilePair;
    ///
    /// let pair = FilePair::new("data/jsonl/foo.jsonl", "data/sharegpt/sharegpt_foo.jsonl");
    /// assert_eq!(pair.progress_line(), "Converted foo.jsonl to sharegpt_foo.jsonl");
    /// ```
    pub fn progress_line(&self) -> String {
        format!(
            "Converted {} to {}",
            self.source_name(),
            self.destination_name()
        )
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// 입력 파일 이름에 대응하는 출력 파일 이름
///
/// # Examples
/// ```
/// use sharegpt_convert::processor::output_name;
///
/// assert_eq!(output_name("foo.jsonl"), "sharegpt_foo.jsonl");
/// ```
pub fn output_name(file_name: impl AsRef<OsStr>) -> OsString {
    let mut name = OsString::from(OUTPUT_PREFIX);
    name.push(file_name);
    name
}

/// 변환 대상 파일 이름인지 확인 (대소문자 구분, UTF-8이 아닌 이름 포함)
pub fn is_jsonl_name(file_name: impl AsRef<OsStr>) -> bool {
    file_name
        .as_ref()
        .as_encoded_bytes()
        .ends_with(INPUT_EXTENSION.as_bytes())
}

/// 파일 변환 옵션
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// 공백 없는 JSON 출력
    pub compact: bool,
    /// 출력 파일 모드
    pub write_mode: WriteMode,
    /// 유효성 검사만 수행 (출력 파일 없음)
    pub validate_only: bool,
    /// 대용량 파일 임계값 (이상이면 메모리 매핑 사용)
    pub mmap_threshold: u64,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            compact: false,
            write_mode: WriteMode::default(),
            validate_only: false,
            mmap_threshold: DEFAULT_MMAP_THRESHOLD,
        }
    }
}

impl ConvertOptions {
    /// 기본 옵션 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 압축 출력 설정
    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    /// 출력 파일 모드 설정
    pub fn with_write_mode(mut self, write_mode: WriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }

    /// 유효성 검사 모드 설정
    pub fn with_validate_only(mut self, validate_only: bool) -> Self {
        self.validate_only = validate_only;
        self
    }

    /// 메모리 매핑 임계값 설정
    pub fn with_mmap_threshold(mut self, mmap_threshold: u64) -> Self {
        self.mmap_threshold = mmap_threshold;
        self
    }
}

/// 한 파일의 줄 단위 변환 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineStats {
    /// 변환된 줄 수
    pub lines: usize,
    /// 기록한 바이트 수 (개행 포함)
    pub bytes_written: u64,
}

/// 파일 변환 결과
#[derive(Debug)]
pub enum FileOutcome {
    Converted(LineStats),
    Failed(ConvertError),
}

/// 파일 처리 결과
#[derive(Debug)]
pub struct FileReport {
    /// 처리된 파일 경로 쌍
    pub pair: FilePair,
    /// 원본 파일 크기
    pub bytes_read: u64,
    /// 변환 결과
    pub outcome: FileOutcome,
}

impl FileReport {
    /// 성공 결과 생성
    pub fn converted(pair: FilePair, bytes_read: u64, stats: LineStats) -> Self {
        Self {
            pair,
            bytes_read,
            outcome: FileOutcome::Converted(stats),
        }
    }

    /// 실패 결과 생성
    pub fn failed(pair: FilePair, bytes_read: u64, error: ConvertError) -> Self {
        Self {
            pair,
            bytes_read,
            outcome: FileOutcome::Failed(error),
        }
    }

    pub fn is_converted(&self) -> bool {
        matches!(self.outcome, FileOutcome::Converted(_))
    }

    /// 실패 원인 (성공 시 `None`)
    pub fn error(&self) -> Option<&ConvertError> {
        match &self.outcome {
            FileOutcome::Failed(e) => Some(e),
            FileOutcome::Converted(_) => None,
        }
    }
}

/// 줄 단위 변환
///
/// `reader`의 각 줄을 JSON으로 파싱해 ShareGPT 레코드로 변환한 뒤 `writer`에 한 줄씩 기록합니다.
/// 첫 번째 실패한 줄에서 중단하며, 그 전까지 기록한 줄은 그대로 남습니다.
///
/// # Arguments
/// * `pair` - 에러 메시지에 쓰일 파일 경로 쌍
/// * `reader` - 입력 JSONL
/// * `writer` - 출력 대상
/// * `options` - 변환 옵션
pub fn convert_lines<R: BufRead, W: Write>(
    pair: &FilePair,
    reader: R,
    mut writer: W,
    options: &ConvertOptions,
) -> Result<LineStats> {
    let mut stats = LineStats::default();

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.map_err(|e| read_error(&pair.source, line_no, e))?;

        let value: Value =
            serde_json::from_str(&line).map_err(|e| ConvertError::MalformedRecord {
                file: pair.source.clone(),
                line: line_no,
                reason: e.to_string(),
            })?;

        let record = to_sharegpt(value).map_err(|e| record_error(&pair.source, line_no, e))?;

        let mut encoded = record
            .to_line(options.compact)
            .map_err(|e| ConvertError::Serialize {
                file: pair.source.clone(),
                reason: e.to_string(),
            })?;
        encoded.push(b'\n');

        writer
            .write_all(&encoded)
            .map_err(|e| ConvertError::io(&pair.destination, e))?;

        stats.lines += 1;
        stats.bytes_written += encoded.len() as u64;
    }

    writer
        .flush()
        .map_err(|e| ConvertError::io(&pair.destination, e))?;

    Ok(stats)
}

fn read_error(file: &Path, line: usize, error: io::Error) -> ConvertError {
    // UTF-8이 아닌 줄은 다른 잘못된 줄처럼 위치를 알려줌
    if error.kind() == ErrorKind::InvalidData {
        ConvertError::MalformedRecord {
            file: file.to_path_buf(),
            line,
            reason: error.to_string(),
        }
    } else {
        ConvertError::io(file, error)
    }
}

fn record_error(file: &Path, line: usize, error: RecordError) -> ConvertError {
    let file = file.to_path_buf();
    match error {
        RecordError::MissingField(field) => ConvertError::MissingField { file, line, field },
        RecordError::InvalidFieldType(field) => ConvertError::InvalidFieldType { file, line, field },
        RecordError::NotAnObject => ConvertError::MalformedRecord {
            file,
            line,
            reason: error.to_string(),
        },
    }
}

/// 단일 JSONL 파일 변환
///
/// 에러는 반환값의 `FileOutcome::Failed`로 전달됩니다.
pub fn convert_file(pair: FilePair, options: &ConvertOptions) -> FileReport {
    let bytes_read = fs::metadata(&pair.source).map(|m| m.len()).unwrap_or(0);

    match convert_file_internal(&pair, bytes_read, options) {
        Ok(stats) => {
            debug!(source = %pair.source.display(), lines = stats.lines, "파일 변환 완료");
            FileReport::converted(pair, bytes_read, stats)
        }
        Err(e) => {
            debug!(source = %pair.source.display(), error = %e, "파일 변환 실패");
            FileReport::failed(pair, bytes_read, e)
        }
    }
}

/// 내부 파일 처리 로직
fn convert_file_internal(
    pair: &FilePair,
    file_size: u64,
    options: &ConvertOptions,
) -> Result<LineStats> {
    let input = File::open(&pair.source).map_err(|e| ConvertError::io(&pair.source, e))?;

    // 유효성 검사만 하는 경우
    if options.validate_only {
        return convert_input(pair, &input, file_size, io::sink(), options);
    }

    let output = open_output_file(&pair.destination, options.write_mode)?;
    convert_input(pair, &input, file_size, BufWriter::new(output), options)
}

fn convert_input<W: Write>(
    pair: &FilePair,
    input: &File,
    file_size: u64,
    writer: W,
    options: &ConvertOptions,
) -> Result<LineStats> {
    if file_size > 0 && file_size >= options.mmap_threshold {
        // 대용량 파일: 메모리 매핑 사용
        let mmap = unsafe { Mmap::map(input) }.map_err(|e| ConvertError::io(&pair.source, e))?;
        convert_lines(pair, &mmap[..], writer, options)
    } else {
        // 일반 파일: 버퍼 리더 사용
        convert_lines(pair, BufReader::new(input), writer, options)
    }
}

/// 출력 파일 열기
fn open_output_file(path: &Path, mode: WriteMode) -> Result<File> {
    let opened = match mode {
        WriteMode::Overwrite => File::create(path),
        WriteMode::Append => OpenOptions::new().create(true).append(true).open(path),
        WriteMode::Error => OpenOptions::new().write(true).create_new(true).open(path),
    };

    opened.map_err(|e| {
        if mode == WriteMode::Error && e.kind() == ErrorKind::AlreadyExists {
            ConvertError::OutputExists {
                path: path.to_path_buf(),
            }
        } else {
            ConvertError::io(path, e)
        }
    })
}
