//! 에러 타입 정의 모듈
//!
//! 변환 과정에서 발생할 수 있는 모든 에러 타입을 정의합니다.

use std::path::PathBuf;
use thiserror::Error;

/// 변환 과정에서 발생할 수 있는 에러 타입
#[derive(Error, Debug)]
pub enum ConvertError {
    /// 입력 폴더가 존재하지 않음
    #[error("입력 폴더를 찾을 수 없습니다: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// 입력이 폴더가 아님
    #[error("입력 경로가 폴더가 아닙니다: {path}")]
    NotADirectory { path: PathBuf },

    /// 출력 파일이 이미 존재 (Error 모드에서)
    #[error("출력 파일이 이미 존재합니다: {path}")]
    OutputExists { path: PathBuf },

    /// JSON 파싱 실패 또는 객체가 아닌 레코드
    #[error("잘못된 레코드 ({file}:{line}): {reason}")]
    MalformedRecord {
        file: PathBuf,
        line: usize,
        reason: String,
    },

    /// 필수 필드 누락
    #[error("필수 필드 `{field}` 누락 ({file}:{line})")]
    MissingField {
        file: PathBuf,
        line: usize,
        field: &'static str,
    },

    /// 필수 필드가 문자열이 아님
    #[error("필드 `{field}`가 문자열이 아닙니다 ({file}:{line})")]
    InvalidFieldType {
        file: PathBuf,
        line: usize,
        field: &'static str,
    },

    /// 파일 입출력 실패
    #[error("파일 입출력 실패 ({path}): {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON 직렬화 실패
    #[error("JSON 직렬화 실패 ({file}): {reason}")]
    Serialize { file: PathBuf, reason: String },

    /// 스레드 풀 초기화 실패
    #[error("스레드 풀 초기화 실패: {reason}")]
    ThreadPool { reason: String },
}

impl ConvertError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }
}

/// 레코드 단위 변환 에러 (파일/줄 정보 없음)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("필수 필드 `{0}` 누락")]
    MissingField(&'static str),

    #[error("필드 `{0}`가 문자열이 아닙니다")]
    InvalidFieldType(&'static str),

    #[error("레코드가 JSON 객체가 아닙니다")]
    NotAnObject,
}

/// 변환 결과 타입 별칭
pub type Result<T> = std::result::Result<T, ConvertError>;
