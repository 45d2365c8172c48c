//! 레코드 변환 모듈
//!
//! instruction/response 레코드를 ShareGPT 대화 레코드로 변환합니다.
//! 입출력이 없는 순수 함수만 포함합니다.

use serde::{Deserialize, Serialize};
use serde_json::ser::Formatter;
use serde_json::{Map, Value};
use std::io::{self, Write};

use crate::error::RecordError;

/// 원본 레코드의 instruction 필드 이름
pub const INSTRUCTION_FIELD: &str = "instruction";
/// 원본 레코드의 response 필드 이름
pub const RESPONSE_FIELD: &str = "response";

/// 대화 발화자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Human,
    Assistant,
}

/// ShareGPT 대화의 한 턴
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub from: Role,
    pub value: String,
}

/// ShareGPT 형식 레코드
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareGptRecord {
    pub conversations: Vec<Message>,
}

/// instruction/response 원본 레코드
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    pub instruction: String,
    pub response: String,
}

impl SourceRecord {
    /// 파싱된 JSON 값에서 원본 레코드 추출
    ///
    /// 두 필수 필드 외의 필드는 무시합니다. 타입 변환은 하지 않습니다.
    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        let Value::Object(mut map) = value else {
            return Err(RecordError::NotAnObject);
        };

        let instruction = take_text(&mut map, INSTRUCTION_FIELD)?;
        let response = take_text(&mut map, RESPONSE_FIELD)?;

        Ok(Self {
            instruction,
            response,
        })
    }
}

fn take_text(map: &mut Map<String, Value>, field: &'static str) -> Result<String, RecordError> {
    match map.remove(field) {
        Some(Value::String(text)) => Ok(text),
        Some(_) => Err(RecordError::InvalidFieldType(field)),
        None => Err(RecordError::MissingField(field)),
    }
}

impl From<SourceRecord> for ShareGptRecord {
    fn from(record: SourceRecord) -> Self {
        Self {
            conversations: vec![
                Message {
                    from: Role::Human,
                    value: record.instruction,
                },
                Message {
                    from: Role::Assistant,
                    value: record.response,
                },
            ],
        }
    }
}

impl ShareGptRecord {
    /// 한 줄 JSON으로 직렬화 (개행 미포함)
    ///
    /// # Arguments
    /// * `compact` - true면 공백 없는 구분자, false면 `", "` / `": "` 구분자
    pub fn to_line(&self, compact: bool) -> serde_json::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(128);
        if compact {
            serde_json::to_writer(&mut buf, self)?;
        } else {
            let mut ser = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
            self.serialize(&mut ser)?;
        }
        Ok(buf)
    }
}

/// 원본 레코드 값을 ShareGPT 레코드로 변환
///
/// # Examples
/// ```
/// use serde_json::json;
/// use sharegpt_convert::record::{to_sharegpt, Role};
///
/// let record = to_sharegpt(json!({"instruction": "hi", "response": "hello"})).unwrap();
/// assert_eq!(record.conversations[0].from, Role::Human);
/// assert_eq!(record.conversations[1].value, "hello");
/// ```
pub fn to_sharegpt(value: Value) -> Result<ShareGptRecord, RecordError> {
    SourceRecord::from_value(value).map(ShareGptRecord::from)
}

/// 항목 사이 `", "`, 키와 값 사이 `": "`를 쓰는 한 줄 포맷터
#[derive(Debug, Default, Clone, Copy)]
pub struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}
