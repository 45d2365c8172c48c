//! sharegpt-convert - JSONL TO SHAREGPT CONVERTER
//!
//! instruction/response 형식의 JSONL 데이터셋을 언어 모델 학습용 ShareGPT 대화 형식으로 변환하는 CLI 도구입니다.
//!
//! # 주요 기능
//!
//! - 🔁 **레코드 변환**: `{"instruction", "response"}` → `{"conversations": [human, assistant]}`
//! - 📂 **폴더 단위 처리**: 입력 폴더의 `*.jsonl` 파일마다 `sharegpt_<이름>` 파일 생성
//! - 🛑 **즉시 중단**: 잘못된 줄을 만나면 파일 이름과 줄 번호를 담은 에러로 중단
//! - 🔍 **패턴 필터링**: glob 형식의 파일 이름 필터링
//! - 📝 **다양한 출력 모드**: 덮어쓰기, 추가, 에러 모드 지원
//! - 🧪 **드라이런 / 유효성 검사 모드**
//! - 🚀 **선택적 병렬 처리**: Rayon 스레드 풀로 파일 단위 병렬 변환
//!
//! # 예제
//!
//! ```bash
//! # 기본 사용법 (data/jsonl → data/sharegpt)
//! sharegpt-convert
//!
//! # 폴더 지정
//! sharegpt-convert -i ./raw -o ./out
//!
//! # 유효성 검사만
//! sharegpt-convert -i ./raw --validate-only
//! ```

pub mod batch;
pub mod cli;
pub mod error;
pub mod processor;
pub mod record;
pub mod stats;

// Re-exports for convenient access
pub use batch::{process_files, BatchConfig, BatchReport};
pub use cli::{Args, WriteMode};
pub use error::{ConvertError, RecordError, Result};
pub use processor::{convert_file, convert_lines, ConvertOptions, FileOutcome, FilePair, FileReport};
pub use record::{to_sharegpt, Message, Role, ShareGptRecord};
pub use stats::{format_bytes, Statistics};
