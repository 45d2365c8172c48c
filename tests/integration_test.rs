//! 통합 테스트 모듈
//!
//! 폴더 단위 변환의 전체 흐름을 테스트합니다.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// 테스트용 JSONL 파일 생성 헬퍼
fn create_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// 입력/출력 폴더 구성 (출력 폴더는 아직 만들지 않음)
fn setup_dirs() -> (TempDir, PathBuf, PathBuf) {
    let root = TempDir::new().unwrap();
    let input = root.path().join("jsonl");
    let output = root.path().join("nested").join("sharegpt");
    fs::create_dir(&input).unwrap();
    (root, input, output)
}

const VALID_LINES: &str = concat!(
    r#"{"instruction": "What is Rust?", "response": "A systems language.", "id": 1}"#,
    "\n",
    r#"{"instruction": "Say hi", "response": "hi"}"#,
    "\n",
);

mod batch_tests {
    use super::*;
    use sharegpt_convert::{process_files, BatchConfig, ConvertError, FileOutcome};
    use std::sync::Mutex;

    #[test]
    fn test_converts_and_names_output() {
        let (_root, input, output) = setup_dirs();
        create_file(&input, "foo.jsonl", VALID_LINES);

        let report = process_files(&BatchConfig::new(&input, &output), |_| {}).unwrap();

        assert_eq!(report.reports.len(), 1);
        assert!(report.first_failure().is_none());

        let produced = output.join("sharegpt_foo.jsonl");
        let content = fs::read_to_string(&produced).unwrap();
        let expected = concat!(
            r#"{"conversations": [{"from": "human", "value": "What is Rust?"}, {"from": "assistant", "value": "A systems language."}]}"#,
            "\n",
            r#"{"conversations": [{"from": "human", "value": "Say hi"}, {"from": "assistant", "value": "hi"}]}"#,
            "\n",
        );
        assert_eq!(content, expected);
        assert_eq!(fs::read_dir(&output).unwrap().count(), 1);
    }

    #[test]
    fn test_ignores_other_entries() {
        let (_root, input, output) = setup_dirs();
        create_file(&input, "data.jsonl", VALID_LINES);
        create_file(&input, "notes.txt", "not json at all");
        create_file(&input, "data.json", "{}");
        let sub = input.join("sub");
        fs::create_dir(&sub).unwrap();
        create_file(&sub, "deep.jsonl", VALID_LINES);

        let report = process_files(&BatchConfig::new(&input, &output), |_| {}).unwrap();

        assert_eq!(report.converted().count(), 1);
        let mut names: Vec<String> = fs::read_dir(&output)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["sharegpt_data.jsonl"]);
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let (_root, input, output) = setup_dirs();
        create_file(&input, "a.jsonl", VALID_LINES);
        let config = BatchConfig::new(&input, &output);

        process_files(&config, |_| {}).unwrap().into_result().unwrap();
        let first = fs::read(output.join("sharegpt_a.jsonl")).unwrap();

        process_files(&config, |_| {}).unwrap().into_result().unwrap();
        let second = fs::read(output.join("sharegpt_a.jsonl")).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_line_count_preserved() {
        let (_root, input, output) = setup_dirs();
        let content: String = (0..250)
            .map(|i| format!("{{\"instruction\": \"q{}\", \"response\": \"a{}\"}}\n", i, i))
            .collect();
        create_file(&input, "many.jsonl", &content);

        let report = process_files(&BatchConfig::new(&input, &output), |_| {}).unwrap();

        let written = fs::read_to_string(output.join("sharegpt_many.jsonl")).unwrap();
        assert_eq!(written.lines().count(), 250);
        assert_eq!(report.stats.get_total_lines(), 250);
    }

    #[test]
    fn test_missing_input_directory() {
        let root = TempDir::new().unwrap();
        let config = BatchConfig::new(root.path().join("absent"), root.path().join("out"));

        let result = process_files(&config, |_| {});

        assert!(matches!(result, Err(ConvertError::DirectoryNotFound { .. })));
    }

    #[test]
    fn test_empty_input_directory() {
        let (_root, input, output) = setup_dirs();
        let notified = Mutex::new(0usize);

        let report = process_files(&BatchConfig::new(&input, &output), |_| {
            *notified.lock().unwrap() += 1;
        })
        .unwrap();

        assert!(report.reports.is_empty());
        assert!(output.is_dir());
        assert_eq!(fs::read_dir(&output).unwrap().count(), 0);
        assert_eq!(*notified.lock().unwrap(), 0);
    }

    #[test]
    fn test_missing_field_fails_file_and_stops_batch() {
        let (_root, input, output) = setup_dirs();
        create_file(&input, "a.jsonl", VALID_LINES);
        create_file(
            &input,
            "b.jsonl",
            "{\"instruction\": \"ok\", \"response\": \"ok\"}\n{\"instruction\":\"hi\"}\n",
        );
        create_file(&input, "c.jsonl", VALID_LINES);

        let report = process_files(&BatchConfig::new(&input, &output), |_| {}).unwrap();

        assert_eq!(report.reports.len(), 2);
        let failed = report.first_failure().unwrap();
        assert_eq!(failed.pair.source_name(), "b.jsonl");
        assert!(failed.error().unwrap().to_string().contains("response"));
        assert!(matches!(
            failed.outcome,
            FileOutcome::Failed(ConvertError::MissingField {
                line: 2,
                field: "response",
                ..
            })
        ));

        // 이전 파일과 부분 출력은 남고, 이후 파일은 처리되지 않음
        assert!(output.join("sharegpt_a.jsonl").exists());
        let partial = fs::read_to_string(output.join("sharegpt_b.jsonl")).unwrap();
        assert_eq!(partial.lines().count(), 1);
        assert!(!output.join("sharegpt_c.jsonl").exists());

        assert!(report.into_result().is_err());
    }

    #[test]
    fn test_malformed_line_reported() {
        let (_root, input, output) = setup_dirs();
        create_file(&input, "bad.jsonl", "{broken\n");

        let result = process_files(&BatchConfig::new(&input, &output), |_| {})
            .unwrap()
            .into_result();

        match result {
            Err(ConvertError::MalformedRecord { file, line, .. }) => {
                assert!(file.ends_with("bad.jsonl"));
                assert_eq!(line, 1);
            }
            other => panic!("unexpected result: {:?}", other.map(|r| r.reports.len())),
        }
    }

    #[test]
    fn test_notifications_in_name_order() {
        let (_root, input, output) = setup_dirs();
        create_file(&input, "b.jsonl", VALID_LINES);
        create_file(&input, "a.jsonl", VALID_LINES);
        let seen = Mutex::new(Vec::new());

        process_files(&BatchConfig::new(&input, &output), |file| {
            seen.lock().unwrap().push((
                file.pair.source_name(),
                file.pair.destination_name(),
            ));
        })
        .unwrap();

        assert_eq!(
            seen.into_inner().unwrap(),
            vec![
                ("a.jsonl".to_string(), "sharegpt_a.jsonl".to_string()),
                ("b.jsonl".to_string(), "sharegpt_b.jsonl".to_string()),
            ]
        );
    }

    #[test]
    fn test_progress_lines() {
        let (_root, input, output) = setup_dirs();
        create_file(&input, "foo.jsonl", VALID_LINES);
        create_file(&input, "broken.jsonl", "{\"instruction\":\"hi\"}\n");
        let lines = Mutex::new(Vec::new());

        process_files(&BatchConfig::new(&input, &output), |file| {
            if file.is_converted() {
                lines.lock().unwrap().push(file.pair.progress_line());
            }
        })
        .unwrap();

        // broken.jsonl이 먼저 실패하므로 안내 문구 없음
        assert!(lines.lock().unwrap().is_empty());

        fs::remove_file(input.join("broken.jsonl")).unwrap();
        process_files(&BatchConfig::new(&input, &output), |file| {
            lines.lock().unwrap().push(file.pair.progress_line());
        })
        .unwrap();

        assert_eq!(
            lines.into_inner().unwrap(),
            vec!["Converted foo.jsonl to sharegpt_foo.jsonl".to_string()]
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_file_name_converted() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let (_root, input, output) = setup_dirs();
        let name = OsStr::from_bytes(b"caf\xe9.jsonl");
        fs::write(input.join(name), VALID_LINES).unwrap();

        let report = process_files(&BatchConfig::new(&input, &output), |_| {})
            .unwrap()
            .into_result()
            .unwrap();

        assert_eq!(report.converted().count(), 1);
        let produced = output.join(OsStr::from_bytes(b"sharegpt_caf\xe9.jsonl"));
        assert_eq!(fs::read_to_string(produced).unwrap().lines().count(), 2);
    }

    #[test]
    fn test_unicode_preserved() {
        let (_root, input, output) = setup_dirs();
        create_file(
            &input,
            "ja.jsonl",
            "{\"instruction\": \"こんにちは\", \"response\": \"😀 안녕\"}\n",
        );

        process_files(&BatchConfig::new(&input, &output), |_| {}).unwrap();

        let written = fs::read_to_string(output.join("sharegpt_ja.jsonl")).unwrap();
        assert!(written.contains("こんにちは"));
        assert!(!written.contains("\\u"));

        let value: serde_json::Value = serde_json::from_str(written.trim_end()).unwrap();
        assert_eq!(value["conversations"][0]["value"], "こんにちは");
        assert_eq!(value["conversations"][1]["value"], "😀 안녕");
    }

    #[test]
    fn test_parallel_conversion() {
        let (_root, input, output) = setup_dirs();
        for i in 0..8 {
            create_file(&input, &format!("part{}.jsonl", i), VALID_LINES);
        }

        let config = BatchConfig::new(&input, &output).with_threads(Some(4));
        let report = process_files(&config, |_| {}).unwrap().into_result().unwrap();

        assert_eq!(report.converted().count(), 8);
        for i in 0..8 {
            let written = fs::read_to_string(output.join(format!("sharegpt_part{}.jsonl", i))).unwrap();
            assert_eq!(written.lines().count(), 2);
        }
    }

    #[test]
    fn test_parallel_failure_stops_batch() {
        let (_root, input, output) = setup_dirs();
        create_file(&input, "a.jsonl", "{\"response\": \"no instruction\"}\n");
        for i in 0..6 {
            create_file(&input, &format!("z{}.jsonl", i), VALID_LINES);
        }

        let config = BatchConfig::new(&input, &output).with_threads(Some(2));
        let report = process_files(&config, |_| {}).unwrap();

        // 실패한 묶음(a, z0) 이후 파일은 시작하지 않음
        assert_eq!(report.reports.len(), 2);
        assert_eq!(report.stats.get_error_count(), 1);
        for i in 1..6 {
            assert!(!output.join(format!("sharegpt_z{}.jsonl", i)).exists());
        }
        assert!(matches!(
            report.into_result(),
            Err(ConvertError::MissingField {
                field: "instruction",
                ..
            })
        ));
    }
}

mod options_tests {
    use super::*;
    use sharegpt_convert::{process_files, BatchConfig, ConvertError, ConvertOptions, WriteMode};

    #[test]
    fn test_validate_only_writes_nothing() {
        let (_root, input, output) = setup_dirs();
        create_file(&input, "a.jsonl", VALID_LINES);

        let config = BatchConfig::new(&input, &output)
            .with_options(ConvertOptions::new().with_validate_only(true));
        let report = process_files(&config, |_| {}).unwrap().into_result().unwrap();

        assert_eq!(report.stats.get_total_lines(), 2);
        assert!(!output.exists());
    }

    #[test]
    fn test_error_mode_refuses_existing_output() {
        let (_root, input, output) = setup_dirs();
        create_file(&input, "a.jsonl", VALID_LINES);
        fs::create_dir_all(&output).unwrap();
        create_file(&output, "sharegpt_a.jsonl", "keep me\n");

        let config = BatchConfig::new(&input, &output)
            .with_options(ConvertOptions::new().with_write_mode(WriteMode::Error));
        let result = process_files(&config, |_| {}).unwrap().into_result();

        assert!(matches!(result, Err(ConvertError::OutputExists { .. })));
        assert_eq!(
            fs::read_to_string(output.join("sharegpt_a.jsonl")).unwrap(),
            "keep me\n"
        );
    }

    #[test]
    fn test_append_mode() {
        let (_root, input, output) = setup_dirs();
        create_file(&input, "a.jsonl", VALID_LINES);

        let config = BatchConfig::new(&input, &output)
            .with_options(ConvertOptions::new().with_write_mode(WriteMode::Append));
        process_files(&config, |_| {}).unwrap();
        process_files(&config, |_| {}).unwrap();

        let written = fs::read_to_string(output.join("sharegpt_a.jsonl")).unwrap();
        assert_eq!(written.lines().count(), 4);
    }

    #[test]
    fn test_mmap_path_matches_buffered_path() {
        let (_root, input, output) = setup_dirs();
        create_file(&input, "a.jsonl", VALID_LINES);

        let buffered = output.join("buffered");
        let mapped = output.join("mapped");
        process_files(&BatchConfig::new(&input, &buffered), |_| {}).unwrap();
        process_files(
            &BatchConfig::new(&input, &mapped)
                .with_options(ConvertOptions::new().with_mmap_threshold(1)),
            |_| {},
        )
        .unwrap();

        assert_eq!(
            fs::read(buffered.join("sharegpt_a.jsonl")).unwrap(),
            fs::read(mapped.join("sharegpt_a.jsonl")).unwrap()
        );
    }

    #[test]
    fn test_compact_output() {
        let (_root, input, output) = setup_dirs();
        create_file(&input, "a.jsonl", "{\"instruction\": \"q\", \"response\": \"a\"}\n");

        let config = BatchConfig::new(&input, &output)
            .with_options(ConvertOptions::new().with_compact(true));
        process_files(&config, |_| {}).unwrap();

        assert_eq!(
            fs::read_to_string(output.join("sharegpt_a.jsonl")).unwrap(),
            "{\"conversations\":[{\"from\":\"human\",\"value\":\"q\"},{\"from\":\"assistant\",\"value\":\"a\"}]}\n"
        );
    }
}

mod error_tests {
    use sharegpt_convert::ConvertError;
    use std::path::PathBuf;

    #[test]
    fn test_error_display() {
        let error = ConvertError::DirectoryNotFound {
            path: PathBuf::from("/nonexistent"),
        };
        assert!(error.to_string().contains("입력 폴더를 찾을 수 없습니다"));
    }

    #[test]
    fn test_missing_field_display() {
        let error = ConvertError::MissingField {
            file: PathBuf::from("train.jsonl"),
            line: 3,
            field: "response",
        };
        let msg = error.to_string();
        assert!(msg.contains("response"));
        assert!(msg.contains("train.jsonl:3"));
    }
}

mod cli_tests {
    use clap::Parser;
    use sharegpt_convert::{Args, WriteMode};
    use std::path::PathBuf;

    #[test]
    fn test_defaults_match_fixed_layout() {
        let args = Args::parse_from(["sharegpt-convert"]);
        let config = args.to_config();

        assert_eq!(config.input_dir, PathBuf::from("data/jsonl"));
        assert_eq!(config.output_dir, PathBuf::from("data/sharegpt"));
        assert_eq!(config.options.write_mode, WriteMode::Overwrite);
        assert!(!config.options.compact);
        assert!(config.threads.is_none());
    }

    #[test]
    fn test_flags_flow_into_config() {
        let args = Args::parse_from([
            "sharegpt-convert",
            "-i",
            "raw",
            "-o",
            "out",
            "--mode",
            "append",
            "--pattern",
            "train_*",
            "--compact",
            "--validate-only",
            "-j",
            "4",
        ]);
        let config = args.to_config();

        assert_eq!(config.input_dir, PathBuf::from("raw"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.pattern.as_ref().map(|p| p.as_str()), Some("train_*"));
        assert_eq!(config.threads, Some(4));
        assert_eq!(config.options.write_mode, WriteMode::Append);
        assert!(config.options.compact);
        assert!(config.options.validate_only);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let result = Args::try_parse_from(["sharegpt-convert", "--pattern", "[invalid"]);
        assert!(result.is_err());
    }
}
