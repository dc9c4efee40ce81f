//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use site_progress::config::Config;
use site_progress::error::AppError;
use site_progress::scanner;
use site_progress_common::{ComparisonRequest, ErrorKind, Outcome, ReportError};
use std::path::Path;
use tempfile::tempdir;

/// 存在しない画像ファイル
#[test]
fn test_load_nonexistent_image() {
    let result = scanner::load_data_url(Path::new("/nonexistent/path/12345.jpg"));
    assert!(matches!(result.unwrap_err(), AppError::FileNotFound(_)));
}

/// ディレクトリを画像として渡した場合
#[test]
fn test_load_directory_as_image() {
    let dir = tempdir().expect("Failed to create temp dir");
    let result = scanner::load_data_url(dir.path());
    assert!(matches!(result.unwrap_err(), AppError::FileNotFound(_)));
}

/// 壊れた設定ファイル
#[test]
fn test_load_broken_config() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = Config::load_from(&path).unwrap_err();
    assert!(matches!(err, AppError::JsonParse(_)));
}

/// 共通ライブラリのエラーはそのままの文言で透過
#[test]
fn test_common_error_is_transparent() {
    let request: ComparisonRequest = serde_json::from_str(r#"{"image1": "raw", "image2": "data:,"}"#).unwrap();
    let common_error = request.image_payloads().unwrap_err();
    let expected = common_error.to_string();

    let err: AppError = common_error.into();
    assert!(matches!(err, AppError::Common(_)));
    assert_eq!(err.to_string(), expected);
}

/// AppErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        AppError::Config("テスト設定エラー".to_string()),
        AppError::FileNotFound("before.jpg".to_string()),
        AppError::ImageLoad("対応していない画像形式".to_string()),
        AppError::Server("bind失敗".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "Error display should not be empty");
    }
}

/// 全ての失敗種別がエラーエンベロープとステータスに対応
#[test]
fn test_every_report_error_maps_to_envelope() {
    let cases = vec![
        (ReportError::ServiceUnavailable { reason: "refused".into() }, ErrorKind::ServiceUnavailable, 503),
        (ReportError::Upstream { status: 500, body: "oom".into() }, ErrorKind::UpstreamError, 500),
        (ReportError::EmptyResponse, ErrorKind::EmptyResponse, 500),
        (ReportError::MalformedResponse { preview: "hello".into() }, ErrorKind::MalformedResponse, 500),
        (
            ReportError::MalformedJson { preview: "{".into(), diagnostic: "EOF".into() },
            ErrorKind::MalformedJson,
            500,
        ),
        (ReportError::SchemaViolation { details: "metrics".into() }, ErrorKind::SchemaViolation, 500),
        (ReportError::Timeout { seconds: 120 }, ErrorKind::Timeout, 504),
        (ReportError::InvalidRequest { message: "image1".into() }, ErrorKind::InvalidRequest, 400),
        (ReportError::Processing { message: "boom".into() }, ErrorKind::ProcessingFailed, 500),
    ];

    for (error, kind, status) in cases {
        let outcome = Outcome::failure(&error);
        assert_eq!(outcome.http_status(), status, "{:?}", error);
        match outcome {
            Outcome::Failure(envelope) => {
                assert_eq!(envelope.kind, kind);
                assert_eq!(envelope.error, error.to_string());
                assert!(envelope.suggestion.is_some());
            }
            Outcome::Success(_) => panic!("failure expected for {:?}", error),
        }
    }
}
