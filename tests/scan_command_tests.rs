/// Tests for the scan command against a directory-backed bucket
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;
use trail_audit_alerts::commands::scan::{run, ScanArgs};
use trail_audit_alerts::config::ScanOptions;

fn write_trail_object(bucket: &Path, key: &str, body: &str) {
    let path = bucket.join(key);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(body.as_bytes()).unwrap();
    fs::write(path, encoder.finish().unwrap()).unwrap();
}

/// Helper to create a bucket mirror with root, failed-login and stale-key activity
fn create_sample_bucket() -> TempDir {
    let root = TempDir::new().unwrap();
    let bucket = root.path().join("my-trail");
    let prefix = "AWSLogs/123456789012/CloudTrail/us-east-1/2025/10/07";

    write_trail_object(
        &bucket,
        &format!("{}/123456789012_CloudTrail_us-east-1_1.json.gz", prefix),
        r#"{"Records": [
            {"eventName": "ConsoleLogin", "userIdentity": {"type": "Root"}, "responseElements": {"ConsoleLogin": "Success"}},
            {"eventName": "ConsoleLogin", "userIdentity": {"type": "IAMUser", "userName": "alice"}, "errorMessage": "Failed authentication", "responseElements": null},
            {"eventName": "ConsoleLogin", "userIdentity": {"type": "IAMUser", "userName": "alice"}, "errorMessage": "Failed authentication", "responseElements": null}
        ]}"#,
    );
    write_trail_object(
        &bucket,
        &format!("{}/123456789012_CloudTrail_us-east-1_2.json.gz", prefix),
        r#"{"Records": [
            {"eventName": "ConsoleLogin", "userIdentity": {"type": "IAMUser", "userName": "alice"}, "errorMessage": "Failed authentication", "responseElements": null},
            {"eventName": "GetObject", "userIdentity": {"type": "IAMUser", "userName": "bob"}}
        ]}"#,
    );
    fs::write(bucket.join(format!("{}/broken.json.gz", prefix)), b"garbage").unwrap();

    fs::write(
        root.path().join("access-keys.json"),
        r#"{"AccessKeyMetadata": [
            {"UserName": "bob", "AccessKeyId": "AKIABOBOLD", "Status": "Active", "CreateDate": "2020-01-01T00:00:00Z"}
        ]}"#,
    )
    .unwrap();

    root
}

fn args(root: &Path) -> ScanArgs {
    ScanArgs {
        log_dir: root.to_path_buf(),
        options: ScanOptions {
            bucket: Some("my-trail".to_string()),
            topic: Some("security-alerts".to_string()),
            access_key_max_age_days: Some(90),
            failed_login_threshold: Some(3),
            window_hours: Some(2),
        },
        credentials: Some(root.join("access-keys.json")),
        export: Some(root.join("alerts.csv")),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_scan_exports_one_row_per_alert() {
    let root = create_sample_bucket();

    run(args(root.path())).await.unwrap();

    let csv = fs::read_to_string(root.path().join("alerts.csv")).unwrap();
    let rows: Vec<&str> = csv.lines().skip(1).collect();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().any(|r| r.starts_with("root_signin,")));
    assert!(rows
        .iter()
        .any(|r| r.contains("ALERT: 3 failed console logins for user alice")));
    assert!(rows
        .iter()
        .any(|r| r.starts_with("stale_credential,bob,ALERT: Access key AKIABOBOLD for bob")));
    assert!(rows.iter().all(|r| r.contains(",true,")));
}

#[tokio::test]
async fn test_scan_without_inventory_skips_key_ages() {
    let root = create_sample_bucket();
    let mut args = args(root.path());
    args.credentials = None;

    run(args).await.unwrap();

    let csv = fs::read_to_string(root.path().join("alerts.csv")).unwrap();
    assert_eq!(csv.lines().count(), 3);
    assert!(!csv.contains("stale_credential"));
}

#[tokio::test]
async fn test_scan_missing_bucket_fails() {
    let root = TempDir::new().unwrap();
    let mut args = args(root.path());
    args.credentials = None;

    let result = run(args).await;
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("my-trail"));
}

#[tokio::test]
async fn test_scan_missing_inventory_fails() {
    let root = create_sample_bucket();
    let mut args = args(root.path());
    args.credentials = Some(root.path().join("nope.json"));

    let result = run(args).await;
    assert!(result.is_err());
}
