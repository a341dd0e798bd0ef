//! S3 source tests against LocalStack.

use integration_tests::{LocalStackTestContext, generate_test_ndjson, gzip};
use std::path::Path;
use sv_error::{ErrorKind, SvError};
use sv_traits::IdentityFilter;
use sv_transform::{FilterConfig, RhaiFilter};
use sv_types::{ObjectStoreConfig, RunOptions};

const TEST_BUCKET: &str = "sieve-test-bucket";

async fn setup() -> Option<LocalStackTestContext> {
    let ctx = LocalStackTestContext::new().await;
    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return None;
    }
    ctx.create_bucket(TEST_BUCKET)
        .await
        .expect("Failed to create bucket");
    Some(ctx)
}

fn run_options(ctx: &LocalStackTestContext, output: &Path) -> RunOptions {
    let (access_key, secret_key) = ctx.credentials();
    let store = ObjectStoreConfig::new()
        .with_region(ctx.region.clone())
        .with_endpoint(ctx.endpoint.clone())
        .with_credentials(access_key, secret_key, None)
        .with_allow_http(true);

    RunOptions::new()
        .with_output_destination(output)
        .with_clear_output_on_start(true)
        .with_object_store(store)
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_filter_plain_object() {
    let Some(ctx) = setup().await else { return };
    let key = "plain/mixed.ndjson";
    ctx.put_object(
        TEST_BUCKET,
        key,
        b"{\"a\":1}\n{\"a\":2}\nNOTJSON\n{\"a\":3}\n".to_vec(),
    )
    .await
    .expect("Failed to upload");

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.ld-json");
    let filter = RhaiFilter::new(&FilterConfig::with_script(
        "if record.a % 2 == 0 { record } else { () }",
    ))
    .unwrap();

    let stats = sv_runner::run(
        &format!("s3://{TEST_BUCKET}/{key}"),
        &run_options(&ctx, &output),
        &filter,
    )
    .await
    .unwrap()
    .expect("Object is not empty");

    assert_eq!((stats.found, stats.removed, stats.error), (1, 2, 1));
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "{\"a\":2}\n");

    ctx.delete_object(TEST_BUCKET, key).await.ok();
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_gzip_object_to_gzip_output() {
    let Some(ctx) = setup().await else { return };
    let key = "gzip/records.ndjson.gz";
    let ndjson = generate_test_ndjson(300);
    ctx.put_object(TEST_BUCKET, key, gzip(ndjson.as_bytes()))
        .await
        .expect("Failed to upload");

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.ld-json.gz");
    let options = run_options(&ctx, &output)
        .with_decompress_input(true)
        .with_compress_output(true);
    let filter = RhaiFilter::new(&FilterConfig::with_script(
        r#"if record.level == "DEBUG" { () } else { record }"#,
    ))
    .unwrap();

    let stats = sv_runner::run(&format!("s3://{TEST_BUCKET}/{key}"), &options, &filter)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(stats.found, 200);
    assert_eq!(stats.removed, 100);
    assert_eq!(stats.error, 0);

    let compressed = std::fs::read(&output).unwrap();
    let mut decoder = flate2::read::MultiGzDecoder::new(compressed.as_slice());
    let mut text = String::new();
    std::io::Read::read_to_string(&mut decoder, &mut text).unwrap();

    let ids: Vec<i64> = text
        .lines()
        .map(|l| serde_json::from_str::<serde_json::Value>(l).unwrap()["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids.len(), 200);
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
    assert!(ids.iter().all(|id| id % 3 != 0));

    ctx.delete_object(TEST_BUCKET, key).await.ok();
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_empty_object_is_noop() {
    let Some(ctx) = setup().await else { return };
    let key = "empty/nothing.ndjson";
    ctx.put_object(TEST_BUCKET, key, Vec::new())
        .await
        .expect("Failed to upload");

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.ld-json");
    std::fs::write(&output, "{\"kept\":true}\n").unwrap();

    let result = sv_runner::run(
        &format!("s3://{TEST_BUCKET}/{key}"),
        &run_options(&ctx, &output),
        &IdentityFilter,
    )
    .await
    .unwrap();

    assert!(result.is_none());
    // Clearing is skipped when there is nothing to read
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "{\"kept\":true}\n"
    );

    ctx.delete_object(TEST_BUCKET, key).await.ok();
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_missing_object() {
    let Some(ctx) = setup().await else { return };

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.ld-json");

    let err = sv_runner::run(
        &format!("s3://{TEST_BUCKET}/does/not/exist.ndjson"),
        &run_options(&ctx, &output),
        &IdentityFilter,
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::SourceUnavailable);
    assert!(matches!(err, SvError::Source(_)));
    assert!(!output.exists());
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_percent_encoded_key() {
    let Some(ctx) = setup().await else { return };
    let key = "encoded/daily report.ndjson";
    ctx.put_object(TEST_BUCKET, key, generate_test_ndjson(5).into_bytes())
        .await
        .expect("Failed to upload");

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.ld-json");

    let stats = sv_runner::run(
        &format!("s3://{TEST_BUCKET}/encoded/daily%20report.ndjson"),
        &run_options(&ctx, &output),
        &IdentityFilter,
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(stats.found, 5);
    assert_eq!(std::fs::read_to_string(&output).unwrap().lines().count(), 5);

    ctx.delete_object(TEST_BUCKET, key).await.ok();
}
