use finding_fuji::{
    config::AppConfig,
    models::event::InvocationEvent,
    pipeline::Pipeline,
    services::{
        export::{ImageExporter, SoracomCliExporter},
        fetch::{AssetFetcher, HttpAssetFetcher},
        verdict::parse_verdict,
        vision::{OpenAiVisionClient, VisionClassifier},
    },
};

/// Live test: export, download and classify one snapshot.
///
/// Requires the `soracom` CLI on PATH and real credentials in the
/// environment (or `.env`). Nothing is posted to Slack.
#[tokio::test]
#[ignore] // Run with: cargo test --test integration_test -- --ignored
async fn test_live_export_and_classify() {
    let config = AppConfig::from_env().expect("Failed to load config");

    let exporter = SoracomCliExporter::from_config(&config);
    let fetcher = HttpAssetFetcher::new(config.requests_timeout()).expect("HTTP client");
    let classifier = OpenAiVisionClient::from_config(&config).expect("OpenAI client");

    let time = finding_fuji::models::event::PhotoShootTime::resolve(
        &InvocationEvent::default(),
        chrono::Utc::now(),
    );

    // 1. Export
    let job = exporter
        .submit_export(&config.device_id, time)
        .await
        .expect("Export submission failed");
    tokio::time::sleep(config.export_wait()).await;
    let asset = exporter
        .poll_export(&config.device_id, &job)
        .await
        .expect("Export poll failed");
    let url = asset.download_url().expect("Export not ready").to_string();

    // 2. Download
    let image = fetcher.fetch(&url).await.expect("Download failed");
    assert!(!image.is_empty());

    // 3. Classify and parse
    let raw = classifier.classify(&image).await.expect("Classification failed");
    println!("Model answered: {raw}");
    let verdict = parse_verdict(&raw).expect("Model answer was not a verdict");
    println!("found_mt_fuji = {}", verdict.found_mt_fuji);
}

/// Live test: the full invocation, including the Slack post.
#[tokio::test]
#[ignore] // Posts to the configured Slack channel
async fn test_live_full_invocation() {
    let config = AppConfig::from_env().expect("Failed to load config");
    let pipeline = Pipeline::from_config(&config).expect("Failed to build pipeline");

    let report = pipeline
        .run(&InvocationEvent::default(), chrono::Utc::now())
        .await
        .expect("Invocation failed");

    println!("{}", serde_json::to_string_pretty(&report).unwrap());
    assert!(report.notification.is_delivered());
}
