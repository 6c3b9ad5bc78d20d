// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Upload client and task against a real HTTP endpoint

use anyhow::Result;
use shipper::{
    Credentials, HttpTransport, RetryPolicy, RotationError, ShipperConfig, UploadClient,
    UploadError, UsageUploadTask,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::tempdir;

use mock_collector::MockCollector;

fn admin() -> Credentials {
    Credentials {
        username: "admin".to_string(),
        password: "admin".to_string(),
    }
}

fn client(url: String, attempts: usize) -> UploadClient<'static> {
    static TRANSPORT: HttpTransport = HttpTransport;
    UploadClient::new(
        &TRANSPORT,
        url,
        admin(),
        RetryPolicy::new(attempts, Duration::ZERO),
    )
    .with_timeout(Duration::from_secs(10))
}

#[test]
fn test_multipart_request_shape() -> Result<()> {
    let collector = MockCollector::start(0)?;
    let dir = tempdir()?;
    let path = dir.path().join("usage-20200101.log.gz");
    std::fs::write(&path, b"\x1f\x8bcompressed usage")?;

    let response = client(collector.upload_url(), 3).try_upload(&path, "usage-20200101.log.gz")?;

    assert!(response.contains("accepted"));
    let received = collector.received();
    assert_eq!(received.len(), 1);
    let request = &received[0];
    assert_eq!(request.file_name.as_deref(), Some("usage-20200101.log.gz"));
    assert_eq!(
        request.authorization.as_deref(),
        Some("Basic YWRtaW46YWRtaW4=")
    );
    assert_eq!(request.accept.as_deref(), Some("application/json"));
    assert!(
        request
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("multipart/form-data"))
    );
    assert!(request.body_contains(b"name=\"file\""));
    assert!(request.body_contains(b"filename=\"usage-20200101.log.gz\""));
    assert!(request.body_contains(b"\x1f\x8bcompressed usage"));
    Ok(())
}

#[test]
fn test_retries_after_server_errors() -> Result<()> {
    let collector = MockCollector::start(2)?;
    let dir = tempdir()?;
    let path = dir.path().join("usage-20200101.log.gz");
    std::fs::write(&path, b"usage")?;

    assert!(client(collector.upload_url(), 3).upload(&path, "usage-20200101.log.gz"));
    assert_eq!(collector.received().len(), 3);
    Ok(())
}

#[test]
fn test_gives_up_after_max_attempts() -> Result<()> {
    let collector = MockCollector::start(5)?;
    let dir = tempdir()?;
    let path = dir.path().join("usage-20200101.log.gz");
    std::fs::write(&path, b"usage")?;

    let err = client(collector.upload_url(), 2)
        .try_upload(&path, "usage-20200101.log.gz")
        .unwrap_err();

    match err {
        UploadError::RetriesExhausted { attempts, last } => {
            assert_eq!(attempts, 2);
            assert!(matches!(*last, UploadError::Status { status: 503, .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(collector.received().len(), 2);
    Ok(())
}

#[test]
fn test_connection_refused_is_a_failed_attempt() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("usage-20200101.log.gz");
    std::fs::write(&path, b"usage")?;

    // Bind and drop a listener to get a port nobody is serving.
    let port = std::net::TcpListener::bind("127.0.0.1:0")?.local_addr()?.port();
    let url = format!("http://127.0.0.1:{port}/usage/upload-file");

    let err = client(url, 2)
        .try_upload(&path, "usage-20200101.log.gz")
        .unwrap_err();
    assert!(matches!(err, UploadError::RetriesExhausted { attempts: 2, .. }));
    Ok(())
}

#[test]
fn test_task_run_over_http() -> Result<()> {
    let collector = MockCollector::start(1)?;
    let base = tempdir()?;

    let mut config = ShipperConfig::new(base.path(), admin());
    config.upload_url = Some(collector.upload_url());
    config.max_retries = 2;
    config.retry_delay_ms = 0;
    config.request_timeout_secs = 10;

    let spool = config.spool_dir();
    std::fs::create_dir_all(&spool)?;
    std::fs::write(spool.join("usage.log"), b"GET /pets 200\n")?;
    std::fs::write(spool.join("usage-20200101.log.gz"), b"older")?;

    let writer = |active: &Path| -> Result<PathBuf, RotationError> {
        let rotated = active.with_file_name("usage-20200102.log.gz");
        std::fs::rename(active, &rotated)?;
        std::fs::write(active, b"")?;
        Ok(rotated)
    };

    let report = UsageUploadTask::new(config, writer, HttpTransport).run();

    assert_eq!(
        report.delivered,
        vec!["usage-20200101.log.gz", "usage-20200102.log.gz"]
    );
    let names: Vec<_> = collector
        .received()
        .into_iter()
        .filter_map(|r| r.file_name)
        .collect();
    assert_eq!(
        names,
        vec![
            "usage-20200101.log.gz",
            "usage-20200101.log.gz",
            "usage-20200102.log.gz"
        ]
    );
    assert!(spool.join("usage-20200101.log.gz.uploaded").exists());
    assert!(spool.join("usage-20200102.log.gz.uploaded").exists());
    Ok(())
}
