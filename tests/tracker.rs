mod helper;

use mockito::Server;

use helper::{contents_envelope, mock_contents, package_json, tracker_options};
use package_track::{MonitorOptions, TrackerError, UpdateType, VersionMonitor, VersionTracker};

#[tokio::test]
async fn get_version_fetches_once_and_serves_cache() {
    let mut server = Server::new_async().await;
    let mock = mock_contents(&mut server, "main", 200, &package_json("1.2.3"), 1).await;

    let tracker = VersionTracker::new(&tracker_options(&server)).unwrap();
    let first = tracker.get_version(false).await.unwrap();
    let second = tracker.get_version(false).await.unwrap();

    mock.assert_async().await;
    assert_eq!(first, second);
    assert_eq!(first.current_version, "1.2.3");
    assert_eq!(first.repository, "acme/widget");
    assert_eq!(first.name.as_deref(), Some("widget"));
    assert_eq!(
        first
            .dependencies
            .as_ref()
            .and_then(|d| d.get("left-pad"))
            .map(String::as_str),
        Some("^1.3.0")
    );
}

#[tokio::test]
async fn clear_cache_causes_refetch() {
    let mut server = Server::new_async().await;
    let mock = mock_contents(&mut server, "main", 200, &package_json("1.2.3"), 2).await;

    let tracker = VersionTracker::new(&tracker_options(&server)).unwrap();
    tracker.get_version(false).await.unwrap();
    tracker.clear_cache();
    tracker.get_version(false).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn get_version_decodes_base64_envelope() {
    let mut server = Server::new_async().await;
    let file = package_json("0.4.1");
    let raw_mock = mock_contents(&mut server, "main", 200, &file, 1).await;
    let enveloped_mock =
        mock_contents(&mut server, "next", 200, &contents_envelope(&file), 1).await;

    let raw = VersionTracker::new(&tracker_options(&server))
        .unwrap()
        .get_version(false)
        .await
        .unwrap();
    let enveloped = VersionTracker::new(&tracker_options(&server).branch("next"))
        .unwrap()
        .get_version(false)
        .await
        .unwrap();

    raw_mock.assert_async().await;
    enveloped_mock.assert_async().await;
    assert_eq!(enveloped.current_version, raw.current_version);
    assert_eq!(enveloped.name, raw.name);
    assert_eq!(enveloped.dependencies, raw.dependencies);
    assert_eq!(enveloped.dev_dependencies, raw.dev_dependencies);
}

#[tokio::test]
async fn check_for_updates_always_refetches() {
    let mut server = Server::new_async().await;
    let mock = mock_contents(&mut server, "main", 200, &package_json("1.3.0"), 3).await;

    let tracker = VersionTracker::new(&tracker_options(&server)).unwrap();
    tracker.get_version(false).await.unwrap();
    let minor = tracker.check_for_updates("1.2.3").await.unwrap();
    let none = tracker.check_for_updates("1.3.0").await.unwrap();

    mock.assert_async().await;
    assert!(minor.has_update);
    assert_eq!(minor.update_type, Some(UpdateType::Minor));
    assert!(!none.has_update);
    assert_eq!(none.update_type, None);
}

#[tokio::test]
async fn check_for_updates_rejects_invalid_baseline_without_request() {
    let mut server = Server::new_async().await;
    let mock = mock_contents(&mut server, "main", 200, &package_json("1.3.0"), 0).await;

    let tracker = VersionTracker::new(&tracker_options(&server)).unwrap();
    let err = tracker.check_for_updates("not-a-version").await.unwrap_err();

    mock.assert_async().await;
    assert!(matches!(err, TrackerError::InvalidVersionFormat { .. }));
}

#[tokio::test]
async fn not_found_names_repository_and_path() {
    let mut server = Server::new_async().await;
    let mock = mock_contents(&mut server, "main", 404, r#"{"message": "Not Found"}"#, 1).await;

    let tracker = VersionTracker::new(&tracker_options(&server)).unwrap();
    let err = tracker.get_version(false).await.unwrap_err();

    mock.assert_async().await;
    assert!(matches!(err, TrackerError::NotFound { .. }));
    assert_eq!(
        err.to_string(),
        "Repository or file not found: acme/widget/package.json (ref: main)"
    );
}

#[tokio::test]
async fn monitor_falls_back_to_alternate_branch() {
    let mut server = Server::new_async().await;
    let main = mock_contents(&mut server, "main", 404, r#"{"message": "Not Found"}"#, 1).await;
    // Once for the version, once for the forced update check
    let master = mock_contents(&mut server, "master", 200, &package_json("2.0.0"), 2).await;

    let monitor = VersionMonitor::new(
        &tracker_options(&server),
        &MonitorOptions {
            fallback_branches: vec!["master".to_string()],
            show_update_check: true,
            current_version: Some("1.9.9".to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    let info = monitor.spawn().wait().await;

    main.assert_async().await;
    master.assert_async().await;
    assert_eq!(info.version.as_deref(), Some("2.0.0"));
    assert_eq!(info.active_branch.as_deref(), Some("master"));
    assert!(info.used_fallback);
    assert_eq!(info.has_update, Some(true));
    assert_eq!(info.update_type, Some(UpdateType::Major));
    assert_eq!(info.error, None);
}
