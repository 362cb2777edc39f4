//! Integration tests for building archives from requested paths

mod common;

use ::common::archive::{
    build_archive, AllowAll, ArchiveError, ArchiveOptions, ArchiveRequest, HiddenPolicy,
    RootConfined, SkipReason,
};

async fn archive_paths(paths: Vec<String>, options: ArchiveOptions) -> Vec<u8> {
    let request = ArchiveRequest::new(paths).unwrap();
    let mut bytes = Vec::new();
    build_archive(&request, &mut bytes, options, &AllowAll)
        .await
        .unwrap();
    bytes
}

#[tokio::test]
async fn test_single_file_uses_base_name() {
    let (data, _temp) = common::setup_tree(&[("report.txt", b"hello")]);

    let bytes = archive_paths(
        vec![common::path_str(&data.join("report.txt"))],
        ArchiveOptions::default(),
    )
    .await;

    let archive = common::read_archive(bytes).await;
    assert_eq!(archive.len(), 1);
    assert_eq!(archive["report.txt"], b"hello");
}

#[tokio::test]
async fn test_directory_keeps_nested_structure() {
    let (data, _temp) = common::setup_tree(&[
        ("photos/a.jpg", b"aaaa"),
        ("photos/sub/b.jpg", b"bbbb"),
    ]);

    let bytes = archive_paths(
        vec![common::path_str(&data.join("photos"))],
        ArchiveOptions::default(),
    )
    .await;

    assert_eq!(
        common::entry_names(bytes.clone()).await,
        vec!["photos/a.jpg", "photos/sub/b.jpg"]
    );
    let archive = common::read_archive(bytes).await;
    assert_eq!(archive["photos/a.jpg"], b"aaaa");
    assert_eq!(archive["photos/sub/b.jpg"], b"bbbb");
}

#[tokio::test]
async fn test_hidden_directory_yields_empty_archive() {
    let (data, _temp) = common::setup_tree(&[(".secret/key.pem", b"private")]);

    let request = ArchiveRequest::new([data.join(".secret")]).unwrap();
    let mut bytes = Vec::new();
    let report = build_archive(&request, &mut bytes, ArchiveOptions::default(), &AllowAll)
        .await
        .unwrap();

    assert_eq!(report.entry_count(), 0);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].reason, SkipReason::Hidden);
    assert!(common::read_archive(bytes).await.is_empty());
}

#[test]
fn test_empty_request_is_rejected() {
    assert!(ArchiveRequest::new(Vec::<String>::new()).is_err());
}

#[tokio::test]
async fn test_missing_path_is_skipped() {
    let (data, _temp) = common::setup_tree(&[("kept.txt", b"kept")]);

    let request =
        ArchiveRequest::new([data.join("missing.txt"), data.join("kept.txt")]).unwrap();
    let mut bytes = Vec::new();
    let report = build_archive(&request, &mut bytes, ArchiveOptions::default(), &AllowAll)
        .await
        .unwrap();

    assert_eq!(report.entries, vec!["kept.txt"]);
    assert_eq!(report.bytes_read, 4);
    assert_eq!(report.skipped[0].path, data.join("missing.txt"));
    assert_eq!(report.skipped[0].reason, SkipReason::Inaccessible);

    let archive = common::read_archive(bytes).await;
    assert_eq!(archive.keys().collect::<Vec<_>>(), vec!["kept.txt"]);
}

#[tokio::test]
async fn test_only_missing_paths_still_finalizes() {
    let (data, _temp) = common::setup_tree(&[]);

    let bytes = archive_paths(
        vec![common::path_str(&data.join("gone"))],
        ArchiveOptions::default(),
    )
    .await;
    assert!(common::read_archive(bytes).await.is_empty());
}

#[tokio::test]
async fn test_mixed_files_and_directories_in_request_order() {
    let (data, _temp) = common::setup_tree(&[
        ("notes.md", b"# notes"),
        ("src/main.rs", b"fn main() {}"),
        ("src/.env", b"KEY=1"),
        ("src/.git/HEAD", b"ref"),
    ]);

    let bytes = archive_paths(
        vec![
            common::path_str(&data.join("src")),
            common::path_str(&data.join("notes.md")),
        ],
        ArchiveOptions::default(),
    )
    .await;

    // Hidden files stay, hidden directories go.
    assert_eq!(
        common::entry_names(bytes).await,
        vec!["src/.env", "src/main.rs", "notes.md"]
    );
}

#[tokio::test]
async fn test_hidden_policies() {
    let (data, _temp) = common::setup_tree(&[
        ("src/main.rs", b"fn main() {}"),
        ("src/.env", b"KEY=1"),
        ("src/.git/HEAD", b"ref"),
    ]);
    let paths = vec![common::path_str(&data.join("src"))];

    let skip_all = ArchiveOptions::new(HiddenPolicy::SkipAll, 64);
    assert_eq!(
        common::entry_names(archive_paths(paths.clone(), skip_all).await).await,
        vec!["src/main.rs"]
    );

    let include = ArchiveOptions::new(HiddenPolicy::Include, 64);
    assert_eq!(
        common::entry_names(archive_paths(paths, include).await).await,
        vec!["src/.env", "src/.git/HEAD", "src/main.rs"]
    );
}

#[tokio::test]
async fn test_requested_hidden_file_follows_policy() {
    let (data, _temp) = common::setup_tree(&[(".env", b"KEY=1"), ("main.rs", b"fn main() {}")]);
    let paths = vec![
        common::path_str(&data.join(".env")),
        common::path_str(&data.join("main.rs")),
    ];

    let request = ArchiveRequest::new(paths.clone()).unwrap();
    let mut bytes = Vec::new();
    let report = build_archive(
        &request,
        &mut bytes,
        ArchiveOptions::new(HiddenPolicy::SkipAll, 64),
        &AllowAll,
    )
    .await
    .unwrap();
    assert_eq!(common::entry_names(bytes).await, vec!["main.rs"]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].reason, SkipReason::Hidden);

    // The default only filters directories.
    assert_eq!(
        common::entry_names(archive_paths(paths, ArchiveOptions::default()).await).await,
        vec![".env", "main.rs"]
    );
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_unreadable_file_is_left_out() {
    let (data, _temp) = common::setup_tree(&[("ok.txt", b"ok")]);

    // Opens as a regular file, but reading from offset zero fails.
    let request =
        ArchiveRequest::new(["/proc/self/mem".into(), data.join("ok.txt")]).unwrap();
    let mut bytes = Vec::new();
    let report = build_archive(&request, &mut bytes, ArchiveOptions::default(), &AllowAll)
        .await
        .unwrap();

    assert_eq!(report.entries, vec!["ok.txt"]);
    assert_eq!(report.skipped.len(), 1);
    assert!(matches!(report.skipped[0].reason, SkipReason::ReadFailed(_)));
    assert_eq!(common::entry_names(bytes).await, vec!["ok.txt"]);
}

#[tokio::test]
async fn test_same_request_twice_is_identical() {
    let (data, _temp) = common::setup_tree(&[
        ("docs/a.txt", b"alpha"),
        ("docs/z/b.txt", b"beta"),
        ("docs/m/c.txt", b"gamma"),
        ("top.txt", b"top"),
    ]);
    let paths = vec![
        common::path_str(&data.join("docs")),
        common::path_str(&data.join("top.txt")),
    ];

    let first = archive_paths(paths.clone(), ArchiveOptions::default()).await;
    let second = archive_paths(paths, ArchiveOptions::default()).await;

    assert_eq!(
        common::entry_names(first.clone()).await,
        common::entry_names(second.clone()).await
    );
    assert_eq!(
        common::read_archive(first).await,
        common::read_archive(second).await
    );
}

#[tokio::test]
async fn test_large_file_round_trips() {
    let contents: Vec<u8> = (0..300_000u32).map(|i| (i % 251) as u8).collect();
    let (data, _temp) = common::setup_tree(&[("big.bin", &contents)]);

    let bytes = archive_paths(
        vec![common::path_str(&data.join("big.bin"))],
        ArchiveOptions::default(),
    )
    .await;

    // Repetitive input, so deflate should shrink it well below the source.
    assert!(bytes.len() < contents.len() / 4);
    assert_eq!(common::read_archive(bytes).await["big.bin"], contents);
}

#[tokio::test]
async fn test_disconnected_sink_stops_the_archive() {
    let (data, _temp) = common::setup_tree(&[("a.txt", b"a"), ("b.txt", b"b")]);

    let (reader, writer) = tokio::io::duplex(1024);
    drop(reader);

    let request = ArchiveRequest::new([data.join("a.txt"), data.join("b.txt")]).unwrap();
    let result = build_archive(&request, writer, ArchiveOptions::default(), &AllowAll).await;
    assert!(matches!(result, Err(ArchiveError::WriteFailed(_))));
}

#[tokio::test]
async fn test_streams_through_bounded_pipe() {
    let contents: Vec<u8> = (0..200_000u32).map(|i| (i % 7) as u8).collect();
    let (data, _temp) = common::setup_tree(&[("dir/one.bin", &contents), ("dir/two.txt", b"2")]);

    let (mut reader, writer) = tokio::io::duplex(4 * 1024);
    let request = ArchiveRequest::new([data.join("dir")]).unwrap();
    let producer = tokio::spawn(async move {
        build_archive(&request, writer, ArchiveOptions::default(), &AllowAll).await
    });

    let mut bytes = Vec::new();
    tokio::io::AsyncReadExt::read_to_end(&mut reader, &mut bytes)
        .await
        .unwrap();
    let report = producer.await.unwrap().unwrap();

    assert_eq!(report.entries, vec!["dir/one.bin", "dir/two.txt"]);
    let archive = common::read_archive(bytes).await;
    assert_eq!(archive["dir/one.bin"], contents);
    assert_eq!(archive["dir/two.txt"], b"2");
}

#[tokio::test]
async fn test_root_confined_policy() {
    let (data, temp) = common::setup_tree(&[("inside/ok.txt", b"ok")]);
    std::fs::write(temp.path().join("outside.txt"), b"nope").unwrap();

    let policy = RootConfined::new(&data);
    let request = ArchiveRequest::new([
        temp.path().join("outside.txt"),
        data.join("inside"),
        data.join("../outside.txt"),
    ])
    .unwrap();

    let mut bytes = Vec::new();
    let report = build_archive(&request, &mut bytes, ArchiveOptions::default(), &policy)
        .await
        .unwrap();

    assert_eq!(report.entries, vec!["inside/ok.txt"]);
    assert_eq!(report.skipped.len(), 2);
    assert!(report
        .skipped
        .iter()
        .all(|s| matches!(s.reason, SkipReason::Rejected(_))));
}

#[cfg(unix)]
#[tokio::test]
async fn test_root_confined_rejects_walked_symlink_escape() {
    let (data, temp) = common::setup_tree(&[("shared/readme.txt", b"hi")]);
    std::fs::write(temp.path().join("secret.txt"), b"secret").unwrap();
    std::os::unix::fs::symlink(
        temp.path().join("secret.txt"),
        data.join("shared/secret.txt"),
    )
    .unwrap();

    let policy = RootConfined::new(&data);
    let request = ArchiveRequest::new([data.join("shared")]).unwrap();
    let mut bytes = Vec::new();
    let report = build_archive(&request, &mut bytes, ArchiveOptions::default(), &policy)
        .await
        .unwrap();

    assert_eq!(report.entries, vec!["shared/readme.txt"]);
    assert_eq!(report.skipped[0].path, data.join("shared/secret.txt"));

    // Without the policy the link target is archived like any file.
    let mut bytes = Vec::new();
    let report = build_archive(&request, &mut bytes, ArchiveOptions::default(), &AllowAll)
        .await
        .unwrap();
    assert_eq!(
        report.entries,
        vec!["shared/readme.txt", "shared/secret.txt"]
    );
}
