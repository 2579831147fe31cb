use super::*;

// =============================================================================
// MediaKind size ceilings
// =============================================================================

#[test]
fn image_accepts_exactly_twenty_mib() {
    assert!(MediaKind::Image.check_size(20 * MIB).is_ok());
}

#[test]
fn image_rejects_twenty_mib_plus_one() {
    let err = MediaKind::Image.check_size(20 * MIB + 1).unwrap_err();
    assert!(matches!(err, UploadError::TooLarge { kind: MediaKind::Image, limit, .. } if limit == 20 * MIB));
}

#[test]
fn video_accepts_exactly_fifty_mib() {
    assert!(MediaKind::Video.check_size(50 * MIB).is_ok());
}

#[test]
fn video_rejects_fifty_mib_plus_one() {
    assert!(MediaKind::Video.check_size(50 * MIB + 1).is_err());
}

#[test]
fn video_ceiling_applies_only_to_video() {
    assert!(MediaKind::Video.check_size(30 * MIB).is_ok());
    assert!(MediaKind::Image.check_size(30 * MIB).is_err());
}

#[test]
fn too_large_message_names_limit() {
    let msg = MediaKind::Video.check_size(60 * MIB).unwrap_err().to_string();
    assert!(msg.contains("video"));
    assert!(msg.contains("50MB"));
}

#[test]
fn media_kind_parses_case_insensitively() {
    assert_eq!("Image".parse::<MediaKind>(), Ok(MediaKind::Image));
    assert_eq!("video".parse::<MediaKind>(), Ok(MediaKind::Video));
    assert!("audio".parse::<MediaKind>().is_err());
}

// =============================================================================
// Variant
// =============================================================================

#[test]
fn variant_styles_differ() {
    assert_eq!(Variant::Dark.styles().button, "bg-dark-300");
    assert_eq!(Variant::Light.styles().placeholder, "text-slate-500");
    assert_ne!(Variant::Dark.styles(), Variant::Light.styles());
}

#[test]
fn variant_parses() {
    assert_eq!("light".parse::<Variant>(), Ok(Variant::Light));
    assert!("sepia".parse::<Variant>().is_err());
}

// =============================================================================
// Progress
// =============================================================================

#[test]
fn progress_percent_rounds() {
    assert_eq!(Progress { loaded: 0, total: 200 }.percent(), 0);
    assert_eq!(Progress { loaded: 1, total: 200 }.percent(), 1);
    assert_eq!(Progress { loaded: 1, total: 3 }.percent(), 33);
    assert_eq!(Progress { loaded: 2, total: 3 }.percent(), 67);
    assert_eq!(Progress { loaded: 200, total: 200 }.percent(), 100);
}

#[test]
fn progress_percent_handles_degenerate_totals() {
    assert_eq!(Progress { loaded: 0, total: 0 }.percent(), 100);
    assert_eq!(Progress { loaded: 10, total: 5 }.percent(), 100);
}

// =============================================================================
// UploadedFile / media_url
// =============================================================================

#[test]
fn uploaded_file_parses_cdn_shape() {
    let json = r#"{
        "fileId": "f1",
        "name": "abc_x1.png",
        "filePath": "/uploads/abc_x1.png",
        "url": "https://ik.imagekit.io/demo/uploads/abc_x1.png",
        "thumbnailUrl": "https://ik.imagekit.io/demo/tr:n-thumb/uploads/abc_x1.png",
        "size": 1024,
        "fileType": "image",
        "height": 10,
        "width": 10
    }"#;
    let file: UploadedFile = serde_json::from_str(json).unwrap();
    assert_eq!(file.file_path, "/uploads/abc_x1.png");
    assert_eq!(file.size, Some(1024));
    assert_eq!(file.file_type.as_deref(), Some("image"));
}

#[test]
fn uploaded_file_requires_file_path() {
    assert!(serde_json::from_str::<UploadedFile>(r#"{"fileId":"f1"}"#).is_err());
}

#[test]
fn media_url_joins_with_single_slash() {
    assert_eq!(media_url("https://ik.imagekit.io/demo/", "/uploads/a.png"), "https://ik.imagekit.io/demo/uploads/a.png");
    assert_eq!(media_url("https://ik.imagekit.io/demo", "uploads/a.png"), "https://ik.imagekit.io/demo/uploads/a.png");
}

// =============================================================================
// SelectedFile
// =============================================================================

#[tokio::test]
async fn selected_file_from_bytes_knows_size() {
    let file = SelectedFile::from_bytes("a.png", vec![1_u8, 2, 3]);
    assert_eq!(file.size, 3);
    assert_eq!(&file.read().await.unwrap()[..], &[1, 2, 3]);
}

#[tokio::test]
async fn selected_file_open_stats_disk_file() {
    let path = std::env::temp_dir().join(format!("shelfgate-selected-{}.bin", std::process::id()));
    tokio::fs::write(&path, b"hello").await.unwrap();

    let file = SelectedFile::open(&path).await.unwrap();
    assert_eq!(file.size, 5);
    assert!(file.name.starts_with("shelfgate-selected-"));
    assert_eq!(&file.read().await.unwrap()[..], b"hello");

    tokio::fs::remove_file(&path).await.unwrap();
}

#[tokio::test]
async fn selected_file_open_rejects_directory() {
    assert!(SelectedFile::open(std::env::temp_dir()).await.is_err());
}
