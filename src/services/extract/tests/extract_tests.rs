use super::*;
use crate::services::config::TextureConfig;
use crate::test_utils::{create_test_zip, dict, init_test_logger, keyed_archive, png_bytes, s, Node};
use std::cell::RefCell;
use std::rc::Rc;
use tempfile::TempDir;

fn brush_archive() -> Vec<u8> {
    keyed_archive(vec![
        s("$null"),
        dict(&[
            ("name", Node::Uid(2)),
            ("bundledShapePath", Node::Uid(0)),
            ("bundledGrainPath", Node::Uid(3)),
            ("$class", Node::Uid(4)),
            ("settings", Node::Data(vec![0x0A, 0xFF])),
        ]),
        s("Dry Ink"),
        s("Paper.png"),
        dict(&[("$classname", s("SilicaBrush"))]),
    ])
}

fn extractor_in(tmp: &Path) -> BrushsetExtractor {
    BrushsetExtractor::new(ExtractConfig {
        output_dir: tmp.join("cache"),
        texture: TextureConfig {
            asset_dir: tmp.join("images"),
            ..TextureConfig::default()
        },
        ..ExtractConfig::default()
    })
}

/// Image hook that records which members reached it.
#[derive(Clone, Default)]
struct RecordingImages(Rc<RefCell<Vec<PathBuf>>>);

impl ImagePassThrough for RecordingImages {
    fn pass_through(&self, _image_data: &[u8], target_path: &Path) -> Result<(), String> {
        self.0.borrow_mut().push(target_path.to_path_buf());
        Ok(())
    }
}

#[derive(Clone, Default)]
struct RecordingReorganizer(Rc<RefCell<Vec<PathBuf>>>);

impl OutputReorganizer for RecordingReorganizer {
    fn reorganize(&self, output_root: &Path) -> Result<(), String> {
        self.0.borrow_mut().push(output_root.to_path_buf());
        Ok(())
    }
}

#[test]
fn test_classify_members() {
    let config = ExtractConfig::default();
    assert_eq!(classify("a/QuickLook/Thumbnail.png", false, &config), MemberKind::Skipped);
    assert_eq!(classify("AuthorPicture/me.jpg", false, &config), MemberKind::Skipped);
    assert_eq!(classify("Signature/sig", false, &config), MemberKind::Skipped);
    assert_eq!(classify("a/Reset/Brush.archive", false, &config), MemberKind::Skipped);
    assert_eq!(classify("a/", true, &config), MemberKind::Directory);
    assert_eq!(classify("a/Shape.PNG", false, &config), MemberKind::Raster);
    assert_eq!(classify("a/Grain.jpeg", false, &config), MemberKind::Raster);
    assert_eq!(classify("a/Brush.archive", false, &config), MemberKind::Archive);
    assert_eq!(classify("brushset.plist", false, &config), MemberKind::Other);
    assert_eq!(classify("README", false, &config), MemberKind::Other);
}

#[test]
fn test_document_path_replaces_extension() {
    assert_eq!(
        document_path(Path::new("out/a/Brush.archive"), "_resolved_params.json"),
        PathBuf::from("out/a/Brush_resolved_params.json")
    );
}

#[test]
fn test_extract_full_brushset() {
    init_test_logger();
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("images")).unwrap();
    fs::write(tmp.path().join("images").join("Paper.png"), png_bytes(2, 2)).unwrap();

    let shape = png_bytes(4, 4);
    let archive = brush_archive();
    let zip_path = create_test_zip(
        tmp.path(),
        "Inks.brushset",
        &[
            ("brush/", b""),
            ("brush/Shape.png", &shape),
            ("brush/Brush.archive", &archive),
            ("brush/QuickLook/Thumbnail.png", &shape),
            ("brush/Reset/Brush.archive", &archive),
            ("brushset.plist", b"plist"),
        ],
    );

    let report = extractor_in(tmp.path()).extract(&zip_path, None, None).unwrap();
    let root = tmp.path().join("cache").join("Inks.brushset");
    let brush_dir = root.join("brush");
    let doc_path = brush_dir.join("Brush_resolved_params.json");

    assert_eq!(report.output_root, root);
    assert_eq!(report.total_members, 6);
    assert_eq!(report.documents, vec![doc_path.clone()]);
    assert_eq!(report.images, vec![brush_dir.join("Shape.png")]);
    assert_eq!(report.skipped, 2);
    assert_eq!(report.ignored, 1);
    assert!(report.failures.is_empty());
    assert!(report.is_clean());

    let text = fs::read_to_string(&doc_path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["name"], "Dry Ink");
    assert_eq!(json["bundledShapePath"], "Shape.png");
    assert_eq!(json["bundledGrainPath"], "Paper.png");
    assert_eq!(json["settings"], "0aff");
    assert_eq!(json["$class"]["$classname"], "SilicaBrush");

    // Keys sorted, 4-space indent.
    let class_at = text.find("\"$class\"").unwrap();
    let grain_at = text.find("\"bundledGrainPath\"").unwrap();
    let name_at = text.find("\"name\"").unwrap();
    assert!(class_at < grain_at && grain_at < name_at);
    assert!(text.contains("\n    \"name\": \"Dry Ink\""));

    assert!(brush_dir.join("Paper.png").exists());
    assert!(!brush_dir.join("QuickLook").exists());
    assert!(!brush_dir.join("Reset").exists());
}

#[test]
fn test_skipped_members_never_reach_handlers() {
    let tmp = TempDir::new().unwrap();
    let zip_path = create_test_zip(
        tmp.path(),
        "set.brushset",
        &[
            ("a/QuickLook/Thumbnail.png", b"x"),
            ("a/QuickLook/Brush.archive", b"not decoded"),
            ("a/Shape.png", b"x"),
        ],
    );

    let images = RecordingImages::default();
    let extractor = extractor_in(tmp.path()).with_image_pass_through(images.clone());
    let report = extractor.extract(&zip_path, None, None).unwrap();

    let seen = images.0.borrow();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].ends_with("a/Shape.png"));
    assert!(report.failures.is_empty());
    assert!(report.documents.is_empty());
}

#[test]
fn test_progress_reaches_100_once_on_last_member() {
    let tmp = TempDir::new().unwrap();
    let zip_path = create_test_zip(
        tmp.path(),
        "set.brushset",
        &[
            ("a.txt", b"1"),
            ("QuickLook/b.png", b"2"),
            ("c.txt", b"3"),
        ],
    );

    let mut seen = Vec::new();
    let mut sink = |p: f64| seen.push(p);
    extractor_in(tmp.path())
        .extract(&zip_path, Some(&mut sink), None)
        .unwrap();

    assert_eq!(seen.len(), 3);
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(seen.iter().filter(|p| **p == 100.0).count(), 1);
    assert_eq!(seen.last(), Some(&100.0));
}

#[test]
fn test_bad_member_does_not_stop_siblings() {
    init_test_logger();
    let tmp = TempDir::new().unwrap();
    let good = brush_archive();
    let cyclic = keyed_archive(vec![s("$null"), Node::Uid(1)]);
    let zip_path = create_test_zip(
        tmp.path(),
        "set.brushset",
        &[
            ("a/Bad.archive", b"garbage"),
            ("b/Loop.archive", &cyclic),
            ("c/Good.archive", &good),
        ],
    );

    let report = extractor_in(tmp.path()).extract(&zip_path, None, None).unwrap();

    assert_eq!(report.failures.len(), 2);
    assert_eq!(report.failures[0].member, "a/Bad.archive");
    assert!(report.failures[0].error.contains("Decode failed"));
    assert_eq!(report.failures[1].member, "b/Loop.archive");
    assert!(report.failures[1].error.contains("re-enters"));
    assert_eq!(report.documents.len(), 1);
    assert!(report.documents[0].ends_with("c/Good_resolved_params.json"));
    assert!(!report.is_clean());
}

#[test]
fn test_missing_textures_are_warnings() {
    let tmp = TempDir::new().unwrap();
    let zip_path = create_test_zip(tmp.path(), "set.brushset", &[("a/Brush.archive", &brush_archive())]);

    let report = extractor_in(tmp.path()).extract(&zip_path, None, None).unwrap();

    assert!(report.failures.is_empty());
    assert_eq!(report.documents.len(), 1);
    assert_eq!(report.warnings.len(), 2);

    let json: serde_json::Value =
        serde_json::from_slice(&fs::read(&report.documents[0]).unwrap()).unwrap();
    assert_eq!(json["bundledShapePath"], "$null");
}

#[test]
fn test_cancel_stops_between_members() {
    let tmp = TempDir::new().unwrap();
    let zip_path = create_test_zip(
        tmp.path(),
        "set.brushset",
        &[("a.txt", b"1"), ("b.txt", b"2"), ("c.txt", b"3")],
    );

    let cancel = CancelFlag::new();
    let reorganizer = RecordingReorganizer::default();
    let extractor = extractor_in(tmp.path()).with_reorganizer(reorganizer.clone());
    let mut sink = |_: f64| cancel.cancel();
    let report = extractor
        .extract(&zip_path, Some(&mut sink), Some(&cancel))
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.ignored, 1);
    assert!(reorganizer.0.borrow().is_empty());
}

#[test]
fn test_reorganizer_receives_output_root() {
    let tmp = TempDir::new().unwrap();
    let zip_path = create_test_zip(tmp.path(), "set.brushset", &[("a.txt", b"1")]);

    let reorganizer = RecordingReorganizer::default();
    let extractor = extractor_in(tmp.path()).with_reorganizer(reorganizer.clone());
    let report = extractor.extract(&zip_path, None, None).unwrap();

    assert_eq!(*reorganizer.0.borrow(), vec![report.output_root]);
}

#[test]
fn test_batch_continues_past_invalid_file() {
    let tmp = TempDir::new().unwrap();
    let bogus = tmp.path().join("bogus.brushset");
    fs::write(&bogus, b"not a zip").unwrap();
    let good = create_test_zip(tmp.path(), "good.brushset", &[("a.txt", b"1")]);

    let outcomes = extractor_in(tmp.path()).extract_batch(&[bogus.clone(), good.clone()], None, None);

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].source, bogus);
    assert!(matches!(outcomes[0].result, Err(ContainerError::Invalid { .. })));
    assert_eq!(outcomes[1].source, good);
    assert!(outcomes[1].result.is_ok());
}

#[test]
fn test_batch_reports_progress_for_every_file() {
    let tmp = TempDir::new().unwrap();
    let first = create_test_zip(
        tmp.path(),
        "first.brushset",
        &[("a.txt", b"1"), ("b.txt", b"2")],
    );
    let second = create_test_zip(tmp.path(), "second.brushset", &[("c.txt", b"3")]);

    let mut seen = Vec::new();
    let mut sink = |p: f64| seen.push(p);
    let outcomes = extractor_in(tmp.path()).extract_batch(&[first, second], Some(&mut sink), None);

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.result.is_ok()));
    assert_eq!(seen, vec![50.0, 100.0, 100.0]);
}
