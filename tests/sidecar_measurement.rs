//! End-to-end tests over real files: sidecar landmarks, single-image
//! measurement, annotation and the bulk CSV report.

use std::fs;
use std::path::{Path, PathBuf};

use fwhr::annotate::{draw_box, save_annotated, BOX_COLOR};
use fwhr::bulk::{run_bulk, save_csv, SortBy, REPORT_FILENAME};
use fwhr::{
    measure_image, Error, FwhrOptions, HeightMethod, Landmark, SidecarSource, TopLine,
};
use image::{DynamicImage, RgbImage};

/// 68 points with the measurement and pose landmarks placed on a frontal
/// face: width 100..300, eyelids at y=165, brows at y=150, lip at y=250.
fn frontal_points(scale: f32) -> Vec<[f32; 2]> {
    let mut points = vec![[0.0, 0.0]; 68];
    let placed: [(usize, f32, f32); 15] = [
        (0, 100.0, 200.0),
        (16, 300.0, 200.0),
        (18, 140.0, 150.0),
        (25, 260.0, 150.0),
        (27, 200.0, 160.0),
        (30, 200.0, 220.0),
        (36, 130.0, 170.0),
        (37, 145.0, 165.0),
        (41, 145.0, 175.0),
        (43, 255.0, 165.0),
        (44, 265.0, 165.0),
        (45, 270.0, 170.0),
        (46, 265.0, 175.0),
        (50, 190.0, 250.0),
        (52, 210.0, 250.0),
    ];
    for (idx, x, y) in placed {
        points[idx] = [x * scale, y * scale];
    }
    points
}

fn write_image(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    RgbImage::new(400, 400).save(&path).unwrap();
    path
}

fn write_sidecar(image: &Path, faces: &serde_json::Value) {
    fs::write(
        SidecarSource::sidecar_path(image),
        serde_json::to_string(faces).unwrap(),
    )
    .unwrap();
}

#[test]
fn measures_first_face_from_sidecar() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_image(dir.path(), "portrait.png");
    write_sidecar(&image, &serde_json::json!([frontal_points(1.0)]));

    let m = measure_image(&mut SidecarSource::new(), &image, 0, &FwhrOptions::default()).unwrap();
    assert!((m.ratio - 200.0 / 89.0).abs() < 1e-5);
    assert!(m.pose.is_some());

    let brow = FwhrOptions {
        top: TopLine::Eyebrow,
        method: HeightMethod::Left,
        pose_check: true,
    };
    let m = measure_image(&mut SidecarSource::new(), &image, 0, &brow).unwrap();
    assert!((m.ratio - 2.0).abs() < 1e-6);
}

#[test]
fn selects_requested_face() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_image(dir.path(), "group.png");
    write_sidecar(
        &image,
        &serde_json::json!([frontal_points(1.0), frontal_points(0.5)]),
    );
    let options = FwhrOptions {
        top: TopLine::Eyebrow,
        ..Default::default()
    };

    let first = measure_image(&mut SidecarSource::new(), &image, 0, &options).unwrap();
    let second = measure_image(&mut SidecarSource::new(), &image, 1, &options).unwrap();
    assert!((first.ratio - second.ratio).abs() < 1e-5);
    assert!((second.width - 100.0).abs() < 1e-4);

    let err = measure_image(&mut SidecarSource::new(), &image, 2, &options).unwrap_err();
    assert!(matches!(err, Error::FaceIndexOutOfRange { index: 2, count: 2 }));
}

#[test]
fn reports_each_failure_kind() {
    let dir = tempfile::tempdir().unwrap();
    let options = FwhrOptions::default();

    // image missing
    let missing = dir.path().join("missing.png");
    let err = measure_image(&mut SidecarSource::new(), &missing, 0, &options).unwrap_err();
    assert!(matches!(err, Error::FileNotFound(p) if p == missing));

    // sidecar missing
    let image = write_image(dir.path(), "nosidecar.png");
    let err = measure_image(&mut SidecarSource::new(), &image, 0, &options).unwrap_err();
    assert!(matches!(err, Error::FileNotFound(p) if p == SidecarSource::sidecar_path(&image)));

    // no faces
    let image = write_image(dir.path(), "empty.png");
    write_sidecar(&image, &serde_json::json!([]));
    let err = measure_image(&mut SidecarSource::new(), &image, 0, &options).unwrap_err();
    assert!(matches!(err, Error::NoFaceDetected));

    // upper lip missing
    let image = write_image(dir.path(), "nolip.png");
    write_sidecar(
        &image,
        &serde_json::json!([{
            "face_left": [10, 50],
            "face_right": [90, 50],
            "eyelid_left": [30, 20],
            "eyelid_right": [70, 20]
        }]),
    );
    let lenient = FwhrOptions {
        pose_check: false,
        ..Default::default()
    };
    let err = measure_image(&mut SidecarSource::new(), &image, 0, &lenient).unwrap_err();
    assert!(matches!(err, Error::MissingLandmark(Landmark::UpperLipLeft)));

    // flat face
    let image = write_image(dir.path(), "flat.png");
    write_sidecar(
        &image,
        &serde_json::json!([{
            "face_left": [10, 50],
            "face_right": [90, 50],
            "brow_left": [30, 50],
            "brow_right": [70, 50],
            "upper_lip_left": [45, 50],
            "upper_lip_right": [55, 50]
        }]),
    );
    let flat = FwhrOptions {
        top: TopLine::Eyebrow,
        pose_check: false,
        ..Default::default()
    };
    let err = measure_image(&mut SidecarSource::new(), &image, 0, &flat).unwrap_err();
    assert!(matches!(err, Error::DegenerateGeometry(_)));
}

#[test]
fn explicit_sidecar_path() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_image(dir.path(), "a.png");
    let landmarks = dir.path().join("landmarks.json");
    fs::write(
        &landmarks,
        serde_json::to_string(&serde_json::json!([frontal_points(2.0)])).unwrap(),
    )
    .unwrap();

    let options = FwhrOptions {
        top: TopLine::Eyebrow,
        ..Default::default()
    };
    let m = measure_image(&mut SidecarSource::with_path(&landmarks), &image, 0, &options).unwrap();
    assert!((m.ratio - 2.0).abs() < 1e-6);
}

#[test]
fn annotation_draws_measured_box() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_image(dir.path(), "portrait.png");
    write_sidecar(&image, &serde_json::json!([frontal_points(1.0)]));

    let m = measure_image(&mut SidecarSource::new(), &image, 0, &FwhrOptions::default()).unwrap();
    let out = dir.path().join("annotated.png");
    save_annotated(&image, &out, &m.fwhr_box).unwrap();

    let annotated = image::open(&out).unwrap().to_rgb8();
    assert_eq!(annotated.dimensions(), (400, 400));
    assert_eq!(*annotated.get_pixel(200, 161), BOX_COLOR);
    assert_eq!(*annotated.get_pixel(100, 200), BOX_COLOR);
    assert_eq!(*annotated.get_pixel(200, 200), image::Rgb([0, 0, 0]));

    let direct = draw_box(&DynamicImage::ImageRgb8(RgbImage::new(400, 400)), &m.fwhr_box);
    assert_eq!(direct, annotated);
}

#[test]
fn annotation_survives_huge_face_width() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_image(dir.path(), "wide.png");
    let mut points = frontal_points(1.0);
    points[0] = [-3e9, 200.0];
    points[16] = [3e9, 200.0];
    write_sidecar(&image, &serde_json::json!([points]));

    let lenient = FwhrOptions {
        pose_check: false,
        ..Default::default()
    };
    let m = measure_image(&mut SidecarSource::new(), &image, 0, &lenient).unwrap();
    assert!(m.ratio.is_finite());

    let out = dir.path().join("wide_annotated.png");
    save_annotated(&image, &out, &m.fwhr_box).unwrap();
    let annotated = image::open(&out).unwrap().to_rgb8();
    assert_eq!(*annotated.get_pixel(0, 161), BOX_COLOR);
    assert_eq!(*annotated.get_pixel(399, 250), BOX_COLOR);
}

#[test]
fn bulk_report_over_folder() {
    let dir = tempfile::tempdir().unwrap();
    let options = FwhrOptions {
        top: TopLine::Eyebrow,
        ..Default::default()
    };

    // b: ratio 2.0
    let b = write_image(dir.path(), "b.png");
    write_sidecar(&b, &serde_json::json!([frontal_points(1.0)]));

    // a: wider face, ratio 2.4
    let a = write_image(dir.path(), "a.png");
    let mut wide = frontal_points(1.0);
    wide[0][0] -= 20.0;
    wide[16][0] += 20.0;
    write_sidecar(&a, &serde_json::json!([wide]));

    // c: no sidecar, recorded without ratio
    write_image(dir.path(), "c.png");

    fs::write(dir.path().join("notes.txt"), "not an image").unwrap();

    let rows = run_bulk(&mut SidecarSource::new(), dir.path(), &options, SortBy::Ratio).unwrap();
    let names: Vec<_> = rows.iter().map(|r| r.filename.as_str()).collect();
    assert_eq!(names, ["b.png", "a.png", "c.png"]);
    assert!((rows[0].ratio.unwrap() - 2.0).abs() < 1e-6);
    assert!((rows[1].ratio.unwrap() - 2.4).abs() < 1e-5);
    assert_eq!(rows[2].ratio, None);

    let report = dir.path().join(REPORT_FILENAME);
    save_csv(&report, &rows).unwrap();
    let csv = fs::read_to_string(&report).unwrap();
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(lines[0], "Filename,Ratio");
    assert_eq!(lines[1], "b.png,2");
    assert!(lines[2].starts_with("a.png,2.4"));
    assert_eq!(lines[3], "c.png,");

    let rows = run_bulk(&mut SidecarSource::new(), dir.path(), &options, SortBy::Filename).unwrap();
    let names: Vec<_> = rows.iter().map(|r| r.filename.as_str()).collect();
    assert_eq!(names, ["a.png", "b.png", "c.png"]);
}
