#![cfg(feature = "image-io")]
//! Frame directories in, image files out.

mod common;

use common::Document;
use scrollstitch::io::load_frame;
use scrollstitch::{
    FrameSource, ImageFileSink, ImageSequenceSource, NoProgress, StitchError, StitchParams,
    Stitcher,
};
use std::fs;
use std::path::PathBuf;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("scrollstitch-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn missing_directory_is_source_unavailable() {
    let err = ImageSequenceSource::open("/definitely/not/a/frame/dir", 30.0).unwrap_err();
    assert!(matches!(err, StitchError::SourceUnavailable { .. }));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn empty_directory_fails_on_first_read() {
    let dir = scratch_dir("empty");
    fs::write(dir.join("notes.txt"), "not a frame").unwrap();

    let source = ImageSequenceSource::open(&dir, 30.0).unwrap();
    assert_eq!(source.frame_count(), 0);
    let err = Stitcher::new(source, StitchParams::default())
        .unwrap()
        .run()
        .unwrap_err();
    assert!(matches!(err, StitchError::EmptySource));
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn png_frames_stitch_into_a_png_panorama() {
    let (width, viewport) = (64, 150);
    let doc = Document::random(width, 400, 51);
    let dir = scratch_dir("frames");
    for (i, top) in [0usize, 30, 30, 75].into_iter().enumerate() {
        let frame = doc.window(top, viewport);
        let img = image::RgbImage::from_raw(width as u32, viewport as u32, frame.into_rgb()).unwrap();
        img.save(dir.join(format!("frame_{i:04}.png"))).unwrap();
    }

    let source = ImageSequenceSource::open(&dir, 24.0).unwrap();
    assert_eq!(source.width(), width);
    assert_eq!(source.frame_count(), 4);
    assert_eq!(source.capture_rate(), 24.0);

    let out_path = dir.join("panorama.png");
    let mut sink = ImageFileSink::new(&out_path);
    let summary = Stitcher::new(source, StitchParams::default().with_template_height(50))
        .unwrap()
        .run_into(&mut NoProgress, &mut sink)
        .unwrap();
    assert_eq!(summary.final_height, viewport + 75);
    assert_eq!(summary.duplicates_skipped, 1);

    let saved = load_frame(&out_path).unwrap();
    assert_eq!((saved.width(), saved.height()), (width, viewport + 75));
    assert_eq!(saved.rgb(), doc.head(viewport + 75));
    fs::remove_dir_all(&dir).unwrap();
}
