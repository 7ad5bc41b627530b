use image::{DynamicImage, Rgba, RgbaImage};
use spritepress_core::prelude::*;

fn opaque(w: u32, h: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255])))
}

fn group(sources: Vec<SpriteSource>, options: BuildOptions) -> BuildGroup {
    BuildGroup {
        name: "broken".into(),
        sources,
        options,
    }
}

/// Build failures come back wrapped with the group name.
fn unwrap_group(err: AtlasError) -> AtlasError {
    match err {
        AtlasError::InGroup { group, source } => {
            assert_eq!(group, "broken");
            *source
        }
        other => panic!("expected InGroup, got {other:?}"),
    }
}

#[test]
fn empty_group_is_rejected() {
    let err = build_atlases(vec![group(vec![], BuildOptions::default())]).unwrap_err();
    match unwrap_group(err) {
        AtlasError::EmptyInput => {}
        other => panic!("expected EmptyInput, got {other:?}"),
    }
}

#[test]
fn oversized_sprite_fails_fast() {
    let sources = vec![SpriteSource {
        path: "big/backdrop.png".into(),
        image: opaque(500, 500),
    }];
    let options = BuildOptions::builder()
        .margin(0)
        .max_size(256)
        .trim(false)
        .build();
    let err = build_atlases(vec![group(sources, options)]).unwrap_err();
    match unwrap_group(err) {
        AtlasError::OversizedItem {
            path,
            width,
            height,
            max,
        } => {
            assert_eq!(path, "big/backdrop.png");
            assert_eq!((width, height), (500, 500));
            assert_eq!(max, 256);
        }
        other => panic!("expected OversizedItem, got {other:?}"),
    }
}

#[test]
fn margin_counts_against_the_size_limit() {
    let sources = vec![SpriteSource {
        path: "big/exact.png".into(),
        image: opaque(256, 256),
    }];
    let options = BuildOptions::builder()
        .margin(1)
        .max_size(256)
        .trim(false)
        .build();
    let err = build_atlases(vec![group(sources, options)]).unwrap_err();
    match unwrap_group(err) {
        AtlasError::OversizedItem { width, height, .. } => {
            assert_eq!((width, height), (257, 257));
        }
        other => panic!("expected OversizedItem, got {other:?}"),
    }
}

#[test]
fn fully_transparent_sprite_fails_when_trimming() {
    let sources = vec![SpriteSource {
        path: "fx/ghost.png".into(),
        image: DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 0]))),
    }];
    let options = BuildOptions::builder().trim(true).build();
    let err = build_atlases(vec![group(sources, options)]).unwrap_err();
    match unwrap_group(err) {
        AtlasError::EdgeDetection { path } => assert_eq!(path, "fx/ghost.png"),
        other => panic!("expected EdgeDetection, got {other:?}"),
    }
}

#[test]
fn duplicate_frame_names_conflict_after_stripping() {
    let sources = vec![
        SpriteSource {
            path: "ui/icon.png".into(),
            image: opaque(8, 8),
        },
        SpriteSource {
            path: "hud/icon.jpg".into(),
            image: opaque(8, 8),
        },
    ];
    let options = BuildOptions::builder()
        .strip_extensions(true)
        .trim(false)
        .max_size(64)
        .build();
    let err = build_atlases(vec![group(sources, options)]).unwrap_err();
    match unwrap_group(err) {
        AtlasError::NamingConflict {
            name,
            first,
            second,
        } => {
            assert_eq!(name, "icon");
            assert_eq!(first, "hud/icon.jpg");
            assert_eq!(second, "ui/icon.png");
        }
        other => panic!("expected NamingConflict, got {other:?}"),
    }
}

#[test]
fn unsupported_format_string_is_rejected() {
    let err = "webp".parse::<OutputFormat>().unwrap_err();
    match err {
        AtlasError::UnsupportedFormat { format } => assert_eq!(format, "webp"),
        other => panic!("expected UnsupportedFormat, got {other:?}"),
    }
}

#[test]
fn margin_swallowing_the_whole_bin_is_invalid() {
    let sources = vec![SpriteSource {
        path: "a.png".into(),
        image: opaque(4, 4),
    }];
    let options = BuildOptions::builder().margin(64).max_size(64).build();
    let err = build_atlases(vec![group(sources, options)]).unwrap_err();
    match unwrap_group(err) {
        AtlasError::InvalidConfig(_) => {}
        other => panic!("expected InvalidConfig, got {other:?}"),
    }
}
