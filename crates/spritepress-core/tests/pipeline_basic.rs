use image::{DynamicImage, Rgba, RgbaImage};
use spritepress_core::prelude::*;

fn opaque(w: u32, h: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([200, 100, 50, 255])))
}

fn group(sources: Vec<SpriteSource>, options: BuildOptions) -> BuildGroup {
    BuildGroup {
        name: "test".into(),
        sources,
        options,
    }
}

fn overlap(a: &Rect, b: &Rect) -> bool {
    !(a.x >= b.x + b.w || b.x >= a.x + a.w || a.y >= b.y + b.h || b.y >= a.y + a.h)
}

#[test]
fn three_opaque_squares_share_one_bin() {
    let sources = vec![
        SpriteSource {
            path: "sprites/a.png".into(),
            image: opaque(10, 10),
        },
        SpriteSource {
            path: "sprites/b.png".into(),
            image: opaque(10, 10),
        },
        SpriteSource {
            path: "sprites/c.png".into(),
            image: opaque(10, 10),
        },
    ];
    let options = BuildOptions::builder()
        .margin(1)
        .max_size(64)
        .trim(false)
        .build();

    let atlases = build_atlases(vec![group(sources, options)]).expect("build");
    assert_eq!(atlases.len(), 1);

    let json = &atlases[0].json;
    assert_eq!(json.frames.len(), 3);
    for name in ["a.png", "b.png", "c.png"] {
        let f = &json.frames[name];
        assert_eq!((f.frame.w, f.frame.h), (10, 10));
        assert!(!f.trimmed);
        assert_eq!(f.source_size, Size { w: 10, h: 10 });
    }

    let frames: Vec<Rect> = json.frames.values().map(|f| f.frame).collect();
    for i in 0..frames.len() {
        for j in (i + 1)..frames.len() {
            assert!(
                !overlap(&frames[i], &frames[j]),
                "frames overlap: {:?} vs {:?}",
                frames[i],
                frames[j]
            );
        }
    }

    // frames stay inside the recorded atlas size, which respects the cap
    assert!(json.meta.size.w <= 64 && json.meta.size.h <= 64);
    for f in frames {
        assert!(f.x + f.w <= json.meta.size.w);
        assert!(f.y + f.h <= json.meta.size.h);
    }

    assert_eq!(json.meta.scale, 1);
    assert!(json.meta.image.starts_with("atlases/atlas-"));
    assert!(json.meta.image.ends_with(".png"));
}

#[test]
fn trimmed_sprite_is_packed_at_its_trimmed_size() {
    // 16x16 transparent image with an opaque 4x6 block at (5, 3)
    let mut img = RgbaImage::from_pixel(16, 16, Rgba([0, 0, 0, 0]));
    for y in 3..9 {
        for x in 5..9 {
            img.put_pixel(x, y, Rgba([255, 0, 0, 255]));
        }
    }
    let sources = vec![SpriteSource {
        path: "fx/spark.png".into(),
        image: DynamicImage::ImageRgba8(img),
    }];
    let options = BuildOptions::builder().margin(0).max_size(64).build();

    let atlases = build_atlases(vec![group(sources, options)]).expect("build");
    let f = &atlases[0].json.frames["spark.png"];
    assert!(f.trimmed);
    assert_eq!((f.frame.w, f.frame.h), (4, 6));
    assert_eq!(f.sprite_source_size, Rect::new(5, 3, 4, 6));
    assert_eq!(f.source_size, Size { w: 16, h: 16 });
}

#[test]
fn groups_concatenate_in_order() {
    let mk = |name: &str| {
        group(
            vec![SpriteSource {
                path: format!("{name}/s.png"),
                image: opaque(8, 8),
            }],
            BuildOptions::builder().trim(false).max_size(32).build(),
        )
    };
    let mut g1 = mk("one");
    g1.name = "one".into();
    let mut g2 = mk("two");
    g2.name = "two".into();

    let atlases = build_atlases(vec![g1, g2]).expect("build");
    assert_eq!(atlases.len(), 2);
}
