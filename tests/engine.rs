mod common;

use common::{bright_square_rgb, color_ramp, gray_checker};
use filterlab::engine::transform;
use filterlab::ops::contours::CONTOUR_COLOR;
use filterlab::{OperationKind, ParameterSet, Raster, apply};

fn sources() -> Vec<Raster> {
    vec![
        color_ramp(37, 23),
        bright_square_rgb(40, 30, 10, 8, 25, 20),
        gray_checker(33, 17, 4),
        Raster::filled_gray(1, 1, 9).unwrap(),
        Raster::filled_color(2, 3, [1, 2, 3]).unwrap(),
    ]
}

#[test]
fn every_operation_keeps_dimensions() {
    let params = ParameterSet::new(30, 90, 6);
    for src in sources() {
        for op in OperationKind::ALL {
            let out = apply(&src, op, params);
            assert_eq!(out.image.dimensions(), src.dimensions(), "op={op}");
            assert!(out.image.width() > 0 && out.image.height() > 0);
        }
    }
}

#[test]
fn identity_is_pixel_equal() {
    for src in sources() {
        let out = apply(&src, OperationKind::Identity, ParameterSet::default());
        assert_eq!(out.image, src);
    }
}

#[test]
fn output_channel_counts() {
    let params = ParameterSet::default();
    for src in sources() {
        for op in [
            OperationKind::Grayscale,
            OperationKind::EdgeDetect,
            OperationKind::Erode,
            OperationKind::Dilate,
        ] {
            assert_eq!(apply(&src, op, params).image.channels(), 1, "op={op}");
        }
        assert_eq!(apply(&src, OperationKind::Contours, params).image.channels(), 3);
        assert_eq!(
            apply(&src, OperationKind::Blur, params).image.channels(),
            src.channels()
        );
    }
}

#[test]
fn histogram_total_matches_pixel_count() {
    let params = ParameterSet::new(20, 60, 3);
    for src in sources() {
        for op in OperationKind::ALL {
            let out = apply(&src, op, params);
            assert_eq!(out.histogram.total(), out.image.pixel_count(), "op={op}");
        }
    }
}

#[test]
fn grayscale_is_idempotent() {
    let p = ParameterSet::default();
    let once = apply(&color_ramp(20, 20), OperationKind::Grayscale, p).image;
    let twice = apply(&once, OperationKind::Grayscale, p).image;
    assert_eq!(once, twice);
}

#[test]
fn even_kernel_matches_next_odd_kernel() {
    let src = color_ramp(25, 19);
    for (even, odd) in [(2u8, 3u8), (4, 5), (6, 7)] {
        for op in [OperationKind::Blur, OperationKind::Erode, OperationKind::Dilate] {
            let a = transform(&src, op, ParameterSet::new(0, 0, even));
            let b = transform(&src, op, ParameterSet::new(0, 0, odd));
            assert_eq!(a, b, "op={op} k={even}");
        }
    }
}

#[test]
fn unit_kernel_is_noop_for_morphology() {
    let src = gray_checker(16, 16, 3);
    let p = ParameterSet::new(0, 0, 1);
    assert_eq!(transform(&src, OperationKind::Erode, p), src);
    assert_eq!(transform(&src, OperationKind::Dilate, p), src);
    assert_eq!(transform(&src, OperationKind::Blur, p), src);
}

#[test]
fn flat_gray_image_has_no_edges() {
    let src = Raster::filled_color(100, 100, [128, 128, 128]).unwrap();
    let out = apply(&src, OperationKind::EdgeDetect, ParameterSet::new(50, 150, 5));
    assert_eq!(out.image.channels(), 1);
    assert_eq!(out.image.dimensions(), (100, 100));
    assert!(out.image.as_raw().iter().all(|&v| v == 0));
    assert_eq!(out.histogram.count(0), 10_000);
    assert!((1..=255u8).all(|i| out.histogram.count(i) == 0));
}

#[test]
fn edges_of_square_are_found() {
    let src = bright_square_rgb(60, 60, 15, 15, 44, 44);
    let out = apply(&src, OperationKind::EdgeDetect, ParameterSet::new(50, 150, 5));
    let edge_pixels = out.histogram.count(255);
    assert!(edge_pixels > 60, "edge pixels = {edge_pixels}");
    assert_eq!(edge_pixels + out.histogram.count(0), 3600);
}

#[test]
fn contours_outline_square_in_green_over_original() {
    let src = bright_square_rgb(60, 60, 15, 15, 44, 44);
    let out = apply(&src, OperationKind::Contours, ParameterSet::new(50, 150, 5));
    let Raster::Color(img) = &out.image else {
        panic!("contours must produce color output");
    };
    let green = img.pixels().filter(|p| **p == CONTOUR_COLOR).count();
    assert!(green > 100, "green pixels = {green}");
    // Far corners and the square's centre keep the original colors.
    assert_eq!(img.get_pixel(0, 0).0, [20, 25, 30]);
    assert_eq!(img.get_pixel(30, 30).0, [230, 220, 210]);
}

#[test]
fn contours_on_gray_source_expand_to_color() {
    let src = gray_checker(40, 40, 10);
    let out = apply(&src, OperationKind::Contours, ParameterSet::new(20, 60, 5));
    assert_eq!(out.image.channels(), 3);
}

#[test]
fn erosion_never_brightens_and_dilation_never_darkens() {
    let src = color_ramp(30, 30);
    let gray = transform(&src, OperationKind::Grayscale, ParameterSet::default());
    let p = ParameterSet::new(0, 0, 5);
    let eroded = transform(&src, OperationKind::Erode, p);
    let dilated = transform(&src, OperationKind::Dilate, p);
    for ((g, e), d) in gray.as_raw().iter().zip(eroded.as_raw()).zip(dilated.as_raw()) {
        assert!(e <= g);
        assert!(d >= g);
    }
}

#[test]
fn source_is_left_untouched() {
    let src = bright_square_rgb(30, 30, 5, 5, 20, 20);
    let copy = src.clone();
    for op in OperationKind::ALL {
        let _ = apply(&src, op, ParameterSet::new(10, 30, 7));
    }
    assert_eq!(src, copy);
}

#[test]
fn unknown_operation_name_degrades_to_identity() {
    let src = color_ramp(8, 8);
    let op = OperationKind::from_name("posterize");
    assert_eq!(apply(&src, op, ParameterSet::default()).image, src);
}
