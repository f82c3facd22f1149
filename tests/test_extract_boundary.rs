mod common;

use common::*;
use geo::{Contains, Coord};
use ndarray::Array2;

#[test]
fn square_outline_without_scaling() -> anyhow::Result<()> {
    let extractor = MaskToPolygon::new(None);
    let points = extractor.extract_boundary(&square_mask(), false)?;

    // closed ring
    assert_eq!(points.first(), points.last());
    let vertices = points.len() - 1;
    assert!((4..=8).contains(&vertices), "got {} vertices", vertices);
    assert_bbox_near(bbox(&points), (30.0, 30.0, 70.0, 70.0), 10.0);
    Ok(())
}

#[test]
fn square_outline_scaled_to_double_size() -> anyhow::Result<()> {
    let extractor = MaskToPolygon::new(Some(TargetSize::new(200.0, 200.0)));
    let points = extractor.extract_boundary(&square_mask(), true)?;

    assert_eq!(points.first(), points.last());
    assert_bbox_near(bbox(&points), (60.0, 60.0, 140.0, 140.0), 20.0);
    Ok(())
}

#[test]
fn square_corners_are_pixel_exact() -> anyhow::Result<()> {
    let extraction = MaskToPolygon::new(None).extract(&square_mask(), false)?;
    let mut vertices = extraction.boundary.vertices();
    vertices.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(
        vertices,
        vec![(30.0, 30.0), (30.0, 70.0), (70.0, 30.0), (70.0, 70.0)]
    );
    assert_eq!(extraction.boundary.area(), 1600.0);
    assert_eq!(square_mask().foreground_count(), 1600);
    Ok(())
}

#[test]
fn float_array_input_matches_raster_input() -> anyhow::Result<()> {
    let from_array = Mask::from_array(square_array_f64().view())?;
    let extractor = MaskToPolygon::new(None);
    assert_eq!(
        extractor.extract_boundary(&from_array, false)?,
        extractor.extract_boundary(&square_mask(), false)?
    );
    Ok(())
}

#[test]
fn empty_mask_is_reported() {
    let zeros = Mask::from_array(Array2::<u8>::zeros((64, 64)).view()).unwrap();
    let err = MaskToPolygon::new(None)
        .extract_boundary(&zeros, false)
        .unwrap_err();
    assert_eq!(err, ExtractError::EmptyMask);
}

#[test]
fn scaling_without_target_is_a_configuration_error() {
    let err = MaskToPolygon::new(None)
        .extract_boundary(&square_mask(), true)
        .unwrap_err();
    assert!(matches!(err, ExtractError::InvalidConfiguration(_)));
}

#[test]
fn zero_sized_input_is_rejected() {
    let err = Mask::from_array(Array2::<f32>::zeros((0, 10)).view()).unwrap_err();
    assert!(matches!(err, ExtractError::InvalidInput(_)));
}

#[test]
fn negative_values_are_rejected() {
    let mut values = Array2::<i32>::zeros((20, 20));
    values[[3, 4]] = -2;
    let err = Mask::from_array(values.view()).unwrap_err();
    assert!(matches!(err, ExtractError::InvalidInput(_)));
}

#[test]
fn scaled_points_are_unscaled_points_times_factors() -> anyhow::Result<()> {
    // 50 rows x 80 cols; factors are (150 / 50, 40 / 80) = (3, 0.5)
    let mask = rect_mask(80, 50, 10, 10, 60, 40);
    let extractor = MaskToPolygon::new(Some(TargetSize::new(150.0, 40.0)));
    assert_eq!(extractor.scale_factors(&mask)?, (3.0, 0.5));

    let raw = extractor.extract_boundary(&mask, false)?;
    let scaled = extractor.extract_boundary(&mask, true)?;
    assert_eq!(raw.len(), scaled.len());
    for (&(x, y), &(sx, sy)) in raw.iter().zip(&scaled) {
        assert!((x * 3.0 - sx).abs() < 1e-9);
        assert!((y * 0.5 - sy).abs() < 1e-9);
    }
    Ok(())
}

#[test]
fn target_equal_to_mask_shape_is_identity() -> anyhow::Result<()> {
    // target (rows, cols) gives unit factors even for a non-square mask
    let mask = rect_mask(90, 60, 15, 12, 70, 50);
    let extractor = MaskToPolygon::new(Some(TargetSize::new(60.0, 90.0)));
    assert_eq!(
        extractor.extract_boundary(&mask, true)?,
        extractor.extract_boundary(&mask, false)?
    );
    Ok(())
}

#[test]
fn repeated_runs_are_identical() -> anyhow::Result<()> {
    let mask = disk_mask(120, 58.3, 61.7, 33.0);
    let extractor = MaskToPolygon::new(Some(TargetSize::new(640.0, 480.0)));
    let first = extractor.extract_boundary(&mask, true)?;
    for _ in 0..3 {
        assert_eq!(extractor.extract_boundary(&mask, true)?, first);
    }
    Ok(())
}

#[test]
fn largest_region_wins() -> anyhow::Result<()> {
    let mask = mask_from_fn(120, 120, |x, y| {
        let small = (5..25).contains(&x) && (5..25).contains(&y);
        let large = (50..110).contains(&x) && (40..100).contains(&y);
        u8::from(small || large)
    });
    let points = MaskToPolygon::new(None).extract_boundary(&mask, false)?;
    assert_eq!(bbox(&points), (50.0, 40.0, 110.0, 100.0));
    Ok(())
}

#[test]
fn small_holes_are_filled() -> anyhow::Result<()> {
    let mask = mask_from_fn(100, 100, |x, y| {
        let square = (30..70).contains(&x) && (30..70).contains(&y);
        let hole = (48..52).contains(&x) && (48..52).contains(&y);
        u8::from(square && !hole)
    });
    let extraction = MaskToPolygon::new(None)
        .with_diagnostics(true)
        .extract(&mask, false)?;

    let diagnostics = extraction.diagnostics.expect("diagnostics requested");
    assert_ne!(diagnostics.processed.get_pixel(50, 50)[0], 0);
    assert_eq!(diagnostics.candidates, 1);
    assert_eq!(extraction.boundary.vertex_count(), 4);
    Ok(())
}

#[test]
fn speckle_only_mask_is_empty_after_cleanup() {
    let mask = mask_from_fn(100, 100, |x, y| {
        // 3x3 dots on a 20 pixel grid, far smaller than the kernel
        u8::from(x % 20 < 3 && y % 20 < 3)
    });
    assert!(mask.foreground_count() > 0);
    let err = MaskToPolygon::new(None)
        .extract_boundary(&mask, false)
        .unwrap_err();
    assert_eq!(err, ExtractError::EmptyMask);
}

#[test]
fn speckles_next_to_a_region_are_ignored() -> anyhow::Result<()> {
    let mask = mask_from_fn(100, 100, |x, y| {
        let square = (30..70).contains(&x) && (30..70).contains(&y);
        let speck = (5..8).contains(&x) && (5..8).contains(&y);
        u8::from(square || speck)
    });
    let points = MaskToPolygon::new(None).extract_boundary(&mask, false)?;
    assert_eq!(bbox(&points), (30.0, 30.0, 70.0, 70.0));
    Ok(())
}

#[test]
fn full_mask_traces_the_image_border() -> anyhow::Result<()> {
    let mask = mask_from_fn(50, 40, |_, _| 1);
    let boundary = MaskToPolygon::new(None).extract(&mask, false)?.boundary;
    assert_eq!(boundary.vertex_count(), 4);
    assert_eq!(bbox(&boundary.points()), (0.0, 0.0, 50.0, 40.0));
    assert_eq!(boundary.area(), 2000.0);
    Ok(())
}

#[test]
fn every_nonzero_class_counts_as_foreground() -> anyhow::Result<()> {
    let mask = mask_from_fn(80, 80, |x, y| {
        if !((20..60).contains(&x) && (20..60).contains(&y)) {
            0
        } else if x < 40 {
            1
        } else {
            2
        }
    });
    let boundary = MaskToPolygon::new(None).extract(&mask, false)?.boundary;
    assert!((4..=8).contains(&boundary.vertex_count()));
    assert_eq!(bbox(&boundary.points()), (20.0, 20.0, 60.0, 60.0));
    Ok(())
}

#[test]
fn disk_polygon_covers_region_and_sits_on_its_boundary() -> anyhow::Result<()> {
    let mask = disk_mask(100, 50.0, 50.0, 25.0);
    let extraction = MaskToPolygon::new(None)
        .with_diagnostics(true)
        .extract(&mask, false)?;
    let diagnostics = extraction.diagnostics.expect("diagnostics requested");
    let processed = &diagnostics.processed;
    let polygon = extraction.boundary.polygon();

    // every vertex is a pixel corner between the region and its outside
    let filled = |x: i64, y: i64| {
        x >= 0
            && y >= 0
            && (x as u32) < processed.width()
            && (y as u32) < processed.height()
            && processed.get_pixel(x as u32, y as u32)[0] != 0
    };
    for (x, y) in extraction.boundary.vertices() {
        assert_eq!((x.fract(), y.fract()), (0.0, 0.0));
        let (x, y) = (x as i64, y as i64);
        let around = [filled(x - 1, y - 1), filled(x, y - 1), filled(x - 1, y), filled(x, y)];
        assert!(around.contains(&true), "({}, {}) touches no foreground", x, y);
        assert!(around.contains(&false), "({}, {}) is inside the region", x, y);
    }

    let ratio = extraction.boundary.area() / mask.foreground_count() as f64;
    assert!(ratio >= 0.95, "polygon covers only {:.3} of the region", ratio);

    assert!(!polygon.contains(&Coord { x: 5.0, y: 5.0 }));
    assert!(polygon.contains(&Coord { x: 50.0, y: 50.0 }));
    Ok(())
}

#[test]
fn polygon_area_tracks_foreground_area() -> anyhow::Result<()> {
    let ellipse = |x: u32, y: u32| {
        let (dx, dy) = ((x as f64 - 50.0) / 35.0, (y as f64 - 50.0) / 20.0);
        u8::from(dx * dx + dy * dy <= 1.0)
    };
    let triangle = |x: u32, y: u32| {
        let (x, y) = (x as f64, y as f64);
        u8::from((20.0..80.0).contains(&y) && (x - 50.0).abs() <= (y - 20.0) * 0.6)
    };
    let cases = vec![
        ("square 40", rect_mask(100, 100, 30, 30, 70, 70)),
        ("square 20", rect_mask(100, 100, 40, 40, 60, 60)),
        ("square 12", rect_mask(100, 100, 44, 44, 56, 56)),
        ("rect 60x25", rect_mask(100, 100, 20, 40, 80, 65)),
        ("disk r14", disk_mask(100, 50.0, 50.0, 14.0)),
        ("disk r20", disk_mask(100, 50.0, 50.0, 20.0)),
        ("disk r25", disk_mask(100, 50.0, 50.0, 25.0)),
        ("disk r25 off-grid", disk_mask(100, 50.3, 49.6, 25.0)),
        ("disk r30", disk_mask(100, 50.0, 50.0, 30.0)),
        ("disk r40", disk_mask(100, 50.0, 50.0, 40.0)),
        ("ellipse 35x20", mask_from_fn(100, 100, ellipse)),
        ("triangle", mask_from_fn(100, 100, triangle)),
    ];

    let extractor = MaskToPolygon::new(None);
    for (name, mask) in cases {
        let boundary = extractor.extract(&mask, false)?.boundary;
        let ratio = boundary.area() / mask.foreground_count() as f64;
        assert!(
            (0.95..=1.05).contains(&ratio),
            "{}: polygon area {} vs {} foreground pixels",
            name,
            boundary.area(),
            mask.foreground_count()
        );
    }
    Ok(())
}

#[test]
fn custom_tolerance_keeps_more_detail() -> anyhow::Result<()> {
    let mask = disk_mask(100, 50.0, 50.0, 30.0);
    let coarse = MaskToPolygon::new(None).extract(&mask, false)?.boundary;
    let fine = MaskToPolygon::new(None)
        .with_config(ExtractorConfig {
            tolerance: 0.0,
            ..Default::default()
        })
        .extract(&mask, false)?
        .boundary;
    assert!(fine.vertex_count() >= coarse.vertex_count());
    Ok(())
}

#[test]
fn boundary_is_usable_from_many_threads() -> anyhow::Result<()> {
    let extractor = MaskToPolygon::new(Some(TargetSize::new(200.0, 200.0)));
    let mask = square_mask();
    let expected = extractor.extract_boundary(&mask, true)?;

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| extractor.extract_boundary(&mask, true)))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), expected);
        }
    });
    Ok(())
}
