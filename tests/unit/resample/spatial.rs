use super::*;

fn frame(width: u32, height: u32, rgba: Vec<u8>) -> RawFrame {
    RawFrame::new(Dimensions::new(width, height).unwrap(), rgba, 0).unwrap()
}

fn solid(width: u32, height: u32, px: [u8; 4]) -> RawFrame {
    frame(width, height, px.repeat((width * height) as usize))
}

fn geometry(shape: GridShape, r: u32, src: &RawFrame) -> OutputGeometry {
    OutputGeometry::for_source(shape, r, src.dims()).unwrap()
}

#[test]
fn same_size_is_identity() {
    let src = frame(
        2,
        2,
        vec![1, 2, 3, 255, 4, 5, 6, 255, 7, 8, 9, 128, 0, 0, 0, 0],
    );
    let mut rs = SpatialResampler::new();
    let out = rs.resample(&src, &geometry(GridShape::Square, 2, &src)).unwrap();
    assert_eq!(out.rgba(), src.rgba());
}

#[test]
fn solid_color_survives_down_and_upscale() {
    let mut rs = SpatialResampler::new();
    for (w, h, r) in [(7, 5, 4), (3, 3, 8), (640, 480, 16), (1, 1, 4)] {
        let src = solid(w, h, [12, 200, 99, 255]);
        let out = rs.resample(&src, &geometry(GridShape::Square, r, &src)).unwrap();
        assert_eq!(out.dims(), Dimensions::new(r, r).unwrap());
        assert!(
            out.rgba().chunks_exact(4).all(|px| px == [12, 200, 99, 255]),
            "{w}x{h} -> {r}"
        );
    }
}

#[test]
fn downscale_averages_covered_area() {
    let src = frame(
        2,
        2,
        vec![0, 0, 0, 255, 255, 255, 255, 255, 0, 0, 0, 255, 255, 255, 255, 255],
    );
    let mut rs = SpatialResampler::new();
    let out = rs.resample(&src, &geometry(GridShape::Square, 1, &src)).unwrap();
    assert_eq!(out.rgba(), &[128, 128, 128, 255]);
}

#[test]
fn fractional_coverage_weights_partial_pixels() {
    // 3 -> 2: cell 0 covers px0 fully and half of px1.
    let src = frame(3, 1, vec![0, 0, 0, 255, 90, 90, 90, 255, 180, 180, 180, 255]);
    let mut rs = SpatialResampler::new();
    let g = geometry(GridShape::PreserveAspect, 2, &src);
    assert_eq!(g.dims(), Dimensions::new(2, 1).unwrap());
    let out = rs.resample(&src, &g).unwrap();
    // (0 * 2 + 90 * 1) / 3 = 30, (90 * 1 + 180 * 2) / 3 = 150
    assert_eq!(out.rgba(), &[30, 30, 30, 255, 150, 150, 150, 255]);
}

#[test]
fn integer_upscale_replicates_pixels() {
    let src = frame(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 255]);
    let mut rs = SpatialResampler::new();
    let g = geometry(GridShape::PreserveAspect, 4, &src);
    assert_eq!(g.dims(), Dimensions::new(4, 2).unwrap());
    let out = rs.resample(&src, &g).unwrap();
    let row: Vec<&[u8]> = out.rgba().chunks_exact(4).take(4).collect();
    assert_eq!(
        row,
        vec![
            &[255, 0, 0, 255][..],
            &[255, 0, 0, 255][..],
            &[0, 0, 255, 255][..],
            &[0, 0, 255, 255][..]
        ]
    );
}

#[test]
fn transparent_pixels_do_not_bleed_color() {
    let src = frame(2, 1, vec![255, 0, 0, 255, 0, 255, 0, 0]);
    let mut rs = SpatialResampler::new();
    let out = rs
        .resample(&src, &geometry(GridShape::PreserveAspect, 1, &src))
        .unwrap();
    assert_eq!(out.rgba(), &[255, 0, 0, 128]);
}

#[test]
fn square_shape_center_crops() {
    // Columns: A B B C -> centered 2x2 crop sees only B.
    let a = [255, 0, 0, 255];
    let b = [0, 255, 0, 255];
    let c = [0, 0, 255, 255];
    let row: Vec<u8> = [a, b, b, c].concat();
    let src = frame(4, 2, [row.clone(), row].concat());
    let g = geometry(GridShape::Square, 2, &src);
    assert_eq!(
        g.crop_for(src.dims()),
        CropRect {
            x: 1,
            y: 0,
            width: 2,
            height: 2
        }
    );
    let out = SpatialResampler::new().resample(&src, &g).unwrap();
    assert!(out.rgba().chunks_exact(4).all(|px| px == b));
}

#[test]
fn preserve_aspect_rounds_height() {
    let canvas = Dimensions::new(100, 50).unwrap();
    let g = OutputGeometry::for_source(GridShape::PreserveAspect, 10, canvas).unwrap();
    assert_eq!(g.dims(), Dimensions::new(10, 5).unwrap());

    let canvas = Dimensions::new(3, 1000).unwrap();
    let g = OutputGeometry::for_source(GridShape::PreserveAspect, 1, canvas).unwrap();
    assert_eq!(g.dims(), Dimensions::new(1, 333).unwrap());

    let canvas = Dimensions::new(1000, 1).unwrap();
    let g = OutputGeometry::for_source(GridShape::PreserveAspect, 4, canvas).unwrap();
    assert_eq!(g.dims(), Dimensions::new(4, 1).unwrap());
}

#[test]
fn zero_resolution_is_invalid() {
    let canvas = Dimensions::new(4, 4).unwrap();
    for shape in [GridShape::Square, GridShape::PreserveAspect] {
        let err = OutputGeometry::for_source(shape, 0, canvas).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidResolution);
    }
}

#[test]
fn resampling_is_deterministic_and_scratch_is_reused() {
    let rgba: Vec<u8> = (0..(9 * 7 * 4)).map(|i| (i * 37 % 251) as u8).collect();
    let src = frame(9, 7, rgba);
    let g = geometry(GridShape::PreserveAspect, 5, &src);
    let mut rs = SpatialResampler::new();
    let a = rs.resample(&src, &g).unwrap();
    let retained = rs.retained_bytes();
    let b = rs.resample(&src, &g).unwrap();
    assert_eq!(a, b);
    assert_eq!(rs.retained_bytes(), retained);

    rs.release();
    assert_eq!(rs.retained_bytes(), 0);
    assert_eq!(rs.resample(&src, &g).unwrap(), a);
}

#[test]
fn scratch_is_bounded_by_output_width() {
    let src = solid(400, 400, [10, 20, 30, 255]);
    let g = geometry(GridShape::Square, 400, &src);
    let mut rs = SpatialResampler::new();
    let out = rs.resample(&src, &g).unwrap();
    assert_eq!(out.rgba(), src.rgba());
    // Two rows of u64 sums plus per-axis weights, well under one output frame.
    assert!(rs.retained_bytes() < out.rgba().len() / 4, "{}", rs.retained_bytes());

    let tall = solid(3, 900, [200, 0, 0, 255]);
    let g = geometry(GridShape::PreserveAspect, 3, &tall);
    let mut rs = SpatialResampler::new();
    rs.resample(&tall, &g).unwrap();
    assert!(rs.retained_bytes() < 48 * 1024, "{}", rs.retained_bytes());
}
