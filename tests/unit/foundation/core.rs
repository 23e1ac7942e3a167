use super::*;

#[test]
fn dimensions_reject_zero_axes() {
    assert!(Dimensions::new(0, 4).is_err());
    assert!(Dimensions::new(4, 0).is_err());
    let d = Dimensions::new(3, 5).unwrap();
    assert_eq!(d.pixel_count(), Some(15));
    assert_eq!(d.rgba_len(), Some(60));
    assert_eq!(d.to_string(), "3x5");
}

#[test]
fn rgb_pack_order_matches_ord() {
    let a = Rgb8::new(1, 255, 255);
    let b = Rgb8::new(2, 0, 0);
    assert!(a < b);
    assert!(a.pack() < b.pack());
    assert_eq!(Rgb8::unpack(a.pack()), a);
}

#[test]
fn dist2_is_symmetric_squared_euclidean() {
    let a = Rgb8::new(10, 20, 30);
    let b = Rgb8::new(13, 16, 30);
    assert_eq!(a.dist2(b), 9 + 16);
    assert_eq!(b.dist2(a), a.dist2(b));
    assert_eq!(Rgb8::new(0, 0, 0).dist2(Rgb8::new(255, 255, 255)), 3 * 255 * 255);
}
