use super::*;

#[test]
fn mul_div_helpers_floor_and_round() {
    assert_eq!(mul_div_floor(7, 3, 2), 10);
    assert_eq!(mul_div_round(7, 3, 2), 11);
    assert_eq!(mul_div_round(1, 1, 3), 0);
    assert_eq!(mul_div_floor(u64::MAX, 2, 4), u64::MAX / 2);
}

#[test]
fn div_round_rounds_halves_up() {
    assert_eq!(div_round(5, 2), 3);
    assert_eq!(div_round(4, 3), 1);
    assert_eq!(div_round(5, 3), 2);
    assert_eq!(div_round(255, 2), 128);
    assert_eq!(div_round(0, 7), 0);
    assert_eq!(div_round(u64::MAX, 1), u64::MAX);
    assert_eq!(div_round(u64::MAX, u64::MAX), 1);
}
