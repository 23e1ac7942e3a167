use super::*;

fn rgb(r: u8, g: u8, b: u8) -> Rgb8 {
    Rgb8::new(r, g, b)
}

#[test]
fn splits_at_weighted_median_of_widest_channel() {
    let mut entries = vec![
        (rgb(210, 0, 0), 1),
        (rgb(0, 0, 0), 1),
        (rgb(200, 0, 0), 1),
        (rgb(10, 0, 0), 1),
    ];
    assert_eq!(
        median_cut(&mut entries, 2),
        vec![rgb(5, 0, 0), rgb(205, 0, 0)]
    );
}

#[test]
fn budget_of_one_is_the_weighted_mean() {
    let mut entries = vec![(rgb(0, 0, 0), 3), (rgb(100, 40, 8), 1)];
    assert_eq!(median_cut(&mut entries, 1), vec![rgb(25, 10, 2)]);
}

#[test]
fn heavy_color_gets_its_own_box() {
    let mut entries = vec![(rgb(0, 0, 0), 9), (rgb(255, 255, 255), 1)];
    assert_eq!(
        median_cut(&mut entries, 2),
        vec![rgb(0, 0, 0), rgb(255, 255, 255)]
    );
}

#[test]
fn stops_when_no_box_can_split() {
    let mut entries = vec![(rgb(1, 2, 3), 5), (rgb(3, 2, 1), 5), (rgb(9, 9, 9), 1)];
    let palette = median_cut(&mut entries, 16);
    assert_eq!(palette, vec![rgb(1, 2, 3), rgb(3, 2, 1), rgb(9, 9, 9)]);
}

#[test]
fn never_exceeds_budget_and_is_sorted() {
    let mut entries: Vec<(Rgb8, u64)> = (0..1000u32)
        .map(|i| {
            let c = rgb((i * 7) as u8, (i * 13) as u8, (i * 31) as u8);
            (c, u64::from(i % 5 + 1))
        })
        .collect();
    entries.sort_unstable_by_key(|(c, _)| *c);
    entries.dedup_by_key(|(c, _)| *c);

    let palette = median_cut(&mut entries, 37);
    assert!(!palette.is_empty() && palette.len() <= 37);
    assert!(palette.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn empty_histogram_yields_empty_palette() {
    assert!(median_cut(&mut [], 8).is_empty());
}
