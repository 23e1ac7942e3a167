use super::*;
use crate::decode::frames::RawFrame;
use crate::foundation::core::Dimensions;

fn seq(delays: &[u32], timed: bool) -> FrameSequence {
    let frames = delays
        .iter()
        .enumerate()
        .map(|(i, &d)| {
            RawFrame::new(
                Dimensions::new(1, 1).unwrap(),
                vec![i as u8, 0, 0, 255],
                d,
            )
            .unwrap()
        })
        .collect();
    FrameSequence::new(frames, timed).unwrap()
}

fn sources(plan: &TemporalPlan) -> Vec<usize> {
    plan.picks().iter().map(|p| p.source).collect()
}

#[test]
fn same_count_is_identity() {
    let plan = resample_temporal(&seq(&[100, 100, 100], true), 3, 50).unwrap();
    assert_eq!(sources(&plan), vec![0, 1, 2]);
    assert_eq!(plan.total_delay_ms(), 300);
}

#[test]
fn more_frames_duplicate() {
    let plan = resample_temporal(&seq(&[100, 100], true), 5, 50).unwrap();
    // t = 0, 40, 80, 120, 160
    assert_eq!(sources(&plan), vec![0, 0, 0, 1, 1]);
    assert_eq!(plan.len(), 5);
    assert_eq!(plan.distinct_sources(), vec![0, 1]);
}

#[test]
fn fewer_frames_drop() {
    let plan = resample_temporal(&seq(&[10; 10], true), 3, 50).unwrap();
    // T = 100; t = 0, 33.3, 66.6
    assert_eq!(sources(&plan), vec![0, 3, 6]);
}

#[test]
fn single_frame_takes_first_and_whole_duration() {
    let plan = resample_temporal(&seq(&[70, 30, 250], true), 1, 50).unwrap();
    assert_eq!(sources(&plan), vec![0]);
    assert_eq!(plan.picks()[0].delay_ms, 350);
}

#[test]
fn uneven_durations_select_by_interval() {
    // Intervals: [0,10) [10,100) [100,110)
    let plan = resample_temporal(&seq(&[10, 90, 10], true), 11, 50).unwrap();
    assert_eq!(sources(&plan), vec![0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2]);
}

#[test]
fn delays_split_total_exactly() {
    let plan = resample_temporal(&seq(&[100], true), 3, 50).unwrap();
    let delays: Vec<u32> = plan.picks().iter().map(|p| p.delay_ms).collect();
    assert_eq!(delays, vec![33, 33, 34]);
    assert_eq!(plan.total_delay_ms(), 100);

    let plan = resample_temporal(&seq(&[37, 41, 5], true), 7, 50).unwrap();
    assert_eq!(plan.total_delay_ms(), 83);
}

#[test]
fn zero_length_frames_are_never_selected() {
    let plan = resample_temporal(&seq(&[0, 50, 0, 50], true), 4, 50).unwrap();
    assert_eq!(sources(&plan), vec![1, 1, 3, 3]);
}

#[test]
fn untimed_still_gets_fixed_delay_per_output_frame() {
    let plan = resample_temporal(&seq(&[0], false), 4, 50).unwrap();
    assert_eq!(sources(&plan), vec![0, 0, 0, 0]);
    assert!(plan.picks().iter().all(|p| p.delay_ms == 50));
    assert_eq!(plan.total_delay_ms(), 200);
}

#[test]
fn untimed_animation_keeps_its_playback_time() {
    let plan = resample_temporal(&seq(&[0, 0, 0, 0], false), 2, 80).unwrap();
    assert_eq!(sources(&plan), vec![0, 2]);
    assert!(plan.picks().iter().all(|p| p.delay_ms == 160));

    let untimed = seq(&[0; 10], false);
    for n in [1, 3, 20] {
        let plan = resample_temporal(&untimed, n, 50).unwrap();
        assert_eq!(plan.total_delay_ms(), 500, "n = {n}");
    }
    let plan = resample_temporal(&untimed, 3, 50).unwrap();
    let delays: Vec<u32> = plan.picks().iter().map(|p| p.delay_ms).collect();
    assert_eq!(delays, vec![166, 167, 167]);
}

#[test]
fn long_delays_at_high_frame_counts_do_not_overflow() {
    let long = seq(&[u32::MAX; 4096], true);
    let n = 1u32 << 21;
    let plan = resample_temporal(&long, n, 50).unwrap();
    assert_eq!(plan.len(), n as usize);
    assert_eq!(plan.total_delay_ms(), 4096 * u64::from(u32::MAX));
    // 512 output frames per source frame.
    assert_eq!(plan.picks()[0].source, 0);
    assert_eq!(plan.picks()[511].source, 0);
    assert_eq!(plan.picks()[512].source, 1);
    assert_eq!(plan.picks()[n as usize - 1].source, 4095);
}

#[test]
fn zero_frames_is_rejected() {
    let err = resample_temporal(&seq(&[10], true), 0, 50).unwrap_err();
    assert_eq!(err.kind(), crate::ErrorKind::InvalidArgument);
}
