use super::*;

#[test]
fn last_valid_frame_is_strictly_below_out_point() {
    let last = last_valid_frame(0.0, 100.0);
    assert!(last < 100.0);
    assert_eq!(last, 100.0f32.next_down());
}

#[test]
fn last_valid_frame_never_precedes_in_point() {
    assert_eq!(last_valid_frame(5.0, 5.0), 5.0);
}

#[test]
fn lerp_and_tolerances() {
    assert_eq!(lerp(2.0, 4.0, 0.5), 3.0);
    assert!(nearly_equal(1.0, 1.0 + NEARLY_ZERO / 2.0));
    assert!(!nearly_equal(1.0, 1.01));
}
