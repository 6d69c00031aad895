use xfade::Error;
use xfade::scene::{
    BlendAnimator, INITIAL_COEFFICIENT, Selection, SlotId, TransitionState, blend_factors,
};

const STOOL: usize = 0;
const TABLE: usize = 1;
const BENCH: usize = 2;

/// Small deterministic generator for selection sequences.
struct Lcg(u64);

impl Lcg {
    fn next_index(&mut self, len: usize) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 33) % len as u64) as usize
    }
}

#[test]
fn showcase_walkthrough() {
    let mut state = TransitionState::new(TABLE, 3).unwrap();
    assert_eq!(state.assignment(), [TABLE, BENCH]);
    assert_eq!(state.shown(), SlotId::First);

    // stool is not resident, so the hidden second slot takes it
    let selection = state.select_model(STOOL).unwrap();
    assert_eq!(
        selection,
        Selection::HotSwapped {
            shown: SlotId::Second,
            replaced: BENCH
        }
    );
    assert_eq!(state.assignment(), [TABLE, STOOL]);
    assert_eq!(state.hidden(), SlotId::First);

    // bench is gone too, so the now-hidden first slot takes it
    let selection = state.select_model(BENCH).unwrap();
    assert_eq!(
        selection,
        Selection::HotSwapped {
            shown: SlotId::First,
            replaced: TABLE
        }
    );
    assert_eq!(state.assignment(), [BENCH, STOOL]);
    assert_eq!(state.shown_model(), BENCH);

    // stool is still resident in the hidden slot: flip without reassignment
    let selection = state.select_model(STOOL).unwrap();
    assert_eq!(selection, Selection::Switched { shown: SlotId::Second });
    assert_eq!(state.assignment(), [BENCH, STOOL]);
}

#[test]
fn selection_sequences_hold_slot_invariants() {
    for seed in 1..=8 {
        let len = 2 + seed as usize % 4;
        let mut rng = Lcg(seed);
        let mut state = TransitionState::new(0, len).unwrap();

        for _ in 0..200 {
            let requested = rng.next_index(len);
            let before = state.clone();

            let selection = state.select_model(requested).unwrap();

            assert_eq!(state.hidden(), state.shown().other());
            assert_eq!(state.shown_model(), requested);
            assert_ne!(state.model_in(SlotId::First), state.model_in(SlotId::Second));

            match selection {
                Selection::Unchanged => assert_eq!(state, before),
                Selection::Switched { shown } => {
                    assert_eq!(state.assignment(), before.assignment());
                    assert_eq!(shown, before.hidden());
                }
                Selection::HotSwapped { shown, replaced } => {
                    assert!(!before.assignment().contains(&requested));
                    assert_eq!(shown, before.hidden());
                    assert_eq!(replaced, before.model_in(before.hidden()));
                    // the shown slot is never overwritten
                    assert_eq!(
                        state.model_in(before.shown()),
                        before.model_in(before.shown())
                    );
                }
            }

            let settled = state.clone();
            assert_eq!(state.select_model(requested).unwrap(), Selection::Unchanged);
            assert_eq!(state, settled);
        }
    }
}

#[test]
fn out_of_range_selection_is_rejected() {
    let mut state = TransitionState::new(0, 3).unwrap();
    state.select_model(2).unwrap();
    let before = state.clone();

    assert!(matches!(
        state.select_model(7),
        Err(Error::InvalidModelIndex { index: 7, len: 3 })
    ));
    assert_eq!(state, before);
}

#[test]
fn animator_converges_geometrically() {
    let mut animator = BlendAnimator::new(0.2).with_value(0.0);
    animator.retarget(SlotId::Second);

    for n in 1..=30 {
        let value = animator.step();
        let expected = 1.0 - 0.8f32.powi(n);
        assert!(
            (value - expected).abs() < 1e-5,
            "frame {n}: {value} vs {expected}"
        );
    }
}

#[test]
fn retarget_mid_flight_reverses_smoothly() {
    let mut animator = BlendAnimator::new(0.2).with_value(0.0);
    animator.retarget(SlotId::Second);
    for _ in 0..3 {
        animator.step();
    }
    let midway = animator.value();

    animator.retarget(SlotId::First);
    let next = animator.step();

    assert!(next < midway);
    assert!((next - midway * 0.8).abs() < 1e-6);
}

#[test]
fn first_frames_fade_in_from_transparent() {
    let mut animator = BlendAnimator::default();
    assert_eq!(animator.value(), INITIAL_COEFFICIENT);

    let mut last_opacity = blend_factors(animator.value()).opacity;
    assert_eq!(last_opacity, 0.0);
    for _ in 0..40 {
        let factors = blend_factors(animator.step());
        assert!(factors.opacity >= last_opacity);
        assert_eq!(factors.mix, 0.0);
        last_opacity = factors.opacity;
    }
    assert!(last_opacity > 0.999);
}

#[test]
fn blend_formula_table() {
    let cases = [
        (-1.0, 0.0, 0.0),
        (-0.5, 0.5, 0.0),
        (0.0, 1.0, 0.0),
        (0.5, 1.0, 0.5),
        (1.0, 1.0, 1.0),
    ];
    for (shown_txt, opacity, mix) in cases {
        let factors = blend_factors(shown_txt);
        assert_eq!(factors.opacity, opacity, "opacity at {shown_txt}");
        assert_eq!(factors.mix, mix, "mix at {shown_txt}");
    }
}
