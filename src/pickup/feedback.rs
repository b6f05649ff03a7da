// Pickup feedback: jittered, delayed sound pulses per collected stack

use rand::Rng;
use ulid::Ulid;

use crate::config::feedback::{
    BASE_PITCH, DELAY_SPREAD, MAX_PULSES_PER_STACK, MIN_DELAY_TICKS, PITCH_JITTER,
};

use super::item::ItemStack;

/// Randomness used for pitch and delay jitter
/// Blanket-implemented for every `rand::Rng`; tests substitute fixed sequences
pub trait JitterSource {
    /// Uniform value in [0, 1)
    fn unit(&mut self) -> f32;

    /// Uniform integer in [0, bound); bound must be > 0
    fn below(&mut self, bound: u32) -> u32;
}

impl<R: Rng + ?Sized> JitterSource for R {
    fn unit(&mut self) -> f32 {
        self.random::<f32>()
    }

    fn below(&mut self, bound: u32) -> u32 {
        self.random_range(0..bound)
    }
}

/// One deferred pickup cue
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedbackPulse {
    pub delay_ticks: u32,
    pub pitch: f32,
    pub recipient: Ulid,
}

/// Plays pulses once they come due
/// Implementations own their liveness check (a pulse for a departed recipient is a no-op)
pub trait FeedbackSink: Send + Sync {
    fn play_feedback(&self, pulse: &FeedbackPulse);
}

/// Pulses for one stack: one per item, capped
pub fn pulse_count(stack: &ItemStack) -> u32 {
    stack.quantity.min(MAX_PULSES_PER_STACK)
}

/// Pitch in [BASE_PITCH - PITCH_JITTER, BASE_PITCH + PITCH_JITTER]
pub fn draw_pitch<J: JitterSource + ?Sized>(rng: &mut J) -> f32 {
    let pitch = rng.unit() * (PITCH_JITTER * 2.0) - PITCH_JITTER + BASE_PITCH;
    pitch.clamp(BASE_PITCH - PITCH_JITTER, BASE_PITCH + PITCH_JITTER)
}

/// Delay in MIN_DELAY_TICKS..MIN_DELAY_TICKS + DELAY_SPREAD
pub fn draw_delay<J: JitterSource + ?Sized>(rng: &mut J) -> u32 {
    rng.below(DELAY_SPREAD).min(DELAY_SPREAD - 1) + MIN_DELAY_TICKS
}

/// Compute pulses for every stack in `original_stacks` and hand each to `emit`
/// Returns the number of pulses emitted
pub fn schedule<J, F>(original_stacks: &[ItemStack], recipient: Ulid, rng: &mut J, mut emit: F) -> u32
where
    J: JitterSource + ?Sized,
    F: FnMut(FeedbackPulse),
{
    let mut emitted = 0;

    for stack in original_stacks {
        for _ in 0..pulse_count(stack) {
            let pitch = draw_pitch(rng);
            let delay_ticks = draw_delay(rng);

            emit(FeedbackPulse {
                delay_ticks,
                pitch,
                recipient,
            });
            emitted += 1;
        }
    }

    emitted
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Replays fixed sequences, cycling when exhausted
    pub(crate) struct FixedJitter {
        units: Vec<f32>,
        ints: Vec<u32>,
        unit_pos: usize,
        int_pos: usize,
    }

    impl FixedJitter {
        pub(crate) fn new(units: Vec<f32>, ints: Vec<u32>) -> Self {
            Self {
                units,
                ints,
                unit_pos: 0,
                int_pos: 0,
            }
        }
    }

    impl JitterSource for FixedJitter {
        fn unit(&mut self) -> f32 {
            let value = self.units[self.unit_pos % self.units.len()];
            self.unit_pos += 1;
            value
        }

        fn below(&mut self, bound: u32) -> u32 {
            let value = self.ints[self.int_pos % self.ints.len()] % bound;
            self.int_pos += 1;
            value
        }
    }

    #[test]
    fn test_pulse_count_is_capped() {
        assert_eq!(pulse_count(&ItemStack::new("bone", 50)), 6);
        assert_eq!(pulse_count(&ItemStack::new("bone", 6)), 6);
        assert_eq!(pulse_count(&ItemStack::new("bone", 3)), 3);
        assert_eq!(pulse_count(&ItemStack::new("bone", 0)), 0);
    }

    #[test]
    fn test_fixed_jitter_extremes() {
        let mut low = FixedJitter::new(vec![0.0], vec![0]);
        assert!((draw_pitch(&mut low) - 1.6).abs() < 1e-6);
        assert_eq!(draw_delay(&mut low), 4);

        let mut high = FixedJitter::new(vec![0.999_999], vec![2]);
        assert!(draw_pitch(&mut high) <= 2.0);
        assert_eq!(draw_delay(&mut high), 6);

        let mut mid = FixedJitter::new(vec![0.5], vec![1]);
        assert!((draw_pitch(&mut mid) - 1.8).abs() < 1e-6);
        assert_eq!(draw_delay(&mut mid), 5);
    }

    #[test]
    fn test_pulse_parameter_ranges() {
        let mut rng = StdRng::seed_from_u64(42);
        let stacks = vec![ItemStack::new("bone", 50); 20];
        let mut pulses = Vec::new();

        schedule(&stacks, Ulid::new(), &mut rng, |pulse| pulses.push(pulse));

        assert_eq!(pulses.len(), 120);
        for pulse in &pulses {
            assert!(pulse.pitch >= 1.6 - 1e-6 && pulse.pitch <= 2.0 + 1e-6, "pitch {}", pulse.pitch);
            assert!((4..=6).contains(&pulse.delay_ticks), "delay {}", pulse.delay_ticks);
        }
    }

    #[test]
    fn test_schedule_is_reproducible_with_seed() {
        let stacks = vec![ItemStack::new("bone", 4), ItemStack::new("arrow", 9)];
        let recipient = Ulid::new();

        let mut first = Vec::new();
        schedule(&stacks, recipient, &mut StdRng::seed_from_u64(7), |p| first.push(p));

        let mut second = Vec::new();
        schedule(&stacks, recipient, &mut StdRng::seed_from_u64(7), |p| second.push(p));

        assert_eq!(first, second);
        assert_eq!(first.len(), 10);
        assert!(first.iter().all(|p| p.recipient == recipient));
    }

    #[test]
    fn test_schedule_counts_per_stack() {
        let mut rng = FixedJitter::new(vec![0.25, 0.75], vec![0, 1, 2]);
        let stacks = vec![
            ItemStack::new("bone", 10),
            ItemStack::new("arrow", 5),
            ItemStack::new("string", 0),
        ];
        let mut delays = Vec::new();

        let emitted = schedule(&stacks, Ulid::new(), &mut rng, |p| delays.push(p.delay_ticks));

        assert_eq!(emitted, 11);
        assert_eq!(&delays[..3], &[4, 5, 6]);
    }

    #[test]
    fn test_schedule_breakdown_per_stack() {
        let recipient = Ulid::new();
        let arrows = ItemStack::new("arrow", 10);
        let bones = ItemStack::new("bone", 5);

        let count = |stacks: &[ItemStack]| {
            let mut pulses = Vec::new();
            schedule(stacks, recipient, &mut StdRng::seed_from_u64(11), |p| pulses.push(p));
            pulses.len()
        };

        assert_eq!(count(std::slice::from_ref(&arrows)), 6);
        assert_eq!(count(std::slice::from_ref(&bones)), 5);
        assert_eq!(count(&[arrows, bones]), 11);
    }
}
