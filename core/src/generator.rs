//! Simulated unreliable unit of work.

use deferral_types::{Outcome, OutcomeKind, RaisedFault, at_time, millis_of};

use crate::clock::Clock;

/// Produce one outcome from the clock's millisecond reading.
///
/// Multiples of 5 raise, other multiples of 3 fail, everything else
/// succeeds. The raise check comes first, so 15 raises.
pub fn generate(clock: &dyn Clock) -> Result<Outcome, RaisedFault> {
    let now = clock.now();
    let ms = millis_of(&now);
    let time = at_time(&now);

    if ms % 5 == 0 {
        Err(RaisedFault::at(&time))
    } else if ms % 3 == 0 {
        Ok(Outcome::new(OutcomeKind::Failure, &time))
    } else {
        Ok(Outcome::new(OutcomeKind::Success, &time))
    }
}

#[cfg(test)]
mod tests {
    use deferral_types::OutcomeKind;

    use super::generate;
    use crate::clock::FixedClock;

    fn kind_at(ms: u32) -> OutcomeKind {
        match generate(&FixedClock::at_millis(ms)) {
            Ok(outcome) => outcome.kind(),
            Err(_) => OutcomeKind::Thrown,
        }
    }

    #[test]
    fn multiple_of_five_raises() {
        let fault = generate(&FixedClock::at_millis(10)).unwrap_err();
        assert_eq!(fault.message(), "12:0:0.10 : exception");
    }

    #[test]
    fn multiple_of_fifteen_raises_rather_than_fails() {
        assert!(generate(&FixedClock::at_millis(15)).is_err());
        assert!(generate(&FixedClock::at_millis(0)).is_err());
    }

    #[test]
    fn multiple_of_three_fails() {
        let outcome = generate(&FixedClock::at_millis(9)).unwrap();
        assert_eq!(outcome.kind(), OutcomeKind::Failure);
        assert_eq!(outcome.message(), "12:0:0.9 : failure");
    }

    #[test]
    fn other_values_succeed() {
        let outcome = generate(&FixedClock::at_millis(7)).unwrap();
        assert_eq!(outcome.kind(), OutcomeKind::Success);
        assert_eq!(outcome.message(), "12:0:0.7 : success");
    }

    #[test]
    fn branch_counts_over_a_full_second() {
        let mut thrown = 0;
        let mut failed = 0;
        let mut succeeded = 0;
        for ms in 0..1_000 {
            match kind_at(ms) {
                OutcomeKind::Thrown => thrown += 1,
                OutcomeKind::Failure => failed += 1,
                OutcomeKind::Success => succeeded += 1,
            }
        }
        // 200 multiples of 5; 334 multiples of 3, 67 of which are also multiples of 5.
        assert_eq!(thrown, 200);
        assert_eq!(failed, 267);
        assert_eq!(succeeded, 533);
    }
}
