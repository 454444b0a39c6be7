//! Fan-out across locations with partial-failure semantics.
//!
//! One scoped thread per location; all of them are joined before returning.
//! A failing location never cancels or delays its siblings, and the result
//! vector is positionally aligned with the input regardless of which request
//! finished first.
//!
//! At most `MAX_CONCURRENT_REQUESTS` threads run at once; longer location
//! lists are worked through in batches of that size.
//!
//! There is no cancellation: a caller that stops caring about a collection
//! still waits for every in-flight request (bounded by the transport timeout
//! and the retry policy).

use std::panic;
use std::thread;

use crate::assembler::ReadingAssembler;
use crate::ingest::retry::{JsonFetcher, Sleeper};
use crate::logging;
use crate::model::{AqError, Reading};

/// Outcome for one requested location.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationOutcome<T, E = AqError> {
    pub location: String,
    pub result: Result<T, E>,
}

impl<T, E> LocationOutcome<T, E> {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Upper bound on simultaneous upstream requests in one collection.
pub const MAX_CONCURRENT_REQUESTS: usize = 8;

/// Runs `assemble` for every location concurrently and returns outcomes in
/// input order. Never fails as a whole.
pub fn collect_all<T, E, A>(locations: &[String], assemble: A) -> Vec<LocationOutcome<T, E>>
where
    A: Fn(&str) -> Result<T, E> + Sync,
    T: Send,
    E: Send,
{
    collect_all_bounded(locations, MAX_CONCURRENT_REQUESTS, assemble)
}

/// `collect_all` with an explicit concurrency limit. A limit of 0 is
/// treated as 1.
pub fn collect_all_bounded<T, E, A>(
    locations: &[String],
    max_concurrent: usize,
    assemble: A,
) -> Vec<LocationOutcome<T, E>>
where
    A: Fn(&str) -> Result<T, E> + Sync,
    T: Send,
    E: Send,
{
    let assemble = &assemble;
    let mut outcomes = Vec::with_capacity(locations.len());

    for batch in locations.chunks(max_concurrent.max(1)) {
        thread::scope(|scope| {
            let handles: Vec<_> = batch
                .iter()
                .map(|location| scope.spawn(move || assemble(location.as_str())))
                .collect();

            // Joining in spawn order keeps outcomes aligned with `locations`.
            for (location, handle) in batch.iter().zip(handles) {
                let result = match handle.join() {
                    Ok(result) => result,
                    Err(payload) => panic::resume_unwind(payload),
                };
                outcomes.push(LocationOutcome {
                    location: location.clone(),
                    result,
                });
            }
        });
    }

    outcomes
}

/// Current readings for every location, logging each failure and a summary.
pub fn collect_current_readings<F, S>(
    assembler: &ReadingAssembler<F, S>,
    locations: &[String],
) -> Vec<LocationOutcome<Reading>>
where
    F: JsonFetcher + Sync,
    S: Sleeper + Sync,
{
    let outcomes = collect_all(locations, |location| assembler.assemble_current_reading(location));

    let mut failed = 0;
    for outcome in &outcomes {
        if let Err(err) = &outcome.result {
            failed += 1;
            logging::log_location_failure(&outcome.location, "current reading", err);
        }
    }
    logging::log_collection_summary(outcomes.len(), outcomes.len() - failed, failed);

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_partial_failure_keeps_input_order() {
        // A finishes last, B fails fastest; output must still be A, B, C.
        let outcomes = collect_all(&names(&["A", "B", "C"]), |location| match location {
            "A" => {
                thread::sleep(Duration::from_millis(60));
                Ok(1)
            }
            "B" => Err(format!("{} failed", location)),
            _ => {
                thread::sleep(Duration::from_millis(20));
                Ok(3)
            }
        });

        let locations: Vec<_> = outcomes.iter().map(|o| o.location.as_str()).collect();
        assert_eq!(locations, vec!["A", "B", "C"]);
        assert_eq!(outcomes[0].result, Ok(1));
        assert_eq!(outcomes[1].result, Err("B failed".to_string()));
        assert_eq!(outcomes[2].result, Ok(3));
    }

    #[test]
    fn test_all_failures_still_return_every_outcome() {
        let outcomes: Vec<LocationOutcome<(), String>> =
            collect_all(&names(&["X", "Y"]), |l| Err(l.to_string()));
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| !o.is_success()));
    }

    #[test]
    fn test_requests_run_concurrently() {
        let start = std::time::Instant::now();
        let outcomes: Vec<LocationOutcome<(), ()>> = collect_all(&names(&["a", "b", "c", "d"]), |_| {
            thread::sleep(Duration::from_millis(100));
            Ok(())
        });
        assert_eq!(outcomes.len(), 4);
        assert!(
            start.elapsed() < Duration::from_millis(350),
            "four 100ms jobs took {:?}; they should overlap",
            start.elapsed()
        );
    }

    #[test]
    fn test_empty_input() {
        let outcomes: Vec<LocationOutcome<(), ()>> = collect_all(&[], |_| Ok(()));
        assert!(outcomes.is_empty());
    }

    #[test]
    fn test_in_flight_requests_are_bounded() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let in_flight = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        let locations: Vec<String> = (0..10).map(|i| format!("city-{}", i)).collect();

        let outcomes = collect_all_bounded(&locations, 3, |location| {
            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(20));
            in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok::<_, ()>(location.to_string())
        });

        assert!(peak.load(Ordering::SeqCst) <= 3, "peak was {}", peak.load(Ordering::SeqCst));
        let returned: Vec<_> = outcomes.iter().map(|o| o.result.clone().unwrap()).collect();
        assert_eq!(returned, locations, "batches must keep input order");
    }

    #[test]
    fn test_zero_limit_still_runs_every_location() {
        let outcomes: Vec<LocationOutcome<usize, ()>> =
            collect_all_bounded(&names(&["a", "bb"]), 0, |l| Ok(l.len()));
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[1].result, Ok(2));
    }

    #[test]
    #[should_panic(expected = "assembler bug")]
    fn test_panicking_location_is_re_raised() {
        let _: Vec<LocationOutcome<(), ()>> = collect_all(&names(&["ok", "boom"]), |l| {
            if l == "boom" {
                panic!("assembler bug");
            }
            Ok(())
        });
    }
}
