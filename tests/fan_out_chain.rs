//! Property tests for the fan-out continuation chain: following every
//! continuation from page 1 must visit each page of the job exactly once,
//! in a bounded number of steps, without ever exceeding the queue's
//! batch-send limit.

use std::collections::HashSet;

use proptest::prelude::*;

use auditflow_core::extraction::scheduler::{build_entries, plan_fan_out, DISPATCH_WIDTH};
use auditflow_core::messaging::{Operation, QUEUE_BATCH_LIMIT};

/// Walk the whole continuation chain for a job of `total_pages`, collecting
/// every dispatched page and counting scheduling steps.
fn walk_chain(total_pages: u32) -> (Vec<u32>, usize) {
    let mut dispatched = Vec::new();
    let mut steps = 0;
    let mut next = Some(1);

    while let Some(page) = next {
        let plan = plan_fan_out(page, total_pages);
        assert!(
            !plan.is_empty(),
            "chain reached an empty plan at page {page} of {total_pages}"
        );
        steps += 1;
        dispatched.extend(&plan.pages);
        next = plan.continuation;
    }

    (dispatched, steps)
}

proptest! {
    #[test]
    fn chain_covers_every_page_exactly_once(total_pages in 1u32..500) {
        let (dispatched, _) = walk_chain(total_pages);

        let unique: HashSet<u32> = dispatched.iter().copied().collect();
        prop_assert_eq!(unique.len(), dispatched.len(), "a page was dispatched twice");
        prop_assert_eq!(
            unique,
            (1..=total_pages).collect::<HashSet<u32>>(),
            "dispatched pages are not exactly 1..=total_pages"
        );
    }

    #[test]
    fn chain_length_is_ceil_of_pages_over_width(total_pages in 1u32..500) {
        let (_, steps) = walk_chain(total_pages);
        let expected = total_pages.div_ceil(DISPATCH_WIDTH) as usize;
        prop_assert_eq!(steps, expected);
    }

    #[test]
    fn no_step_exceeds_the_batch_limit(total_pages in 1u32..500, start in 1u32..500) {
        let plan = plan_fan_out(start, total_pages);
        let entries = build_entries(&plan, "2026-08-26", total_pages);
        prop_assert!(entries.len() <= QUEUE_BATCH_LIMIT);
    }

    #[test]
    fn continuation_pages_strictly_increase(total_pages in 1u32..500) {
        let mut page = 1;
        loop {
            let plan = plan_fan_out(page, total_pages);
            match plan.continuation {
                Some(next) => {
                    prop_assert!(next > page, "continuation did not advance: {page} -> {next}");
                    page = next;
                }
                None => break,
            }
        }
    }

    #[test]
    fn exactly_one_continuation_per_step_at_most(total_pages in 1u32..500, start in 1u32..500) {
        let plan = plan_fan_out(start, total_pages);
        let entries = build_entries(&plan, "2026-08-26", total_pages);
        let continuations = entries
            .iter()
            .filter(|e| e.body.operation == Operation::ExtractContinue)
            .count();
        prop_assert!(continuations <= 1);
        // when present, the continuation is the last entry of the batch
        if continuations == 1 {
            prop_assert_eq!(
                entries.last().unwrap().body.operation,
                Operation::ExtractContinue
            );
        }
    }
}
