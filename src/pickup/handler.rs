// Death event handler - routes mob drops and experience straight to the killer

use std::sync::Arc;

use super::distributor::{distribute, total_quantity};
use super::events::{DeathEvent, Listener};
use super::feedback::{self, FeedbackSink, JitterSource};
use super::policy::{self, DenyReason, Eligibility};
use super::recipient::RecipientProvider;
use super::scheduler::DeferredExecutor;
use super::settings::Configuration;

/// What the handler did with an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickupOutcome {
    /// Event left untouched
    Skipped(DenyReason),
    Collected {
        /// Experience moved to the killer (0 when a mending tool kept it on the ground)
        experience_redirected: u32,
        /// Item quantity placed into the killer's inventory
        items_collected: u64,
        /// Stacks written back to the event for the host to drop
        overflow_stacks: usize,
        pulses_scheduled: u32,
    },
}

/// Collects mob drops into the killer's inventory
/// Everything the host owns (roster, scheduler, settings, sound output, rng) is injected
pub struct DeathEventHandler<P, X, C, J> {
    provider: P,
    executor: X,
    config: C,
    sink: Arc<dyn FeedbackSink>,
    rng: J,
}

impl<P, X, C, J> DeathEventHandler<P, X, C, J>
where
    P: RecipientProvider,
    X: DeferredExecutor,
    C: Configuration,
    J: JitterSource,
{
    pub fn new(provider: P, executor: X, config: C, sink: Arc<dyn FeedbackSink>, rng: J) -> Self {
        Self {
            provider,
            executor,
            config,
            sink,
            rng,
        }
    }

    /// Run the event through gating, experience redirect, distribution and feedback
    pub fn process(&mut self, event: &mut DeathEvent) -> PickupOutcome {
        let Self {
            provider,
            executor,
            config,
            sink,
            rng,
        } = self;

        let Some(killer_id) = event.killer else {
            return skipped(DenyReason::NoKiller);
        };

        let outcome = provider.with_recipient(killer_id, |killer| {
            let redirect = match policy::decide(event, Some(&*killer), &*config) {
                Eligibility::Denied(reason) => return skipped(reason),
                Eligibility::Granted { redirect_experience } => redirect_experience,
            };

            let experience_redirected = if redirect {
                policy::redirect_experience(event, &mut *killer)
            } else {
                0
            };

            // Snapshot, then clear the live list
            let snapshot = std::mem::take(&mut event.drops);
            let overflow = distribute(killer.inventory_mut(), &snapshot);

            // Feedback follows the full snapshot, overflow included
            let pulses_scheduled = feedback::schedule(&snapshot, killer_id, rng, |pulse| {
                let sink = sink.clone();
                executor.schedule_after(pulse.delay_ticks, Box::new(move || sink.play_feedback(&pulse)));
            });

            let items_collected = total_quantity(&snapshot).saturating_sub(total_quantity(&overflow));
            let overflow_stacks = overflow.len();
            event.drops.extend(overflow);

            debug_log!(
                "[AutoPickup] {:?} collected {} items ({} stacks overflow), +{} xp, {} pulses",
                killer_id, items_collected, overflow_stacks, experience_redirected, pulses_scheduled
            );

            PickupOutcome::Collected {
                experience_redirected,
                items_collected,
                overflow_stacks,
                pulses_scheduled,
            }
        });

        outcome.unwrap_or_else(|| skipped(DenyReason::KillerOffline))
    }
}

fn skipped(reason: DenyReason) -> PickupOutcome {
    debug_log!("[AutoPickup] Skipping death event: {}", reason.to_string());
    PickupOutcome::Skipped(reason)
}

impl<P, X, C, J> Listener<DeathEvent> for DeathEventHandler<P, X, C, J>
where
    P: RecipientProvider,
    X: DeferredExecutor,
    C: Configuration,
    J: JitterSource,
{
    fn handle(&mut self, event: &mut DeathEvent) {
        self.process(event);
    }
}
