//! Timing of agent actions
//!
//! Two independent loops run per session:
//! - **speaking**: every few seconds, maybe one agent says something
//! - **voting**: every 10-20 seconds, maybe one agent casts a vote
//!
//! Both only act while the game is in the eligible phase and stop themselves
//! as soon as it is left or no agent is live.

pub mod periodic;
pub mod selection;
mod speaking;
mod voting;

pub use periodic::{PeriodicTask, TickHandler, TickOutcome};
pub use selection::{first_success, trial_probability};
pub use speaking::SpeakingLoop;
pub use voting::VotingLoop;

use std::sync::Arc;
use std::time::Duration;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Serialize, Deserialize};
use crate::error::{LycanError, LycanResult};

/// Random source shared by the loops of a session
pub type SharedRng = Arc<Mutex<StdRng>>;

pub fn shared_rng(seed: Option<u64>) -> SharedRng {
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    Arc::new(Mutex::new(rng))
}

/// Longest delay a policy may produce, in seconds
pub const MAX_DELAY_SECS: f64 = 86_400.0;

fn clamp_secs(secs: f64) -> f64 {
    if secs.is_nan() {
        0.0
    } else {
        secs.clamp(0.0, MAX_DELAY_SECS)
    }
}

fn draw_uniform<R: Rng>((low, high): (f64, f64), rng: &mut R) -> Duration {
    let (low, high) = (clamp_secs(low), clamp_secs(high));
    let secs = if high > low { rng.gen_range(low..=high) } else { low };
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
}

fn check_secs(field: &str, secs: f64) -> LycanResult<()> {
    if secs.is_finite() && (0.0..=MAX_DELAY_SECS).contains(&secs) {
        Ok(())
    } else {
        Err(LycanError::Configuration(format!(
            "{} must be between 0 and {} seconds, got {}",
            field, MAX_DELAY_SECS, secs
        )))
    }
}

/// Speaking delay: uniform in `[per_agent * n - jitter, per_agent * n + jitter]` seconds
///
/// Scaling with the number of live agents keeps each agent's own cadence
/// roughly constant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpeakingPolicy {
    pub per_agent_secs: f64,
    pub jitter_secs: f64,
}

impl Default for SpeakingPolicy {
    fn default() -> Self {
        Self {
            per_agent_secs: 5.0,
            jitter_secs: 3.0,
        }
    }
}

impl SpeakingPolicy {
    pub fn bounds(&self, live_agents: usize) -> (f64, f64) {
        let center = self.per_agent_secs * live_agents as f64;
        let low = (center - self.jitter_secs).max(0.0);
        let high = (center + self.jitter_secs).max(low);
        (low, high)
    }

    pub fn draw<R: Rng>(&self, live_agents: usize, rng: &mut R) -> Duration {
        draw_uniform(self.bounds(live_agents), rng)
    }

    pub fn validate(&self) -> LycanResult<()> {
        check_secs("speaking.per_agent_secs", self.per_agent_secs)?;
        check_secs("speaking.jitter_secs", self.jitter_secs)
    }
}

/// Voting delay: uniform in a fixed window, independent of agent count
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VotingPolicy {
    pub min_secs: f64,
    pub max_secs: f64,
}

impl Default for VotingPolicy {
    fn default() -> Self {
        Self {
            min_secs: 10.0,
            max_secs: 20.0,
        }
    }
}

impl VotingPolicy {
    pub fn bounds(&self) -> (f64, f64) {
        let low = self.min_secs.max(0.0);
        (low, self.max_secs.max(low))
    }

    pub fn draw<R: Rng>(&self, rng: &mut R) -> Duration {
        draw_uniform(self.bounds(), rng)
    }

    pub fn validate(&self) -> LycanResult<()> {
        check_secs("voting.min_secs", self.min_secs)?;
        check_secs("voting.max_secs", self.max_secs)
    }
}

/// The speaking and voting loops of one session
pub struct Scheduler {
    speaking: PeriodicTask,
    voting: PeriodicTask,
}

impl Scheduler {
    pub fn new(speaking: Arc<SpeakingLoop>, voting: Arc<VotingLoop>) -> Self {
        Self {
            speaking: PeriodicTask::new(speaking),
            voting: PeriodicTask::new(voting),
        }
    }

    pub fn start_speaking(&self) -> bool {
        self.speaking.start()
    }

    pub fn stop_speaking(&self) -> bool {
        self.speaking.stop()
    }

    pub fn is_speaking_active(&self) -> bool {
        self.speaking.is_active()
    }

    pub fn start_voting(&self) -> bool {
        self.voting.start()
    }

    pub fn stop_voting(&self) -> bool {
        self.voting.stop()
    }

    pub fn is_voting_active(&self) -> bool {
        self.voting.is_active()
    }

    pub fn start_all(&self) {
        self.start_speaking();
        self.start_voting();
    }

    pub fn stop_all(&self) {
        self.stop_speaking();
        self.stop_voting();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speaking_bounds_scale_with_agents() {
        let policy = SpeakingPolicy::default();
        assert_eq!(policy.bounds(1), (2.0, 8.0));
        assert_eq!(policy.bounds(4), (17.0, 23.0));
        assert_eq!(policy.bounds(0), (0.0, 3.0));
    }

    #[test]
    fn test_draws_stay_in_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        let speaking = SpeakingPolicy::default();
        let voting = VotingPolicy::default();
        for _ in 0..500 {
            let d = speaking.draw(3, &mut rng).as_secs_f64();
            assert!((12.0..=18.0).contains(&d));
            let v = voting.draw(&mut rng).as_secs_f64();
            assert!((10.0..=20.0).contains(&v));
        }
    }

    #[test]
    fn test_degenerate_window() {
        let mut rng = StdRng::seed_from_u64(1);
        let voting = VotingPolicy { min_secs: 15.0, max_secs: 5.0 };
        assert_eq!(voting.draw(&mut rng), Duration::from_secs(15));
    }

    #[test]
    fn test_out_of_range_values_never_panic() {
        let mut rng = StdRng::seed_from_u64(1);
        let huge = VotingPolicy { min_secs: 1e300, max_secs: 1e300 };
        assert_eq!(huge.draw(&mut rng), Duration::from_secs_f64(MAX_DELAY_SECS));

        let unbounded = VotingPolicy { min_secs: 1.0, max_secs: f64::INFINITY };
        let d = unbounded.draw(&mut rng).as_secs_f64();
        assert!((1.0..=MAX_DELAY_SECS).contains(&d));

        let nan = SpeakingPolicy { per_agent_secs: f64::NAN, jitter_secs: 3.0 };
        assert!(nan.draw(2, &mut rng) <= Duration::from_secs(3));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(SpeakingPolicy::default().validate().is_ok());
        assert!(VotingPolicy::default().validate().is_ok());
        assert!(VotingPolicy { min_secs: 1.0, max_secs: f64::INFINITY }.validate().is_err());
        assert!(VotingPolicy { min_secs: -1.0, max_secs: 5.0 }.validate().is_err());
        assert!(SpeakingPolicy { per_agent_secs: 5.0, jitter_secs: f64::NAN }.validate().is_err());
        assert!(SpeakingPolicy { per_agent_secs: 1e300, jitter_secs: 3.0 }.validate().is_err());
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let a: u64 = shared_rng(Some(9)).lock().gen();
        let b: u64 = shared_rng(Some(9)).lock().gen();
        assert_eq!(a, b);
    }
}
