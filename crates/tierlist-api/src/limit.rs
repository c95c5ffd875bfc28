//! Per-actor command throttling.

use std::{
  num::NonZeroU32,
  sync::atomic::{AtomicU64, Ordering},
  time::Duration,
};

use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tierlist_core::{config::Cooldown, review::MemberId};
use tracing::debug;

/// Checks between two sweeps of idle actors out of the limiter state.
const PRUNE_EVERY: u64 = 1024;

/// Allows each actor `rate` commands per `per_secs` window.
pub struct CommandLimiter {
  limiter: DefaultKeyedRateLimiter<MemberId>,
  checks:  AtomicU64,
}

impl CommandLimiter {
  pub fn new(cooldown: Cooldown) -> Self {
    let burst = NonZeroU32::new(cooldown.rate).unwrap_or(NonZeroU32::MIN);
    let quota = Duration::from_secs(cooldown.per_secs)
      .checked_div(burst.get())
      .and_then(Quota::with_period)
      .map_or_else(|| Quota::per_second(burst), |q| q.allow_burst(burst));
    Self { limiter: RateLimiter::keyed(quota), checks: AtomicU64::new(0) }
  }

  /// `true` when `actor` may run another command now.
  pub fn check(&self, actor: MemberId) -> bool {
    if self.checks.fetch_add(1, Ordering::Relaxed) % PRUNE_EVERY == PRUNE_EVERY - 1 {
      self.prune();
    }
    self.limiter.check_key(&actor).is_ok()
  }

  /// Forget actors whose quota has fully replenished.
  fn prune(&self) {
    let before = self.limiter.len();
    self.limiter.retain_recent();
    self.limiter.shrink_to_fit();
    debug!(before, after = self.limiter.len(), "pruned command limiter");
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn quota_is_per_actor() {
    let limiter = CommandLimiter::new(Cooldown { rate: 2, per_secs: 60 });
    assert!(limiter.check(MemberId(1)));
    assert!(limiter.check(MemberId(1)));
    assert!(!limiter.check(MemberId(1)));
    assert!(limiter.check(MemberId(2)));
  }

  #[test]
  fn zero_rate_still_admits_one() {
    let limiter = CommandLimiter::new(Cooldown { rate: 0, per_secs: 0 });
    assert!(limiter.check(MemberId(1)));
  }

  #[test]
  fn idle_actors_are_swept_periodically() {
    let limiter = CommandLimiter::new(Cooldown { rate: 1000, per_secs: 1 });
    for id in 0..PRUNE_EVERY - 1 {
      assert!(limiter.check(MemberId(id)));
    }
    assert_eq!(limiter.limiter.len(), (PRUNE_EVERY - 1) as usize);

    std::thread::sleep(Duration::from_millis(50));
    assert!(limiter.check(MemberId(u64::MAX)));
    assert_eq!(limiter.limiter.len(), 1);
  }

  #[test]
  fn busy_actors_survive_a_sweep() {
    let limiter = CommandLimiter::new(Cooldown { rate: 2, per_secs: 60 });
    assert!(limiter.check(MemberId(1)));
    assert!(limiter.check(MemberId(1)));
    limiter.prune();
    assert!(!limiter.check(MemberId(1)));
  }
}
