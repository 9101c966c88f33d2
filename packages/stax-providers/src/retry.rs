use std::time::Duration;

/// How a single attempt ended, as far as retry classification cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
	/// Connect failure, timeout, or another transport-level error.
	Transport,
	/// An HTTP response arrived with this status.
	Status(u16),
}

/// Shared retry policy for the catalog fetcher and the ISBN backfill job.
/// Transient outcomes (transport failures, 429 and common 5xx statuses) are
/// retried with a doubling delay; everything else surfaces to the caller on
/// the first attempt.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
	max_retries: u32,
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self { max_retries: 4 }
	}
}
impl RetryPolicy {
	pub fn new(max_retries: u32) -> Self {
		Self { max_retries }
	}

	/// `attempt` is the zero-based index of the attempt that just finished.
	pub fn should_retry(&self, attempt: u32, outcome: AttemptOutcome) -> bool {
		attempt < self.max_retries && is_transient(outcome)
	}

	/// Delay before the attempt after `attempt`: 1s, 2s, 4s, 8s.
	pub fn delay_for(&self, attempt: u32) -> Duration {
		Duration::from_secs(1 << attempt.min(6))
	}
}

fn is_transient(outcome: AttemptOutcome) -> bool {
	match outcome {
		AttemptOutcome::Transport => true,
		AttemptOutcome::Status(status) => matches!(status, 429 | 500 | 502 | 503 | 504),
	}
}
