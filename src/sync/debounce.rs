//! Generation-stamped waits for values that take a while to settle.

/// Identifies the trigger a wait was started for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// Monotonic counter that makes older tickets stale.
#[derive(Debug, Default)]
pub struct Generation {
	current: u64,
}

impl Generation {
	pub fn new() -> Self {
		Self::default()
	}

	/// Start a new generation; every earlier ticket becomes stale.
	pub fn advance(&mut self) -> Ticket {
		self.current += 1;
		Ticket(self.current)
	}

	pub fn ticket(&self) -> Ticket {
		Ticket(self.current)
	}

	pub fn is_current(&self, ticket: Ticket) -> bool {
		ticket.0 == self.current
	}
}

/// Timing for [`SettleWait`], in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SettleOptions {
	/// Give up and resolve with whatever was last seen.
	pub timeout_ms: f64,
	/// Never resolve earlier than this after the wait starts.
	pub min_delay_ms: f64,
	/// How long a sample must stay unchanged to count as stable.
	pub interval_ms: f64,
}

impl Default for SettleOptions {
	fn default() -> Self {
		Self {
			timeout_ms: 3000.0,
			min_delay_ms: 200.0,
			interval_ms: 100.0,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Settle {
	Pending,
	Stable,
	TimedOut,
}

impl Settle {
	pub fn is_resolved(self) -> bool {
		self != Settle::Pending
	}
}

/// Waits until a sampled value stops changing, or a timeout passes.
///
/// The caller drives it by polling from its own timer, so nothing blocks.
/// Once resolved it stays resolved. The ticket lets the caller discard a
/// result that a newer trigger has superseded.
#[derive(Clone, Debug)]
pub struct SettleWait {
	ticket: Ticket,
	options: SettleOptions,
	started_ms: f64,
	changed_ms: f64,
	last: Option<usize>,
	resolved: Option<Settle>,
}

impl SettleWait {
	pub fn new(ticket: Ticket, now_ms: f64, options: SettleOptions) -> Self {
		Self {
			ticket,
			options,
			started_ms: now_ms,
			changed_ms: now_ms,
			last: None,
			resolved: None,
		}
	}

	pub fn ticket(&self) -> Ticket {
		self.ticket
	}

	pub fn poll(&mut self, now_ms: f64, sample: usize) -> Settle {
		if let Some(done) = self.resolved {
			return done;
		}
		if self.last != Some(sample) {
			self.last = Some(sample);
			self.changed_ms = now_ms;
		}

		let elapsed = now_ms - self.started_ms;
		let status = if elapsed >= self.options.timeout_ms {
			Settle::TimedOut
		} else if elapsed >= self.options.min_delay_ms
			&& now_ms - self.changed_ms >= self.options.interval_ms
		{
			Settle::Stable
		} else {
			Settle::Pending
		};

		if status.is_resolved() {
			self.resolved = Some(status);
		}
		status
	}
}
