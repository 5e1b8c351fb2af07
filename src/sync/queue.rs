use log::debug;

/// A queue that holds at most one pending task.
///
/// While a task is pending, further pushes are dropped: the pending task
/// reads the latest state when it runs, so a burst of triggers costs one
/// run. Single-threaded; nothing here blocks.
#[derive(Debug)]
pub struct TaskSlot<T> {
	pending: Option<T>,
	dropped: u64,
}

impl<T> Default for TaskSlot<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> TaskSlot<T> {
	pub fn new() -> Self {
		Self {
			pending: None,
			dropped: 0,
		}
	}

	/// Queue `task` unless one is already pending. Returns whether it was queued.
	pub fn push(&mut self, task: T) -> bool {
		if self.pending.is_some() {
			self.dropped += 1;
			debug!("task slot busy, dropping trigger ({} so far)", self.dropped);
			return false;
		}
		self.pending = Some(task);
		true
	}

	pub fn take(&mut self) -> Option<T> {
		self.pending.take()
	}

	pub fn get_mut(&mut self) -> Option<&mut T> {
		self.pending.as_mut()
	}

	pub fn is_pending(&self) -> bool {
		self.pending.is_some()
	}

	/// Discard the pending task without running it.
	pub fn clear(&mut self) {
		self.pending = None;
	}

	/// Triggers dropped because a task was already pending.
	pub fn dropped(&self) -> u64 {
		self.dropped
	}
}
