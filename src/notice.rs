//! User-visible notices.

use log::warn;

/// Surface a message to the user.
///
/// Implemented by whatever toast or banner the host offers. Every
/// recoverable user-facing failure goes through here in addition to the log.
pub trait Notifier {
	fn notice(&self, message: &str);
}

/// Notifier that only writes to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
	fn notice(&self, message: &str) {
		warn!("{message}");
	}
}
