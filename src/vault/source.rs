use crate::graph::ResolvedLinks;

/// A file as the host lists it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileRecord {
	pub path: String,
	/// File name with extension.
	pub name: String,
}

impl FileRecord {
	pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			name: name.into(),
		}
	}

	/// Record whose name is the last path segment.
	pub fn from_path(path: impl Into<String>) -> Self {
		let path = path.into();
		let name = path.rsplit('/').next().unwrap_or(&path).to_string();
		Self { path, name }
	}
}

/// The host's file list and link cache.
pub trait FileSource {
	fn list_files(&self) -> Vec<FileRecord>;
	fn resolved_links(&self) -> ResolvedLinks;
}

/// In-memory file source.
#[derive(Clone, Debug, Default)]
pub struct MemoryVault {
	files: Vec<FileRecord>,
	links: ResolvedLinks,
}

impl MemoryVault {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add a file unless its path is already present.
	pub fn add_file(&mut self, path: impl Into<String>) -> &mut Self {
		let record = FileRecord::from_path(path);
		if !self.files.iter().any(|f| f.path == record.path) {
			self.files.push(record);
		}
		self
	}

	/// Remove a file and every link it takes part in.
	pub fn remove_file(&mut self, path: &str) -> &mut Self {
		self.files.retain(|f| f.path != path);
		self.links.remove(path);
		for targets in self.links.values_mut() {
			targets.remove(path);
		}
		self
	}

	/// Record a resolved link, bumping its weight if it already exists.
	pub fn link(&mut self, source: &str, target: &str) -> &mut Self {
		*self
			.links
			.entry(source.to_string())
			.or_default()
			.entry(target.to_string())
			.or_insert(0) += 1;
		self
	}

	pub fn unlink(&mut self, source: &str, target: &str) -> &mut Self {
		if let Some(targets) = self.links.get_mut(source) {
			targets.remove(target);
		}
		self
	}
}

impl FileSource for MemoryVault {
	fn list_files(&self) -> Vec<FileRecord> {
		self.files.clone()
	}

	fn resolved_links(&self) -> ResolvedLinks {
		self.links.clone()
	}
}
