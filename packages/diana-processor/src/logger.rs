use std::collections::VecDeque;

pub const DEFAULT_LOG_CAPACITY: usize = 100;

/// Fixed-capacity record of generation exchanges. The oldest entry is evicted on overflow.
#[derive(Clone, Debug)]
pub struct LlmLogger {
	capacity: usize,
	entries: VecDeque<String>,
}
impl LlmLogger {
	pub fn new(capacity: usize) -> Self {
		let capacity = capacity.max(1);

		Self { capacity, entries: VecDeque::with_capacity(capacity) }
	}

	pub fn log(&mut self, request: &str, response: &str) {
		if self.entries.len() == self.capacity {
			self.entries.pop_front();
		}

		self.entries.push_back(format!("REQUEST: {request}\nRESPONSE: {response}"));
	}

	pub fn entries(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}
}
impl Default for LlmLogger {
	fn default() -> Self {
		Self::new(DEFAULT_LOG_CAPACITY)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn formats_entries() {
		let mut logger = LlmLogger::default();

		logger.log("{\"a\":1}", "{\"b\":2}");

		assert_eq!(logger.entries().collect::<Vec<_>>(), vec!["REQUEST: {\"a\":1}\nRESPONSE: {\"b\":2}"]);
	}

	#[test]
	fn evicts_the_oldest_entry() {
		let mut logger = LlmLogger::new(2);

		for index in 0..3 {
			logger.log(&format!("req-{index}"), "ok");
		}

		let entries: Vec<&str> = logger.entries().collect();

		assert_eq!(logger.len(), 2);
		assert!(entries[0].starts_with("REQUEST: req-1"));
		assert!(entries[1].starts_with("REQUEST: req-2"));
	}

	#[test]
	fn zero_capacity_keeps_one_entry() {
		let mut logger = LlmLogger::new(0);

		logger.log("a", "b");
		logger.log("c", "d");

		assert_eq!(logger.capacity(), 1);
		assert_eq!(logger.len(), 1);
	}
}
