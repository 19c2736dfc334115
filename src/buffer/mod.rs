use std::fmt;

use crate::error::Error;
use crate::options::BufferOptions;
use crate::Result;

/// Growable text buffer with an explicit capacity ledger.
///
/// `allocated` is the capacity this buffer asked for, tracked separately from
/// whatever the allocator actually handed out. When the free space cannot hold
/// the next append plus one byte, capacity grows by the larger of that amount
/// and the current capacity, so repeated appends stay amortized O(1).
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    mem: String,
    allocated: usize,
    limit: Option<usize>,
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: &BufferOptions) -> Self {
        Self {
            limit: options.limit,
            ..Self::default()
        }
    }

    pub fn used(&self) -> usize {
        self.mem.len()
    }

    pub fn allocated(&self) -> usize {
        self.allocated
    }

    pub fn len(&self) -> usize {
        self.used()
    }

    pub fn is_empty(&self) -> bool {
        self.mem.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.mem
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.mem.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.mem
    }

    /// Free the storage and return to the freshly created state. The limit is kept.
    pub fn destroy(&mut self) {
        self.mem = String::new();
        self.allocated = 0;
    }

    /// Append `text`. On allocation failure the buffer is emptied.
    ///
    /// # Examples
    /// ```
    /// use config_request::Buffer;
    ///
    /// let mut buf = Buffer::new();
    /// buf.append("abc")?;
    /// assert_eq!((buf.used(), buf.allocated()), (3, 4));
    /// buf.append("de")?;
    /// assert_eq!((buf.used(), buf.allocated()), (5, 8));
    /// assert_eq!(buf.as_str(), "abcde");
    /// # Ok::<(), config_request::Error>(())
    /// ```
    pub fn append(&mut self, text: &str) -> Result<()> {
        let len = text.len();
        if self.allocated - self.used() <= len {
            self.grow(len + 1)?;
        }
        self.mem.push_str(text);
        Ok(())
    }

    pub fn append_line(&mut self, line: &str) -> Result<()> {
        self.append(line)?;
        self.append("\n")
    }

    fn grow(&mut self, needed: usize) -> Result<()> {
        let increment = needed.max(self.allocated);
        let target = self
            .allocated
            .checked_add(increment)
            .filter(|target| self.limit.map_or(true, |limit| *target <= limit));

        let reserved = match target {
            Some(target) => self
                .mem
                .try_reserve_exact(target - self.mem.len())
                .map(|_| target)
                .map_err(|err| err.to_string()),
            None => Err(match self.limit {
                Some(limit) => format!("buffer limit of {limit} bytes exceeded"),
                None => "buffer size overflow".to_string(),
            }),
        };

        match reserved {
            Ok(target) => {
                tracing::trace!(from = self.allocated, to = target, "buffer grown");
                self.allocated = target;
                Ok(())
            }
            Err(message) => {
                tracing::error!(
                    requested = needed,
                    allocated = self.allocated,
                    used = self.used(),
                    "buffer reallocation failed, discarding contents"
                );
                self.destroy();
                Err(Error::allocation(message))
            }
        }
    }
}

impl fmt::Write for Buffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.append(s).map_err(|_| fmt::Error)
    }
}

impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.mem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write as _;

    #[rstest::rstest]
    fn test_new_buffer_is_empty() {
        let buf = Buffer::new();
        assert_eq!(buf.used(), 0);
        assert_eq!(buf.allocated(), 0);
        assert_eq!(buf.as_str(), "");
    }

    #[rstest::rstest]
    #[case(&[])]
    #[case(&["a"])]
    #[case(&["hello", " ", "world"])]
    #[case(&["", "x", "", "yz"])]
    #[case(&["a long first chunk that exceeds nothing yet", "b", "cc", "ddd", "eeee"])]
    fn test_appends_concatenate(#[case] parts: &[&str]) {
        let mut buf = Buffer::new();
        let mut expected = String::new();
        for part in parts {
            let before = buf.allocated();
            buf.append(part).unwrap();
            expected.push_str(part);
            assert!(buf.allocated() >= buf.used());
            assert!(buf.allocated() >= before);
            assert_eq!(buf.as_str(), expected);
        }
        assert_eq!(buf.used(), parts.iter().map(|p| p.len()).sum::<usize>());
    }

    #[rstest::rstest]
    fn test_growth_policy() {
        let mut buf = Buffer::new();
        buf.append("abc").unwrap();
        assert_eq!(buf.allocated(), 4);
        buf.append("de").unwrap();
        assert_eq!(buf.allocated(), 8);
        buf.append("x").unwrap();
        assert_eq!(buf.allocated(), 8);
        buf.append("0123456789abcdef").unwrap();
        assert_eq!(buf.allocated(), 8 + 17);
        assert_eq!(buf.as_str(), "abcdex0123456789abcdef");
    }

    #[rstest::rstest]
    fn test_append_line() {
        let mut buf = Buffer::new();
        buf.append_line("a = 1").unwrap();
        buf.append_line("b = 2").unwrap();
        assert_eq!(buf.as_str(), "a = 1\nb = 2\n");
    }

    #[rstest::rstest]
    fn test_allocation_failure_empties_buffer() {
        let mut buf = Buffer::with_options(&BufferOptions::new().with_limit(Some(8)));
        buf.append("abc").unwrap();
        buf.append("de").unwrap();
        assert_eq!(buf.allocated(), 8);

        let err = buf.append("fghij").unwrap_err();
        assert!(err.is_allocation());
        assert_eq!(buf.used(), 0);
        assert_eq!(buf.allocated(), 0);
        assert_eq!(buf.as_str(), "");

        buf.append("again").unwrap();
        assert_eq!(buf.as_str(), "again");
    }

    #[rstest::rstest]
    fn test_destroy_resets() {
        let mut buf = Buffer::new();
        buf.append("something").unwrap();
        buf.destroy();
        assert_eq!(buf.used(), 0);
        assert_eq!(buf.allocated(), 0);
    }

    #[rstest::rstest]
    fn test_fmt_write() {
        let mut buf = Buffer::new();
        write!(buf, "{}={}", "size", 100).unwrap();
        assert_eq!(buf.to_string(), "size=100");
    }
}
