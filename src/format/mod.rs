//! Flat-text counterpart of the node builder.

use crate::args::Arg;
use crate::buffer::Buffer;
use crate::error::Error;
use crate::tag::{Marker, Tag};
use crate::Result;

impl Buffer {
    /// Append one line (or raw block) per argument.
    ///
    /// The key prefix is the tag text before `=`, kept verbatim. Integers are
    /// written bare, strings inside double quotes without escaping, blocks
    /// as-is with no newline. A `None` block is skipped. A tag with no marker
    /// is copied through unchanged.
    ///
    /// Stops at the first failure; lines already appended stay in the buffer
    /// unless the failure was an allocation failure, which empties it.
    ///
    /// # Examples
    /// ```
    /// use config_request::{Arg, Buffer};
    ///
    /// let mut buf = Buffer::new();
    /// buf.append_args(&[Arg::int("size=%d", 100), Arg::str("label=%s", "x")])?;
    /// assert_eq!(buf.as_str(), "size= 100\nlabel= \"x\"\n");
    /// # Ok::<(), config_request::Error>(())
    /// ```
    pub fn append_args(&mut self, args: &[Arg<'_>]) -> Result<()> {
        let mut line = String::new();
        let mut number = itoa::Buffer::new();

        for arg in args {
            let tag = Tag::parse(arg.tag())?;
            let key = tag.prefix();
            line.clear();

            match (tag.embedded_marker(), *arg) {
                (Some(Marker::Int), Arg::Int(_, value)) => {
                    line.push_str(key);
                    line.push_str("= ");
                    line.push_str(number.format(value));
                    line.push('\n');
                }
                (Some(Marker::Str), Arg::Str(_, value)) => {
                    line.push_str(key);
                    line.push_str("= \"");
                    line.push_str(value);
                    line.push_str("\"\n");
                }
                (Some(Marker::Block), Arg::Block(_, None)) => continue,
                (Some(Marker::Block), Arg::Block(_, Some(block))) => {
                    line.push_str(key);
                    line.push_str(block);
                }
                (None, Arg::Text(text)) => line.push_str(text),
                (marker, other) => {
                    let expected = marker.map_or("text", Marker::as_str);
                    tracing::error!(
                        tag = tag.raw(),
                        expected,
                        supplied = other.describe(),
                        "argument does not match its marker"
                    );
                    return Err(Error::build(format!(
                        "tag expects {expected} but was given {}",
                        other.describe()
                    ))
                    .with_tag(tag.raw()));
                }
            }

            self.append(&line)?;
        }

        Ok(())
    }
}
