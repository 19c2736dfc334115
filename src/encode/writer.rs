use crate::arena::ValueData;
use crate::buffer::Buffer;
use crate::constants::MAX_INDENT;
use crate::options::WriteOptions;
use crate::Result;

/// Line-at-a-time writer. Each finished line goes to the buffer in one append.
pub(crate) struct Writer<'b> {
    out: &'b mut Buffer,
    line: String,
    indent_unit: String,
    indent_cache: Vec<String>,
}

impl<'b> Writer<'b> {
    pub fn new(out: &'b mut Buffer, options: &WriteOptions) -> Self {
        Self {
            out,
            line: String::new(),
            indent_unit: options.indent.unit(),
            indent_cache: vec![String::new()],
        }
    }

    pub fn write_str(&mut self, s: &str) {
        self.line.push_str(s);
    }

    pub fn write_indent(&mut self, depth: usize) {
        let depth = depth.min(MAX_INDENT);
        if depth == 0 || self.indent_unit.is_empty() {
            return;
        }
        if depth >= self.indent_cache.len() {
            self.extend_indent_cache(depth);
        }
        self.line.push_str(&self.indent_cache[depth]);
    }

    pub fn write_value(&mut self, value: &ValueData<'_>) {
        match value {
            ValueData::String(text) => self.write_quoted_string(text),
            ValueData::Int(number) => {
                let mut buf = itoa::Buffer::new();
                self.line.push_str(buf.format(*number));
            }
            ValueData::EmptyArray => self.line.push_str("[]"),
        }
    }

    pub fn write_quoted_string(&mut self, s: &str) {
        self.line.push('"');
        for ch in s.chars() {
            if matches!(ch, '"' | '\\') {
                self.line.push('\\');
            }
            self.line.push(ch);
        }
        self.line.push('"');
    }

    pub fn end_line(&mut self) -> Result<()> {
        let result = self.out.append_line(&self.line);
        self.line.clear();
        result
    }

    fn extend_indent_cache(&mut self, depth: usize) {
        while self.indent_cache.len() <= depth {
            let next = match self.indent_cache.last() {
                Some(prev) => {
                    let mut s = String::with_capacity(prev.len() + self.indent_unit.len());
                    s.push_str(prev);
                    s.push_str(&self.indent_unit);
                    s
                }
                None => String::new(),
            };
            self.indent_cache.push(next);
        }
    }
}
