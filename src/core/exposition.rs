// Prometheus text exposition rendering shared by all exporters

use std::fmt;
use std::io::{self, Write};

use crate::core::config::{SIGNATURE, VERSION};

/// Escape a label value for the exposition format.
/// Backslash and double-quote are escaped, carriage returns dropped and
/// newlines turned into a literal `\n`.
pub fn escape_label(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\r' => {}
            '\n' => escaped.push_str("\\n"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Seconds rendered with a fixed 9 decimal places
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seconds(pub f64);

impl fmt::Display for Seconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.9}", self.0)
    }
}

/// Line-oriented writer for gauge families
pub struct MetricWriter<W: Write> {
    out: W,
}

impl<W: Write> MetricWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn help(&mut self, name: &str, text: &str) -> io::Result<()> {
        writeln!(self.out, "# HELP {} {}", name, text)
    }

    pub fn gauge_type(&mut self, name: &str) -> io::Result<()> {
        writeln!(self.out, "# TYPE {} gauge", name)
    }

    /// Write one sample line. Label values are escaped here, callers pass raw text.
    pub fn sample<V: fmt::Display>(
        &mut self,
        name: &str,
        labels: &[(&str, &str)],
        value: V,
    ) -> io::Result<()> {
        if labels.is_empty() {
            return writeln!(self.out, "{} {}", name, value);
        }

        let rendered = labels
            .iter()
            .map(|(key, val)| format!("{}=\"{}\"", key, escape_label(val)))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(self.out, "{}{{{}}} {}", name, rendered, value)
    }

    /// `# TYPE` line followed by a single sample
    pub fn gauge<V: fmt::Display>(
        &mut self,
        name: &str,
        labels: &[(&str, &str)],
        value: V,
    ) -> io::Result<()> {
        self.gauge_type(name)?;
        self.sample(name, labels, value)
    }

    /// Fixed closing lines: schema version and attribution
    pub fn trailer(&mut self) -> io::Result<()> {
        writeln!(self.out, "# VERSION {}", VERSION)?;
        writeln!(self.out, "# {}", SIGNATURE)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
