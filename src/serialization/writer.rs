//! Indentation-aware writer for the tagged text format.
use std::fmt::Display;
use std::io::{self, Write};


/// Writes `<tag>value</tag>` lines, one tab per nesting level.
///
/// ```
/// use enumboost::TagWriter;
///
/// let mut buf = Vec::new();
/// let mut w = TagWriter::new(&mut buf);
/// w.open("u").unwrap();
/// w.leaf("el", 1.5).unwrap();
/// w.close("u").unwrap();
/// assert_eq!(String::from_utf8(buf).unwrap(), "<u>\n\t<el>1.5</el>\n</u>\n");
/// ```
pub struct TagWriter<W> {
    out: W,
    depth: usize,
}


impl<W: Write> TagWriter<W> {
    /// Write to `out`, starting at depth `0`.
    pub fn new(out: W) -> Self {
        Self { out, depth: 0 }
    }


    /// Write to `out`, starting at `depth` tabs.
    pub fn with_depth(out: W, depth: usize) -> Self {
        Self { out, depth }
    }


    /// Current nesting level.
    pub fn depth(&self) -> usize {
        self.depth
    }


    fn indent(&mut self) -> io::Result<()> {
        for _ in 0..self.depth {
            self.out.write_all(b"\t")?;
        }
        Ok(())
    }


    /// Write `<tag>` and increase the depth.
    pub fn open(&mut self, tag: &str) -> io::Result<()> {
        self.indent()?;
        writeln!(self.out, "<{tag}>")?;
        self.depth += 1;
        Ok(())
    }


    /// Decrease the depth and write `</tag>`.
    pub fn close(&mut self, tag: &str) -> io::Result<()> {
        self.depth = self.depth.saturating_sub(1);
        self.indent()?;
        writeln!(self.out, "</{tag}>")
    }


    /// Write `<tag>value</tag>` on a single line.
    pub fn leaf<T: Display>(&mut self, tag: &str, value: T) -> io::Result<()> {
        self.indent()?;
        writeln!(self.out, "<{tag}>{value}</{tag}>")
    }


    /// Write `<tag>v1 v2 ...</tag>` on a single line.
    pub fn values<T: Display>(&mut self, tag: &str, values: &[T])
        -> io::Result<()>
    {
        let line = values.iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        self.leaf(tag, line)
    }


    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }


    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}
