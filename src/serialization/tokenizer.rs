//! Pull-based tokenizer for the tagged text format.
use std::collections::VecDeque;
use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

use crate::error::{BoostError, Result};


/// A token of the tagged text format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `<name>`
    Open(String),
    /// `</name>`
    Close(String),
    /// A whitespace-separated word between tags.
    Text(String),
}


impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open(tag)  => write!(f, "<{tag}>"),
            Self::Close(tag) => write!(f, "</{tag}>"),
            Self::Text(word) => write!(f, "`{word}`"),
        }
    }
}


/// Reads [`Token`]s from a [`BufRead`] one line at a time.
///
/// ```
/// use enumboost::{StreamTokenizer, Token};
///
/// let mut st = StreamTokenizer::new("<u>1 -1</u>".as_bytes());
/// assert_eq!(st.next_token().unwrap(), Some(Token::Open("u".into())));
/// let u: Vec<f64> = st.read_values_after_open("u").unwrap();
/// assert_eq!(u, vec![1.0, -1.0]);
/// assert_eq!(st.next_token().unwrap(), None);
/// ```
pub struct StreamTokenizer<R> {
    reader: R,
    pending: VecDeque<Token>,
    line: usize,
    eof: bool,
}


impl<R: BufRead> StreamTokenizer<R> {
    /// Tokenize `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: VecDeque::new(),
            line: 0,
            eof: false,
        }
    }


    /// Number of lines consumed so far.
    pub fn line(&self) -> usize {
        self.line
    }


    /// Read lines until at least one token is pending or the input ends.
    fn fill(&mut self) -> Result<()> {
        let mut buf = String::new();
        while self.pending.is_empty() && !self.eof {
            buf.clear();
            if self.reader.read_line(&mut buf)? == 0 {
                self.eof = true;
                break;
            }
            self.line += 1;
            lex_line(&buf, self.line, &mut self.pending)?;
        }
        Ok(())
    }


    /// Returns the next token, `None` at the end of the input.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        self.fill()?;
        Ok(self.pending.pop_front())
    }


    /// Returns the next token without consuming it.
    pub fn peek(&mut self) -> Result<Option<&Token>> {
        self.fill()?;
        Ok(self.pending.front())
    }


    /// Returns `true` if the next token is `<tag>`.
    pub fn peek_is_open(&mut self, tag: &str) -> Result<bool> {
        Ok(matches!(self.peek()?, Some(Token::Open(t)) if t == tag))
    }


    /// Consume `<tag>`.
    pub fn expect_open(&mut self, tag: &str) -> Result<()> {
        match self.next_token()? {
            Some(Token::Open(t)) if t == tag => Ok(()),
            other => Err(unexpected(tag, &format!("<{tag}>"), other, self.line)),
        }
    }


    /// Consume `</tag>`.
    pub fn expect_close(&mut self, tag: &str) -> Result<()> {
        match self.next_token()? {
            Some(Token::Close(t)) if t == tag => Ok(()),
            other => Err(unexpected(tag, &format!("</{tag}>"), other, self.line)),
        }
    }


    /// Consume `<tag>value</tag>` and parse `value`.
    pub fn read_leaf<T: FromStr>(&mut self, tag: &str) -> Result<T> {
        self.expect_open(tag)?;
        let value = match self.next_token()? {
            Some(Token::Text(word)) => parse_word(tag, &word, self.line)?,
            other => {
                return Err(unexpected(tag, "a value", other, self.line));
            },
        };
        self.expect_close(tag)?;
        Ok(value)
    }


    /// Consume `<tag>v1 v2 ...</tag>` and parse every value.
    pub fn read_values<T: FromStr>(&mut self, tag: &str) -> Result<Vec<T>> {
        self.expect_open(tag)?;
        self.read_values_after_open(tag)
    }


    /// Same as [`StreamTokenizer::read_values`]
    /// when `<tag>` is already consumed.
    pub fn read_values_after_open<T: FromStr>(&mut self, tag: &str)
        -> Result<Vec<T>>
    {
        let mut values = Vec::new();
        loop {
            match self.next_token()? {
                Some(Token::Text(word)) => {
                    values.push(parse_word(tag, &word, self.line)?);
                },
                Some(Token::Close(t)) if t == tag => return Ok(values),
                other => {
                    return Err(unexpected(
                        tag, &format!("a value or </{tag}>"), other, self.line
                    ));
                },
            }
        }
    }
}


fn lex_line(line: &str, line_no: usize, out: &mut VecDeque<Token>)
    -> Result<()>
{
    let mut rest = line;
    while !rest.is_empty() {
        match rest.find('<') {
            Some(start) => {
                push_words(&rest[..start], out);
                let after = &rest[start + 1..];
                let end = after.find('>')
                    .ok_or_else(|| BoostError::malformed(
                        after.trim(),
                        format!("unterminated tag at line {line_no}"),
                    ))?;
                let tag = after[..end].trim();
                match tag.strip_prefix('/') {
                    Some(name) => out.push_back(Token::Close(name.trim().to_string())),
                    None       => out.push_back(Token::Open(tag.to_string())),
                }
                rest = &after[end + 1..];
            },
            None => {
                push_words(rest, out);
                break;
            },
        }
    }
    Ok(())
}


fn push_words(text: &str, out: &mut VecDeque<Token>) {
    out.extend(text.split_whitespace().map(|w| Token::Text(w.to_string())));
}


fn parse_word<T: FromStr>(tag: &str, word: &str, line: usize) -> Result<T> {
    word.parse::<T>()
        .map_err(|_| BoostError::malformed(
            tag,
            format!("cannot parse `{word}` at line {line}"),
        ))
}


fn unexpected(tag: &str, expected: &str, found: Option<Token>, line: usize)
    -> BoostError
{
    let found = found.map(|t| t.to_string())
        .unwrap_or_else(|| "end of input".to_string());
    BoostError::malformed(
        tag,
        format!("expected {expected}, found {found} at line {line}"),
    )
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_across_lines() {
        let text = "<column>3</column>\n\t<u>\n1 -1\n</u>\n";
        let mut st = StreamTokenizer::new(text.as_bytes());
        let mut tokens = Vec::new();
        while let Some(t) = st.next_token().unwrap() {
            tokens.push(t);
        }
        assert_eq!(tokens, vec![
            Token::Open("column".into()),
            Token::Text("3".into()),
            Token::Close("column".into()),
            Token::Open("u".into()),
            Token::Text("1".into()),
            Token::Text("-1".into()),
            Token::Close("u".into()),
        ]);
        assert_eq!(st.line(), 4);
    }

    #[test]
    fn test_read_leaf_and_values() {
        let text = "<alpha>0.25</alpha><u>1 0 -1</u><tail>";
        let mut st = StreamTokenizer::new(text.as_bytes());
        assert_eq!(st.read_leaf::<f64>("alpha").unwrap(), 0.25);
        assert_eq!(st.read_values::<f64>("u").unwrap(), vec![1.0, 0.0, -1.0]);
        assert!(st.peek_is_open("tail").unwrap());
    }

    #[test]
    fn test_type_mismatch_names_the_tag() {
        let mut st = StreamTokenizer::new("<column>x</column>".as_bytes());
        let err = st.read_leaf::<usize>("column").unwrap_err();
        match err {
            BoostError::MalformedState { tag, .. } => assert_eq!(tag, "column"),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_missing_close() {
        let mut st = StreamTokenizer::new("<u>1 2".as_bytes());
        assert!(st.read_values::<f64>("u").is_err());
    }

    #[test]
    fn test_unterminated_tag() {
        let mut st = StreamTokenizer::new("<u 1 2".as_bytes());
        assert!(st.next_token().is_err());
    }
}
