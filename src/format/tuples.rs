//! Safe tuple-dump parsing
//!
//! The relational tool dumps result rows as tuple literals with wrapper
//! tokens for dates and fixed-point decimals, e.g.
//! `[(1, datetime.date(2024, 1, 15), Decimal('190.75'), 45000000)]`.
//! This module is a hand-rolled scanner for exactly that shape — nothing
//! is ever evaluated, and malformed input yields no rows.

use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Int(i64),
    Float(f64),
    /// Fixed-point value kept as its canonical digit string.
    Decimal(String),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl SqlValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SqlValue::Int(v) => Some(*v as f64),
            SqlValue::Float(v) => Some(*v),
            SqlValue::Decimal(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "None"),
            SqlValue::Int(v) => write!(f, "{}", v),
            SqlValue::Float(v) => write!(f, "{}", v),
            SqlValue::Decimal(s) => write!(f, "Decimal('{}')", s),
            SqlValue::Text(s) => write!(f, "'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
            SqlValue::Date(d) => {
                use chrono::Datelike;
                write!(f, "datetime.date({}, {}, {})", d.year(), d.month(), d.day())
            }
            SqlValue::DateTime(dt) => {
                use chrono::{Datelike, Timelike};
                write!(
                    f,
                    "datetime.datetime({}, {}, {}, {}, {}, {})",
                    dt.year(),
                    dt.month(),
                    dt.day(),
                    dt.hour(),
                    dt.minute(),
                    dt.second()
                )
            }
        }
    }
}

/// Render rows in the dump shape the scanner reads back.
pub fn render_tuple_dump(rows: &[Vec<SqlValue>]) -> String {
    let tuples: Vec<String> = rows
        .iter()
        .map(|row| {
            let values: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            format!("({})", values.join(", "))
        })
        .collect();
    format!("[{}]", tuples.join(", "))
}

/// Does this text embed a recognizable tuple dump?
pub fn looks_like_tuple_dump(text: &str) -> bool {
    text.contains("[(") && (text.contains("Decimal(") || text.contains("datetime.date"))
}

/// Extract and parse the tuple dump embedded in free text. Returns an
/// empty vec on any malformed input.
pub fn parse_tuple_dump(text: &str) -> Vec<Vec<SqlValue>> {
    let Some(start) = text.find('[') else {
        return Vec::new();
    };
    let Some(end) = text.rfind(']') else {
        return Vec::new();
    };
    if end <= start {
        return Vec::new();
    }

    let mut scanner = Scanner::new(&text[start + 1..end]);
    let mut rows = Vec::new();

    loop {
        scanner.skip_separators();
        if scanner.at_end() {
            break;
        }
        let Some(row) = scanner.parse_tuple() else {
            return Vec::new();
        };
        rows.push(row);
    }

    rows
}

struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn skip_separators(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r' | b',')) {
            self.pos += 1;
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, byte: u8) -> Option<()> {
        self.skip_whitespace();
        if self.peek() == Some(byte) {
            self.pos += 1;
            Some(())
        } else {
            None
        }
    }

    fn parse_tuple(&mut self) -> Option<Vec<SqlValue>> {
        self.expect(b'(')?;
        let mut values = Vec::new();
        loop {
            self.skip_separators();
            match self.peek()? {
                b')' => {
                    self.pos += 1;
                    return Some(values);
                }
                _ => values.push(self.parse_value()?),
            }
        }
    }

    fn parse_value(&mut self) -> Option<SqlValue> {
        self.skip_whitespace();
        match self.peek()? {
            b'\'' | b'"' => self.parse_string().map(SqlValue::Text),
            b'-' | b'0'..=b'9' => self.parse_number(),
            b'A'..=b'Z' | b'a'..=b'z' => self.parse_ident(),
            _ => None,
        }
    }

    fn parse_string(&mut self) -> Option<String> {
        let quote = self.bump()?;
        let mut out = String::new();
        loop {
            match self.bump()? {
                b'\\' => {
                    let escaped = self.bump()?;
                    out.push(escaped as char);
                }
                b if b == quote => return Some(out),
                b => out.push(b as char),
            }
        }
    }

    fn parse_number(&mut self) -> Option<SqlValue> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        let mut has_dot = false;
        while let Some(b) = self.peek() {
            match b {
                b'0'..=b'9' => self.pos += 1,
                b'.' if !has_dot => {
                    has_dot = true;
                    self.pos += 1;
                }
                _ => break,
            }
        }
        let literal = std::str::from_utf8(&self.bytes[start..self.pos]).ok()?;
        if has_dot {
            literal.parse().ok().map(SqlValue::Float)
        } else {
            literal.parse().ok().map(SqlValue::Int)
        }
    }

    fn parse_ident(&mut self) -> Option<SqlValue> {
        let start = self.pos;
        while matches!(self.peek(), Some(b'A'..=b'Z' | b'a'..=b'z' | b'.' | b'_')) {
            self.pos += 1;
        }
        let ident = std::str::from_utf8(&self.bytes[start..self.pos]).ok()?;

        match ident {
            "None" | "NULL" => Some(SqlValue::Null),
            "Decimal" => {
                self.expect(b'(')?;
                self.skip_whitespace();
                let digits = self.parse_string()?;
                self.expect(b')')?;
                // Reject anything that is not a plain number.
                digits.parse::<f64>().ok()?;
                Some(SqlValue::Decimal(digits))
            }
            "datetime.date" => {
                let args = self.parse_int_args()?;
                if args.len() != 3 {
                    return None;
                }
                NaiveDate::from_ymd_opt(args[0] as i32, args[1] as u32, args[2] as u32)
                    .map(SqlValue::Date)
            }
            "datetime.datetime" => {
                let args = self.parse_int_args()?;
                if args.len() < 3 || args.len() > 7 {
                    return None;
                }
                let date =
                    NaiveDate::from_ymd_opt(args[0] as i32, args[1] as u32, args[2] as u32)?;
                let hour = args.get(3).copied().unwrap_or(0) as u32;
                let minute = args.get(4).copied().unwrap_or(0) as u32;
                let second = args.get(5).copied().unwrap_or(0) as u32;
                date.and_hms_opt(hour, minute, second).map(SqlValue::DateTime)
            }
            _ => None,
        }
    }

    fn parse_int_args(&mut self) -> Option<Vec<i64>> {
        self.expect(b'(')?;
        let mut args = Vec::new();
        loop {
            self.skip_separators();
            match self.peek()? {
                b')' => {
                    self.pos += 1;
                    return Some(args);
                }
                _ => match self.parse_number()? {
                    SqlValue::Int(v) => args.push(v),
                    _ => return None,
                },
            }
        }
    }
}
