//! printf-style parameter substitution.
//!
//! Parameters are packed little-endian in directive order. Once the bytes
//! run out, the current directive and every one after it render as `???`.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%([-+ 0#]*)(\d+)?(?:\.(\d+|\*))?(hh|h|ll|l|z|j|t)?([diouxXcspfeEgG%])").unwrap()
});

/// Placeholder for a directive with no parameter bytes left.
pub const MISSING: &str = "???";

/// Largest field width or precision a directive may request.
pub const MAX_FIELD_WIDTH: usize = 4096;

/// Reject directives whose width or precision exceeds [`MAX_FIELD_WIDTH`].
pub fn check_format(format: &str) -> Result<(), String> {
    for caps in DIRECTIVE.captures_iter(format) {
        for (group, what) in [(2, "width"), (3, "precision")] {
            let Some(m) = caps.get(group) else { continue };
            if m.as_str() == "*" {
                continue;
            }
            let fits = m
                .as_str()
                .parse::<usize>()
                .is_ok_and(|n| n <= MAX_FIELD_WIDTH);
            if !fits {
                return Err(format!(
                    "directive {} {} exceeds {}",
                    what,
                    m.as_str(),
                    MAX_FIELD_WIDTH
                ));
            }
        }
    }
    Ok(())
}

/// Render `format` with values taken from `params`.
pub fn render_params(format: &str, params: &[u8], pointer_width: u8) -> String {
    let mut cursor = Cursor::new(params);
    let mut out = String::with_capacity(format.len() + 16);
    let mut last = 0;

    for caps in DIRECTIVE.captures_iter(format) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&format[last..whole.start()]);
        last = whole.end();

        let spec = Spec::from_captures(&caps);
        if spec.conv == '%' {
            out.push('%');
            continue;
        }
        match spec.render(&mut cursor, pointer_width) {
            Some(text) => out.push_str(&text),
            None => out.push_str(MISSING),
        }
    }
    out.push_str(&format[last..]);
    out
}

/// Space separated upper-case hex pairs.
pub fn raw_hex(params: &[u8]) -> String {
    params
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    exhausted: bool,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            pos: 0,
            exhausted: false,
        }
    }

    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        if self.exhausted || self.pos + n > self.bytes.len() {
            self.exhausted = true;
            return None;
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Some(slice)
    }

    fn unsigned(&mut self, n: usize) -> Option<u64> {
        let slice = self.take(n)?;
        let mut buf = [0u8; 8];
        buf[..n].copy_from_slice(slice);
        Some(u64::from_le_bytes(buf))
    }

    fn signed(&mut self, n: usize) -> Option<i64> {
        let raw = self.unsigned(n)?;
        Some(match n {
            4 => raw as u32 as i32 as i64,
            _ => raw as i64,
        })
    }

    fn float(&mut self) -> Option<f64> {
        self.unsigned(8).map(f64::from_bits)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Precision {
    Fixed(usize),
    FromArgs,
}

struct Spec<'a> {
    flags: &'a str,
    width: usize,
    precision: Option<Precision>,
    length: Option<&'a str>,
    conv: char,
}

impl<'a> Spec<'a> {
    fn from_captures(caps: &Captures<'a>) -> Self {
        let precision = caps.get(3).map(|m| match m.as_str() {
            "*" => Precision::FromArgs,
            digits => Precision::Fixed(field(digits)),
        });
        Self {
            flags: caps.get(1).map_or("", |m| m.as_str()),
            width: caps.get(2).map_or(0, |m| field(m.as_str())),
            precision,
            length: caps.get(4).map(|m| m.as_str()),
            conv: caps
                .get(5)
                .and_then(|m| m.as_str().chars().next())
                .unwrap_or('%'),
        }
    }

    fn flag(&self, c: char) -> bool {
        self.flags.contains(c)
    }

    /// Bytes consumed by an integer conversion.
    fn int_size(&self, pointer_width: u8) -> usize {
        match self.length {
            Some("l" | "ll" | "j") => 8,
            Some("z" | "t") => pointer_width as usize,
            _ => 4,
        }
    }

    fn render(&self, cursor: &mut Cursor<'_>, pointer_width: u8) -> Option<String> {
        let precision = match self.precision {
            Some(Precision::FromArgs) => {
                let value = cursor.signed(4)?;
                (value >= 0).then(|| (value as usize).min(MAX_FIELD_WIDTH))
            }
            Some(Precision::Fixed(p)) => Some(p),
            None => None,
        };

        let text = match self.conv {
            'd' | 'i' => {
                let value = cursor.signed(self.int_size(pointer_width))?;
                let value = match self.length {
                    Some("h") => value as i16 as i64,
                    Some("hh") => value as i8 as i64,
                    _ => value,
                };
                let sign = if value < 0 {
                    "-"
                } else if self.flag('+') {
                    "+"
                } else if self.flag(' ') {
                    " "
                } else {
                    ""
                };
                let digits = int_digits(value.unsigned_abs().to_string(), value == 0, precision);
                self.pad(sign, "", &digits, precision.is_none())
            }
            'u' | 'o' | 'x' | 'X' => {
                let value = cursor.unsigned(self.int_size(pointer_width))?;
                let value = match self.length {
                    Some("h") => value as u16 as u64,
                    Some("hh") => value as u8 as u64,
                    _ => value,
                };
                let raw = match self.conv {
                    'o' => format!("{:o}", value),
                    'x' => format!("{:x}", value),
                    'X' => format!("{:X}", value),
                    _ => value.to_string(),
                };
                let digits = int_digits(raw, value == 0, precision);
                let prefix = match self.conv {
                    'x' if self.flag('#') && value != 0 => "0x",
                    'X' if self.flag('#') && value != 0 => "0X",
                    'o' if self.flag('#') && !digits.starts_with('0') => "0",
                    _ => "",
                };
                self.pad("", prefix, &digits, precision.is_none())
            }
            'c' => {
                let value = cursor.unsigned(4)? as u32;
                let c = char::from_u32(value).unwrap_or('?');
                self.pad("", "", &c.to_string(), false)
            }
            'p' => {
                let value = cursor.unsigned(pointer_width as usize)?;
                let digits = format!("{:0width$X}", value, width = pointer_width as usize * 2);
                self.pad("", "0x", &digits, false)
            }
            's' => {
                let len = cursor.unsigned(2)? as usize;
                let bytes = cursor.take(len)?;
                let text = String::from_utf8_lossy(bytes);
                let text: String = match precision {
                    Some(max) => text.chars().take(max).collect(),
                    None => text.into_owned(),
                };
                self.pad("", "", &text, false)
            }
            'f' | 'e' | 'E' | 'g' | 'G' => {
                let value = cursor.float()?;
                self.render_float(value, precision)
            }
            _ => return None,
        };
        Some(text)
    }

    fn render_float(&self, value: f64, precision: Option<usize>) -> String {
        let upper = self.conv.is_ascii_uppercase();
        let sign = if value.is_sign_negative() && !value.is_nan() {
            "-"
        } else if self.flag('+') {
            "+"
        } else if self.flag(' ') {
            " "
        } else {
            ""
        };
        let magnitude = value.abs();

        if !magnitude.is_finite() {
            let word = if magnitude.is_nan() { "nan" } else { "inf" };
            let word = if upper {
                word.to_ascii_uppercase()
            } else {
                word.to_string()
            };
            return self.pad(sign, "", &word, false);
        }

        let precision = precision.unwrap_or(6);
        let digits = match self.conv {
            'f' => format!("{:.*}", precision, magnitude),
            'e' | 'E' => exponent_form(magnitude, precision, upper),
            _ => general_form(magnitude, precision, upper, self.flag('#')),
        };
        self.pad(sign, "", &digits, true)
    }

    /// Apply field width: `-` left-aligns, `0` pads numerics after the sign.
    fn pad(&self, sign: &str, prefix: &str, digits: &str, zero_allowed: bool) -> String {
        let len = sign.len() + prefix.len() + digits.chars().count();
        if len >= self.width {
            return format!("{}{}{}", sign, prefix, digits);
        }
        let fill = self.width - len;
        if self.flag('-') {
            format!("{}{}{}{}", sign, prefix, digits, " ".repeat(fill))
        } else if self.flag('0') && zero_allowed {
            format!("{}{}{}{}", sign, prefix, "0".repeat(fill), digits)
        } else {
            format!("{}{}{}{}", " ".repeat(fill), sign, prefix, digits)
        }
    }
}

/// Width or precision digits, clamped to [`MAX_FIELD_WIDTH`].
fn field(digits: &str) -> usize {
    digits
        .parse::<usize>()
        .map_or(MAX_FIELD_WIDTH, |n| n.min(MAX_FIELD_WIDTH))
}

/// Integer precision is a minimum digit count; `.0` with zero prints nothing.
fn int_digits(raw: String, is_zero: bool, precision: Option<usize>) -> String {
    match precision {
        Some(0) if is_zero => String::new(),
        Some(p) if raw.len() < p => format!("{}{}", "0".repeat(p - raw.len()), raw),
        _ => raw,
    }
}

/// `d.ddde±XX` with at least two exponent digits.
fn exponent_form(value: f64, precision: usize, upper: bool) -> String {
    let text = format!("{:.*e}", precision, value);
    let (mantissa, exponent) = text.split_once('e').unwrap_or((&text, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    format!(
        "{}{}{}{:02}",
        mantissa,
        if upper { 'E' } else { 'e' },
        if exponent < 0 { '-' } else { '+' },
        exponent.abs()
    )
}

fn general_form(value: f64, precision: usize, upper: bool, keep_zeros: bool) -> String {
    let significant = precision.max(1);
    let exponent = if value == 0.0 {
        0
    } else {
        let text = format!("{:.*e}", significant - 1, value);
        text.split_once('e')
            .and_then(|(_, e)| e.parse::<i64>().ok())
            .unwrap_or(0)
    };

    let text = if exponent >= -4 && exponent < significant as i64 {
        let decimals = (significant as i64 - 1 - exponent).max(0) as usize;
        format!("{:.*}", decimals, value)
    } else {
        exponent_form(value, significant - 1, upper)
    };

    if keep_zeros {
        return text;
    }
    match text.find(['e', 'E']) {
        Some(at) => {
            let (mantissa, exp) = text.split_at(at);
            format!("{}{}", strip_fraction_zeros(mantissa), exp)
        }
        None => strip_fraction_zeros(&text).to_string(),
    }
}

fn strip_fraction_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}
