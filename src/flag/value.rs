//! Flag value types
//!
//! A flag is typed once, at declaration time, by the variant of its default
//! value. Storage handed out to callers is a [`Slot`], and a [`Var`] ties a
//! slot of the matching type to a flag inside a [`FlagSet`](super::FlagSet).

use once_cell::sync::Lazy;
use regex::Regex;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// The closed set of flag kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagType {
    Int,
    String,
    Duration,
    Bool,
}

impl FlagType {
    /// Value name shown after the flag in the defaults listing
    pub fn type_word(self) -> &'static str {
        match self {
            FlagType::Int => "int",
            FlagType::String => "string",
            FlagType::Duration => "duration",
            FlagType::Bool => "bool",
        }
    }
}

/// A typed flag value, used for declared defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagValue {
    Int(i64),
    Str(String),
    Duration(Duration),
    Bool(bool),
}

impl FlagValue {
    pub fn flag_type(&self) -> FlagType {
        match self {
            FlagValue::Int(_) => FlagType::Int,
            FlagValue::Str(_) => FlagType::String,
            FlagValue::Duration(_) => FlagType::Duration,
            FlagValue::Bool(_) => FlagType::Bool,
        }
    }

    /// Whether this is the zero value of its type (not shown as a default)
    pub fn is_zero(&self) -> bool {
        match self {
            FlagValue::Int(v) => *v == 0,
            FlagValue::Str(v) => v.is_empty(),
            FlagValue::Duration(v) => v.is_zero(),
            FlagValue::Bool(v) => !*v,
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::Int(v) => write!(f, "{}", v),
            FlagValue::Str(v) => f.write_str(v),
            FlagValue::Duration(v) => f.write_str(&format_duration(*v)),
            FlagValue::Bool(v) => write!(f, "{}", v),
        }
    }
}

/// A shared storage location for a flag value
///
/// Cloning a slot shares the underlying cell, so a value parsed into one
/// flag set is visible through every clone.
#[derive(Debug, Default)]
pub struct Slot<T>(Rc<RefCell<T>>);

impl<T> Slot<T> {
    pub fn new(value: T) -> Self {
        Slot(Rc::new(RefCell::new(value)))
    }

    pub fn set(&self, value: T) {
        *self.0.borrow_mut() = value;
    }
}

impl<T: Clone> Slot<T> {
    pub fn get(&self) -> T {
        self.0.borrow().clone()
    }
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Slot(Rc::clone(&self.0))
    }
}

/// Typed storage bound to a flag
#[derive(Debug, Clone)]
pub enum Var {
    Int(Slot<i64>),
    Str(Slot<String>),
    Duration(Slot<Duration>),
    Bool(Slot<bool>),
}

impl Var {
    pub fn flag_type(&self) -> FlagType {
        match self {
            Var::Int(_) => FlagType::Int,
            Var::Str(_) => FlagType::String,
            Var::Duration(_) => FlagType::Duration,
            Var::Bool(_) => FlagType::Bool,
        }
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Var::Bool(_))
    }

    /// Current value held by the storage
    pub fn value(&self) -> FlagValue {
        match self {
            Var::Int(slot) => FlagValue::Int(slot.get()),
            Var::Str(slot) => FlagValue::Str(slot.get()),
            Var::Duration(slot) => FlagValue::Duration(slot.get()),
            Var::Bool(slot) => FlagValue::Bool(slot.get()),
        }
    }

    /// Store a typed value, returning false when the types differ
    pub fn assign(&self, value: &FlagValue) -> bool {
        match (self, value) {
            (Var::Int(slot), FlagValue::Int(v)) => slot.set(*v),
            (Var::Str(slot), FlagValue::Str(v)) => slot.set(v.clone()),
            (Var::Duration(slot), FlagValue::Duration(v)) => slot.set(*v),
            (Var::Bool(slot), FlagValue::Bool(v)) => slot.set(*v),
            _ => return false,
        }
        true
    }
}

impl From<&Slot<i64>> for Var {
    fn from(slot: &Slot<i64>) -> Self {
        Var::Int(slot.clone())
    }
}

impl From<&Slot<String>> for Var {
    fn from(slot: &Slot<String>) -> Self {
        Var::Str(slot.clone())
    }
}

impl From<&Slot<Duration>> for Var {
    fn from(slot: &Slot<Duration>) -> Self {
        Var::Duration(slot.clone())
    }
}

impl From<&Slot<bool>> for Var {
    fn from(slot: &Slot<bool>) -> Self {
        Var::Bool(slot.clone())
    }
}

static DURATION_COMPONENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]*)(?:\.([0-9]*))?(ns|us|µs|μs|ms|s|m|h)")
        .expect("duration component pattern is valid")
});

fn unit_nanos(unit: &str) -> u128 {
    match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => 1_000_000_000,
        "m" => 60 * 1_000_000_000,
        _ => 3_600 * 1_000_000_000,
    }
}

/// Parse a duration literal such as `300ms`, `1.5h` or `2h45m`
///
/// Used as the value parser of duration flags.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let invalid = || format!("invalid duration {:?}", s);

    let rest = match s.as_bytes().first() {
        Some(b'-') => {
            if s[1..].chars().all(|c| c == '0') && s.len() > 1 {
                return Ok(Duration::ZERO);
            }
            return Err(format!("negative duration {:?}", s));
        }
        Some(b'+') => &s[1..],
        _ => s,
    };

    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: u128 = 0;
    let mut remaining = rest;
    while !remaining.is_empty() {
        let caps = DURATION_COMPONENT
            .captures(remaining)
            .ok_or_else(|| match remaining.find(|c: char| !c.is_ascii_digit() && c != '.') {
                None => format!("missing unit in duration {:?}", s),
                Some(_) => invalid(),
            })?;

        let whole = caps.get(1).map_or("", |m| m.as_str());
        let frac = caps.get(2).map_or("", |m| m.as_str());
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        let unit = unit_nanos(&caps[3]);

        if !whole.is_empty() {
            let value: u128 = whole.parse().map_err(|_| invalid())?;
            total = total.saturating_add(value.saturating_mul(unit));
        }
        // Anything past nanosecond precision is dropped.
        let mut scale = unit;
        for digit in frac.bytes() {
            scale /= 10;
            if scale == 0 {
                break;
            }
            total += (digit - b'0') as u128 * scale;
        }

        remaining = &remaining[caps[0].len()..];
    }

    let nanos = u64::try_from(total).map_err(|_| invalid())?;
    Ok(Duration::from_nanos(nanos))
}

fn fraction(value: u64, precision: u32) -> (String, u64) {
    let scale = 10u64.pow(precision);
    let digits = value % scale;
    if digits == 0 {
        return (String::new(), value / scale);
    }
    let text = format!(".{:0width$}", digits, width = precision as usize);
    (text.trim_end_matches('0').to_string(), value / scale)
}

/// Render a duration the way it is accepted on the command line, e.g. `1m30s`
pub fn format_duration(d: Duration) -> String {
    let nanos = u64::try_from(d.as_nanos()).unwrap_or(u64::MAX);
    if nanos == 0 {
        return "0s".to_string();
    }

    if nanos < 1_000_000_000 {
        return if nanos < 1_000 {
            format!("{}ns", nanos)
        } else if nanos < 1_000_000 {
            let (frac, whole) = fraction(nanos, 3);
            format!("{}{}µs", whole, frac)
        } else {
            let (frac, whole) = fraction(nanos, 6);
            format!("{}{}ms", whole, frac)
        };
    }

    let (frac, mut rest) = fraction(nanos, 9);
    let mut out = format!("{}{}s", rest % 60, frac);
    rest /= 60;
    if rest > 0 {
        out = format!("{}m{}", rest % 60, out);
        rest /= 60;
        if rest > 0 {
            out = format!("{}h{}", rest, out);
        }
    }
    out
}
