//! Typed column values and conversion accessors.

use chrono::{DateTime, Utc};
use rf_error::{RecordError, Result};

/// Date columns render and parse in this form.
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One typed field within a [`Record`](crate::Record).
///
/// Each typed variant carries an optional raw value; `None` denotes a null
/// field of that type. [`Column::Null`] is the untyped null produced by
/// sources that report no type information. Every comparison path in the
/// pipeline treats null raw data as a distinguished case, so check
/// [`is_null`](Column::is_null) before interpreting a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    String(Option<String>),
    Long(Option<i64>),
    Double(Option<f64>),
    Bool(Option<bool>),
    Date(Option<DateTime<Utc>>),
    Bytes(Option<Vec<u8>>),
    Null,
}

/// The kind tag of a column, used for dispatch and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    String,
    Long,
    Double,
    Bool,
    Date,
    Bytes,
    Null,
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ColumnKind::String => "string",
            ColumnKind::Long => "long",
            ColumnKind::Double => "double",
            ColumnKind::Bool => "bool",
            ColumnKind::Date => "date",
            ColumnKind::Bytes => "bytes",
            ColumnKind::Null => "null",
        };
        f.write_str(name)
    }
}

impl Column {
    /// Creates a non-null string column.
    pub fn string(value: impl Into<String>) -> Self {
        Column::String(Some(value.into()))
    }

    /// Creates a non-null long column.
    pub fn long(value: i64) -> Self {
        Column::Long(Some(value))
    }

    /// Creates a non-null double column.
    pub fn double(value: f64) -> Self {
        Column::Double(Some(value))
    }

    /// Creates a non-null bool column.
    pub fn boolean(value: bool) -> Self {
        Column::Bool(Some(value))
    }

    /// Creates a non-null date column.
    pub fn date(value: DateTime<Utc>) -> Self {
        Column::Date(Some(value))
    }

    /// Creates a non-null bytes column.
    pub fn bytes(value: Vec<u8>) -> Self {
        Column::Bytes(Some(value))
    }

    /// Returns the kind tag of this column.
    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::String(_) => ColumnKind::String,
            Column::Long(_) => ColumnKind::Long,
            Column::Double(_) => ColumnKind::Double,
            Column::Bool(_) => ColumnKind::Bool,
            Column::Date(_) => ColumnKind::Date,
            Column::Bytes(_) => ColumnKind::Bytes,
            Column::Null => ColumnKind::Null,
        }
    }

    /// Returns true when the raw value is null, whether typed or untyped.
    pub fn is_null(&self) -> bool {
        match self {
            Column::String(v) => v.is_none(),
            Column::Long(v) => v.is_none(),
            Column::Double(v) => v.is_none(),
            Column::Bool(v) => v.is_none(),
            Column::Date(v) => v.is_none(),
            Column::Bytes(v) => v.is_none(),
            Column::Null => true,
        }
    }

    /// Estimated payload size in bytes, used for channel capacity
    /// accounting. Null raw data counts as zero.
    pub fn byte_size(&self) -> usize {
        match self {
            Column::String(Some(s)) => s.len(),
            Column::Long(Some(_)) => 8,
            Column::Double(Some(_)) => 8,
            Column::Bool(Some(_)) => 1,
            Column::Date(Some(_)) => 8,
            Column::Bytes(Some(b)) => b.len(),
            _ => 0,
        }
    }

    /// The string form of this column.
    ///
    /// Dates render as `%Y-%m-%d %H:%M:%S`; bytes are validated as UTF-8.
    /// Returns `Ok(None)` for a null field.
    pub fn as_string(&self) -> Result<Option<String>> {
        let value = match self {
            Column::String(Some(s)) => s.clone(),
            Column::Long(Some(v)) => v.to_string(),
            Column::Double(Some(v)) => v.to_string(),
            Column::Bool(Some(b)) => b.to_string(),
            Column::Date(Some(d)) => d.format(DATE_FORMAT).to_string(),
            Column::Bytes(Some(b)) => String::from_utf8(b.clone()).map_err(|_| {
                self.conversion_error("string", format!("{} bytes", b.len()))
            })?,
            _ => return Ok(None),
        };
        Ok(Some(value))
    }

    /// The 64-bit integer form of this column.
    ///
    /// Doubles truncate, bools map to 1/0, dates yield their epoch
    /// millisecond value. Returns `Ok(None)` for a null field.
    pub fn as_long(&self) -> Result<Option<i64>> {
        let value = match self {
            Column::Long(Some(v)) => *v,
            Column::Double(Some(v)) => *v as i64,
            Column::Bool(Some(b)) => i64::from(*b),
            Column::Date(Some(d)) => d.timestamp_millis(),
            Column::String(Some(s)) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| self.conversion_error("long", s.clone()))?,
            Column::Bytes(Some(b)) => {
                return Err(self.conversion_error("long", format!("{} bytes", b.len())).into())
            }
            _ => return Ok(None),
        };
        Ok(Some(value))
    }

    /// The double form of this column. Returns `Ok(None)` for a null field.
    pub fn as_double(&self) -> Result<Option<f64>> {
        let value = match self {
            Column::Double(Some(v)) => *v,
            Column::Long(Some(v)) => *v as f64,
            Column::Bool(Some(b)) => f64::from(u8::from(*b)),
            Column::Date(Some(d)) => d.timestamp_millis() as f64,
            Column::String(Some(s)) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| self.conversion_error("double", s.clone()))?,
            Column::Bytes(Some(b)) => {
                return Err(self.conversion_error("double", format!("{} bytes", b.len())).into())
            }
            _ => return Ok(None),
        };
        Ok(Some(value))
    }

    /// The boolean form of this column.
    ///
    /// Longs map zero/non-zero, strings accept `true`/`false`
    /// case-insensitively. Returns `Ok(None)` for a null field.
    pub fn as_bool(&self) -> Result<Option<bool>> {
        let value = match self {
            Column::Bool(Some(b)) => *b,
            Column::Long(Some(v)) => *v != 0,
            Column::String(Some(s)) => match s.to_ascii_lowercase().as_str() {
                "true" => true,
                "false" => false,
                _ => return Err(self.conversion_error("bool", s.clone()).into()),
            },
            Column::Double(Some(v)) => {
                return Err(self.conversion_error("bool", v.to_string()).into())
            }
            Column::Date(Some(d)) => {
                return Err(self.conversion_error("bool", d.to_rfc3339()).into())
            }
            Column::Bytes(Some(b)) => {
                return Err(self.conversion_error("bool", format!("{} bytes", b.len())).into())
            }
            _ => return Ok(None),
        };
        Ok(Some(value))
    }

    /// The byte form of this column. Only bytes and strings convert;
    /// strings yield their UTF-8 encoding. Returns `Ok(None)` for a null
    /// field.
    pub fn as_bytes(&self) -> Result<Option<Vec<u8>>> {
        match self {
            Column::Bytes(Some(b)) => Ok(Some(b.clone())),
            Column::String(Some(s)) => Ok(Some(s.clone().into_bytes())),
            Column::Long(Some(v)) => Err(self.conversion_error("bytes", v.to_string()).into()),
            Column::Double(Some(v)) => Err(self.conversion_error("bytes", v.to_string()).into()),
            Column::Bool(Some(b)) => Err(self.conversion_error("bytes", b.to_string()).into()),
            Column::Date(Some(d)) => Err(self.conversion_error("bytes", d.to_rfc3339()).into()),
            _ => Ok(None),
        }
    }

    fn conversion_error(&self, to: &'static str, value: String) -> RecordError {
        RecordError::Conversion {
            from: match self.kind() {
                ColumnKind::String => "string",
                ColumnKind::Long => "long",
                ColumnKind::Double => "double",
                ColumnKind::Bool => "bool",
                ColumnKind::Date => "date",
                ColumnKind::Bytes => "bytes",
                ColumnKind::Null => "null",
            },
            to,
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_date() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_700_000_000_000).unwrap()
    }

    #[test]
    fn test_null_detection() {
        assert!(Column::Null.is_null());
        assert!(Column::Long(None).is_null());
        assert!(Column::String(None).is_null());
        assert!(!Column::long(0).is_null());
        assert!(!Column::string("").is_null());
    }

    #[test]
    fn test_byte_size() {
        assert_eq!(Column::string("hello").byte_size(), 5);
        assert_eq!(Column::long(42).byte_size(), 8);
        assert_eq!(Column::double(1.5).byte_size(), 8);
        assert_eq!(Column::boolean(true).byte_size(), 1);
        assert_eq!(Column::date(test_date()).byte_size(), 8);
        assert_eq!(Column::bytes(vec![1, 2, 3]).byte_size(), 3);
        assert_eq!(Column::Null.byte_size(), 0);
        assert_eq!(Column::Long(None).byte_size(), 0);
    }

    #[test]
    fn test_as_string() {
        assert_eq!(Column::long(42).as_string().unwrap(), Some("42".to_string()));
        assert_eq!(
            Column::boolean(true).as_string().unwrap(),
            Some("true".to_string())
        );
        assert_eq!(
            Column::date(test_date()).as_string().unwrap(),
            Some("2023-11-14 22:13:20".to_string())
        );
        assert_eq!(
            Column::bytes(b"abc".to_vec()).as_string().unwrap(),
            Some("abc".to_string())
        );
        assert_eq!(Column::String(None).as_string().unwrap(), None);
        assert!(Column::bytes(vec![0xff, 0xfe]).as_string().is_err());
    }

    #[test]
    fn test_as_long() {
        assert_eq!(Column::string(" 17 ").as_long().unwrap(), Some(17));
        assert_eq!(Column::double(9.8).as_long().unwrap(), Some(9));
        assert_eq!(Column::boolean(true).as_long().unwrap(), Some(1));
        assert_eq!(
            Column::date(test_date()).as_long().unwrap(),
            Some(1_700_000_000_000)
        );
        assert_eq!(Column::Long(None).as_long().unwrap(), None);
        assert!(Column::string("ten").as_long().is_err());
        assert!(Column::bytes(vec![1]).as_long().is_err());
    }

    #[test]
    fn test_as_double() {
        assert_eq!(Column::string("2.5").as_double().unwrap(), Some(2.5));
        assert_eq!(Column::long(3).as_double().unwrap(), Some(3.0));
        assert_eq!(Column::Double(None).as_double().unwrap(), None);
        assert!(Column::string("pi").as_double().is_err());
    }

    #[test]
    fn test_as_bool() {
        assert_eq!(Column::string("TRUE").as_bool().unwrap(), Some(true));
        assert_eq!(Column::long(0).as_bool().unwrap(), Some(false));
        assert_eq!(Column::long(-3).as_bool().unwrap(), Some(true));
        assert_eq!(Column::Bool(None).as_bool().unwrap(), None);
        assert!(Column::string("yes").as_bool().is_err());
        assert!(Column::double(1.0).as_bool().is_err());
    }

    #[test]
    fn test_as_bytes() {
        assert_eq!(
            Column::string("hi").as_bytes().unwrap(),
            Some(b"hi".to_vec())
        );
        assert_eq!(Column::Bytes(None).as_bytes().unwrap(), None);
        assert!(Column::long(1).as_bytes().is_err());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(Column::long(1).kind().to_string(), "long");
        assert_eq!(Column::Null.kind().to_string(), "null");
    }
}
