//! Single-column string transforms: substring, segment replace, padding.
//!
//! All three operate on the column's string form and write the result
//! back as a string column. Character positions are Unicode scalar
//! positions, not byte offsets.

use crate::config::TransformerSpec;
use crate::execution::{Transform, TransformContext};
use crate::registry::{PAD_NAME, REPLACE_NAME, SUBSTR_NAME};
use rf_error::{RecordError, Result, RfError, TransformError};
use rf_record::{Column, Record};

pub(crate) fn build_substr(spec: &TransformerSpec) -> Result<Box<dyn Transform>> {
    Ok(Box::new(SubstrTransformer::from_spec(spec)?))
}

pub(crate) fn build_replace(spec: &TransformerSpec) -> Result<Box<dyn Transform>> {
    Ok(Box::new(ReplaceTransformer::from_spec(spec)?))
}

pub(crate) fn build_pad(spec: &TransformerSpec) -> Result<Box<dyn Transform>> {
    Ok(Box::new(PadTransformer::from_spec(spec)?))
}

fn required_column_index(spec: &TransformerSpec, name: &str) -> Result<usize> {
    spec.column_index
        .ok_or_else(|| RfError::RequiredValue(format!("columnIndex must be set: name={name}")))
}

fn parse_usize(name: &str, what: &str, raw: &str) -> Result<usize> {
    raw.parse().map_err(|_| {
        RfError::Config(format!("{name} {what} `{raw}` is not a non-negative integer"))
    })
}

/// Reads the target column's string form; `Ok(None)` means a null field
/// the transform passes through untouched.
fn string_form(record: &Record, index: usize) -> Result<Option<String>> {
    let column = record.column(index).ok_or(RecordError::ColumnOutOfBounds {
        index,
        len: record.column_count(),
    })?;
    column.as_string()
}

/// Keeps `[start, start + length)` of the column's string form.
pub struct SubstrTransformer {
    column_index: usize,
    start: usize,
    length: usize,
}

impl SubstrTransformer {
    /// Binds from a column index plus two parameters: start and length.
    pub fn from_spec(spec: &TransformerSpec) -> Result<Self> {
        let column_index = required_column_index(spec, SUBSTR_NAME)?;
        if spec.paras.len() != 2 {
            return Err(RfError::Config(format!(
                "{SUBSTR_NAME} takes a start index and a length, got paras {:?}",
                spec.paras
            )));
        }
        Ok(Self {
            column_index,
            start: parse_usize(SUBSTR_NAME, "start index", &spec.paras[0])?,
            length: parse_usize(SUBSTR_NAME, "length", &spec.paras[1])?,
        })
    }
}

impl Transform for SubstrTransformer {
    fn name(&self) -> &str {
        SUBSTR_NAME
    }

    fn evaluate(&self, mut record: Record, _ctx: &mut TransformContext) -> Result<Option<Record>> {
        let Some(original) = string_form(&record, self.column_index)? else {
            return Ok(Some(record));
        };

        let chars: Vec<char> = original.chars().collect();
        if self.start > chars.len() {
            return Err(TransformError::Execution(format!(
                "{SUBSTR_NAME} start index {} is beyond the value length {}",
                self.start,
                chars.len()
            ))
            .into());
        }

        let end = chars.len().min(self.start + self.length);
        let substring: String = chars[self.start..end].iter().collect();
        record.set_column(self.column_index, Column::string(substring))?;
        Ok(Some(record))
    }
}

/// Splices a replacement over `[start, start + length)` of the column's
/// string form.
#[derive(Debug)]
pub struct ReplaceTransformer {
    column_index: usize,
    start: usize,
    length: usize,
    replacement: String,
}

impl ReplaceTransformer {
    /// Binds from a column index plus three parameters: start, length and
    /// the replacement string.
    pub fn from_spec(spec: &TransformerSpec) -> Result<Self> {
        let column_index = required_column_index(spec, REPLACE_NAME)?;
        if spec.paras.len() != 3 {
            return Err(RfError::Config(format!(
                "{REPLACE_NAME} takes a start index, a length and a replacement, got paras {:?}",
                spec.paras
            )));
        }
        Ok(Self {
            column_index,
            start: parse_usize(REPLACE_NAME, "start index", &spec.paras[0])?,
            length: parse_usize(REPLACE_NAME, "length", &spec.paras[1])?,
            replacement: spec.paras[2].clone(),
        })
    }
}

impl Transform for ReplaceTransformer {
    fn name(&self) -> &str {
        REPLACE_NAME
    }

    fn evaluate(&self, mut record: Record, _ctx: &mut TransformContext) -> Result<Option<Record>> {
        let Some(original) = string_form(&record, self.column_index)? else {
            return Ok(Some(record));
        };

        let chars: Vec<char> = original.chars().collect();
        if self.start > chars.len() {
            return Err(TransformError::Execution(format!(
                "{REPLACE_NAME} start index {} is beyond the value length {}",
                self.start,
                chars.len()
            ))
            .into());
        }

        let tail = chars.len().min(self.start + self.length);
        let mut replaced: String = chars[..self.start].iter().collect();
        replaced.push_str(&self.replacement);
        replaced.extend(&chars[tail..]);
        record.set_column(self.column_index, Column::string(replaced))?;
        Ok(Some(record))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PadSide {
    Left,
    Right,
}

/// Pads the column's string form to a target length. Null fields pad from
/// the empty string; values already at or beyond the target length pass
/// through unchanged.
#[derive(Debug)]
pub struct PadTransformer {
    column_index: usize,
    side: PadSide,
    target_length: usize,
    pad: String,
}

impl PadTransformer {
    /// Binds from a column index plus three parameters: the side (`l` or
    /// `r`), the target length, and a non-empty pad string.
    pub fn from_spec(spec: &TransformerSpec) -> Result<Self> {
        let column_index = required_column_index(spec, PAD_NAME)?;
        if spec.paras.len() != 3 {
            return Err(RfError::Config(format!(
                "{PAD_NAME} takes a side, a target length and a pad string, got paras {:?}",
                spec.paras
            )));
        }

        let side = match spec.paras[0].to_lowercase().as_str() {
            "l" => PadSide::Left,
            "r" => PadSide::Right,
            other => {
                return Err(RfError::Config(format!(
                    "{PAD_NAME} side must be `l` or `r`, got `{other}`"
                )))
            }
        };

        let target_length = parse_usize(PAD_NAME, "target length", &spec.paras[1])?;
        let pad = spec.paras[2].clone();
        if pad.is_empty() {
            return Err(RfError::Config(format!(
                "the pad string of {PAD_NAME} cannot be empty"
            )));
        }

        Ok(Self {
            column_index,
            side,
            target_length,
            pad,
        })
    }
}

impl Transform for PadTransformer {
    fn name(&self) -> &str {
        PAD_NAME
    }

    fn evaluate(&self, mut record: Record, _ctx: &mut TransformContext) -> Result<Option<Record>> {
        let original = string_form(&record, self.column_index)?.unwrap_or_default();

        let current = original.chars().count();
        if current >= self.target_length {
            return Ok(Some(record));
        }

        let filler: String = self
            .pad
            .chars()
            .cycle()
            .take(self.target_length - current)
            .collect();
        let padded = match self.side {
            PadSide::Left => format!("{filler}{original}"),
            PadSide::Right => format!("{original}{filler}"),
        };
        record.set_column(self.column_index, Column::string(padded))?;
        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(column: Column) -> Record {
        Record::from_columns(vec![column])
    }

    fn apply(transform: &dyn Transform, column: Column) -> Record {
        let mut ctx = TransformContext::new();
        transform.evaluate(record(column), &mut ctx).unwrap().unwrap()
    }

    fn string_at(record: &Record, index: usize) -> String {
        record.column(index).unwrap().as_string().unwrap().unwrap()
    }

    #[test]
    fn test_substr() {
        let spec = TransformerSpec::new(SUBSTR_NAME)
            .with_column_index(0)
            .with_paras(["1", "3"]);
        let t = SubstrTransformer::from_spec(&spec).unwrap();

        let out = apply(&t, Column::string("abcdef"));
        assert_eq!(string_at(&out, 0), "bcd");

        // Length past the end clamps.
        let out = apply(&t, Column::string("ab"));
        assert_eq!(string_at(&out, 0), "b");
    }

    #[test]
    fn test_substr_null_passes_through() {
        let spec = TransformerSpec::new(SUBSTR_NAME)
            .with_column_index(0)
            .with_paras(["0", "2"]);
        let t = SubstrTransformer::from_spec(&spec).unwrap();
        let out = apply(&t, Column::String(None));
        assert_eq!(out.column(0), Some(&Column::String(None)));
    }

    #[test]
    fn test_substr_start_beyond_length_is_execution_error() {
        let spec = TransformerSpec::new(SUBSTR_NAME)
            .with_column_index(0)
            .with_paras(["5", "1"]);
        let t = SubstrTransformer::from_spec(&spec).unwrap();
        let mut ctx = TransformContext::new();
        let error = t.evaluate(record(Column::string("abc")), &mut ctx).unwrap_err();
        assert!(matches!(
            error,
            RfError::Transform(TransformError::Execution(_))
        ));
    }

    #[test]
    fn test_substr_applies_to_string_form_of_numbers() {
        let spec = TransformerSpec::new(SUBSTR_NAME)
            .with_column_index(0)
            .with_paras(["0", "2"]);
        let t = SubstrTransformer::from_spec(&spec).unwrap();
        let out = apply(&t, Column::long(12345));
        assert_eq!(out.column(0), Some(&Column::string("12")));
    }

    #[test]
    fn test_replace() {
        let spec = TransformerSpec::new(REPLACE_NAME)
            .with_column_index(0)
            .with_paras(["2", "3", "***"]);
        let t = ReplaceTransformer::from_spec(&spec).unwrap();

        let out = apply(&t, Column::string("abcdefg"));
        assert_eq!(string_at(&out, 0), "ab***fg");

        // Replacement over the tail truncates there.
        let out = apply(&t, Column::string("abcd"));
        assert_eq!(string_at(&out, 0), "ab***");
    }

    #[test]
    fn test_replace_validates_parameter_count() {
        let spec = TransformerSpec::new(REPLACE_NAME)
            .with_column_index(0)
            .with_paras(["2", "3"]);
        assert!(matches!(
            ReplaceTransformer::from_spec(&spec).unwrap_err(),
            RfError::Config(_)
        ));
    }

    #[test]
    fn test_pad_left_cycles_pad_string() {
        let spec = TransformerSpec::new(PAD_NAME)
            .with_column_index(0)
            .with_paras(["l", "7", "xy"]);
        let t = PadTransformer::from_spec(&spec).unwrap();

        let out = apply(&t, Column::string("abc"));
        assert_eq!(string_at(&out, 0), "xyxyabc");
    }

    #[test]
    fn test_pad_right_and_null_pads_from_empty() {
        let spec = TransformerSpec::new(PAD_NAME)
            .with_column_index(0)
            .with_paras(["r", "4", "-"]);
        let t = PadTransformer::from_spec(&spec).unwrap();

        let out = apply(&t, Column::string("ab"));
        assert_eq!(string_at(&out, 0), "ab--");

        let out = apply(&t, Column::String(None));
        assert_eq!(string_at(&out, 0), "----");
    }

    #[test]
    fn test_pad_long_enough_value_unchanged() {
        let spec = TransformerSpec::new(PAD_NAME)
            .with_column_index(0)
            .with_paras(["l", "3", "0"]);
        let t = PadTransformer::from_spec(&spec).unwrap();
        let out = apply(&t, Column::string("abcd"));
        assert_eq!(out.column(0), Some(&Column::string("abcd")));
    }

    #[test]
    fn test_pad_rejects_bad_side() {
        let spec = TransformerSpec::new(PAD_NAME)
            .with_column_index(0)
            .with_paras(["m", "3", "0"]);
        assert!(matches!(
            PadTransformer::from_spec(&spec).unwrap_err(),
            RfError::Config(_)
        ));
    }
}
