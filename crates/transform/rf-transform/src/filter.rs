//! The built-in comparison/filter operator.

use crate::config::TransformerSpec;
use crate::execution::{Transform, TransformContext};
use crate::registry::FILTER_NAME;
use regex::Regex;
use rf_error::{RecordError, Result, RfError, TransformError};
use rf_record::{Column, ColumnKind, Record};

pub(crate) fn build(spec: &TransformerSpec) -> Result<Box<dyn Transform>> {
    Ok(Box::new(FilterTransformer::from_spec(spec)?))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterOp {
    Like,
    NotLike,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
    Equal,
    NotEqual,
}

impl FilterOp {
    fn parse(code: &str) -> Option<Self> {
        match code {
            "like" => Some(FilterOp::Like),
            "not like" => Some(FilterOp::NotLike),
            ">" => Some(FilterOp::Greater),
            ">=" => Some(FilterOp::GreaterOrEqual),
            "<" => Some(FilterOp::Less),
            "<=" => Some(FilterOp::LessOrEqual),
            "=" | "==" => Some(FilterOp::Equal),
            "!=" => Some(FilterOp::NotEqual),
            _ => None,
        }
    }
}

/// Drops records whose target column satisfies the configured comparison.
///
/// The operator code and comparison value bind at build time; per record,
/// the filter only decides keep or drop and never mutates the record.
///
/// Null raw data is a distinguished case on every path:
/// - `>`/`>=`: a null field is minus infinity, the record is always kept
/// - `<`/`<=`: a null field is plus infinity, the record is always kept
/// - `=`/`==`: a null field drops only against the literal `"null"`
/// - `!=`: a null field is kept only against the literal `"null"`
/// - `like`/`not like`: a null string form never matches the pattern
#[derive(Debug)]
pub struct FilterTransformer {
    column_index: usize,
    op: FilterOp,
    value: String,
    /// Full-match pattern, compiled for the `like` operators only.
    pattern: Option<Regex>,
}

impl FilterTransformer {
    /// Binds the filter from a configured entry: a column index plus
    /// exactly two parameters, the operator code and a non-empty
    /// comparison value.
    pub fn from_spec(spec: &TransformerSpec) -> Result<Self> {
        let column_index = spec.column_index.ok_or_else(|| {
            RfError::RequiredValue(format!("columnIndex must be set: name={FILTER_NAME}"))
        })?;

        if spec.paras.len() != 2 {
            return Err(RfError::Config(format!(
                "{FILTER_NAME} takes an operator and a comparison value, got paras {:?}",
                spec.paras
            )));
        }

        let code = spec.paras[0].to_lowercase();
        let value = spec.paras[1].clone();
        if value.is_empty() {
            return Err(RfError::Config(format!(
                "the comparison value of {FILTER_NAME} cannot be empty"
            )));
        }

        let op = FilterOp::parse(&code).ok_or_else(|| {
            RfError::Config(format!("{FILTER_NAME} operator `{code}` is unsupported"))
        })?;

        let pattern = match op {
            FilterOp::Like | FilterOp::NotLike => Some(
                // Full-match semantics, not substring.
                Regex::new(&format!("^(?:{value})$")).map_err(|e| {
                    RfError::Config(format!("{FILTER_NAME} pattern `{value}` is invalid: {e}"))
                })?,
            ),
            _ => None,
        };

        Ok(Self {
            column_index,
            op,
            value,
            pattern,
        })
    }

    /// Decides whether the record is kept.
    fn keeps(&self, column: &Column) -> Result<bool> {
        match self.op {
            FilterOp::Like => Ok(!self.matches_pattern(column)?),
            FilterOp::NotLike => Ok(self.matches_pattern(column)?),
            FilterOp::Greater => self.keeps_ordered(column, false, false),
            FilterOp::GreaterOrEqual => self.keeps_ordered(column, false, true),
            FilterOp::Less => self.keeps_ordered(column, true, false),
            FilterOp::LessOrEqual => self.keeps_ordered(column, true, true),
            FilterOp::Equal => self.keeps_equal(column, true),
            FilterOp::NotEqual => self.keeps_equal(column, false),
        }
    }

    fn matches_pattern(&self, column: &Column) -> Result<bool> {
        let Some(pattern) = &self.pattern else {
            return Err(TransformError::Execution(
                "like operator without a compiled pattern".to_string(),
            )
            .into());
        };
        match column.as_string()? {
            Some(original) => Ok(pattern.is_match(&original)),
            None => Ok(false),
        }
    }

    /// `>`/`>=`/`<`/`<=`. A null field never participates in ordering and
    /// is always kept.
    fn keeps_ordered(&self, column: &Column, less: bool, or_equal: bool) -> Result<bool> {
        if column.is_null() {
            return Ok(true);
        }

        let ordering = match column.kind() {
            ColumnKind::Double => {
                let ori = self.require(column.as_double()?)?;
                let val: f64 = self.value.parse().map_err(|_| {
                    TransformError::Execution(format!(
                        "cannot parse `{}` as a double comparison value",
                        self.value
                    ))
                })?;
                ori.partial_cmp(&val)
            }
            ColumnKind::Long | ColumnKind::Date => {
                let ori = self.require(column.as_long()?)?;
                let val: i64 = self.value.parse().map_err(|_| {
                    TransformError::Execution(format!(
                        "cannot parse `{}` as a long comparison value",
                        self.value
                    ))
                })?;
                Some(ori.cmp(&val))
            }
            ColumnKind::String | ColumnKind::Bytes | ColumnKind::Bool => {
                let ori = self.require(column.as_string()?)?;
                Some(ori.as_str().cmp(self.value.as_str()))
            }
            kind => return Err(self.unsupported(kind)),
        };

        let satisfied = match ordering {
            Some(std::cmp::Ordering::Equal) => or_equal,
            Some(std::cmp::Ordering::Less) => less,
            Some(std::cmp::Ordering::Greater) => !less,
            // NaN comparisons never satisfy the operator.
            None => false,
        };
        Ok(!satisfied)
    }

    /// `=`/`==` drops when equal; `!=` drops when not equal. Dates compare
    /// by their epoch value, strings, bytes and bools by their string
    /// form.
    fn keeps_equal(&self, column: &Column, drop_on_equal: bool) -> Result<bool> {
        if column.is_null() {
            let literal_is_null = self.value.eq_ignore_ascii_case("null");
            return Ok(if drop_on_equal {
                !literal_is_null
            } else {
                literal_is_null
            });
        }

        let equal = match column.kind() {
            ColumnKind::Double => {
                let ori = self.require(column.as_double()?)?;
                let val: f64 = self.value.parse().map_err(|_| {
                    TransformError::Execution(format!(
                        "cannot parse `{}` as a double comparison value",
                        self.value
                    ))
                })?;
                ori == val
            }
            ColumnKind::Long | ColumnKind::Date => {
                let ori = self.require(column.as_long()?)?;
                let val: i64 = self.value.parse().map_err(|_| {
                    TransformError::Execution(format!(
                        "cannot parse `{}` as a long comparison value",
                        self.value
                    ))
                })?;
                ori == val
            }
            ColumnKind::String | ColumnKind::Bytes | ColumnKind::Bool => {
                let ori = self.require(column.as_string()?)?;
                ori == self.value
            }
            kind => return Err(self.unsupported(kind)),
        };

        Ok(if drop_on_equal { !equal } else { equal })
    }

    /// Accessors return `None` only for null raw data, which every caller
    /// has already ruled out.
    fn require<T>(&self, value: Option<T>) -> Result<T> {
        value.ok_or_else(|| {
            TransformError::Execution("null column reached a comparison path".to_string()).into()
        })
    }

    fn unsupported(&self, kind: ColumnKind) -> RfError {
        TransformError::Execution(format!(
            "{FILTER_NAME} operators do not support column type {kind}"
        ))
        .into()
    }
}

impl Transform for FilterTransformer {
    fn name(&self) -> &str {
        FILTER_NAME
    }

    fn evaluate(&self, record: Record, _ctx: &mut TransformContext) -> Result<Option<Record>> {
        let keep = {
            let column =
                record
                    .column(self.column_index)
                    .ok_or(RecordError::ColumnOutOfBounds {
                        index: self.column_index,
                        len: record.column_count(),
                    })?;
            self.keeps(column)?
        };
        Ok(if keep { Some(record) } else { None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn filter(op: &str, value: &str) -> FilterTransformer {
        let spec = TransformerSpec::new(FILTER_NAME)
            .with_column_index(0)
            .with_paras([op, value]);
        FilterTransformer::from_spec(&spec).unwrap()
    }

    fn record(column: Column) -> Record {
        Record::from_columns(vec![column])
    }

    fn kept(f: &FilterTransformer, column: Column) -> bool {
        let mut ctx = TransformContext::new();
        f.evaluate(record(column), &mut ctx).unwrap().is_some()
    }

    #[test]
    fn test_parameter_validation() {
        let missing_index = TransformerSpec::new(FILTER_NAME).with_paras([">=", "10"]);
        assert!(matches!(
            FilterTransformer::from_spec(&missing_index).unwrap_err(),
            RfError::RequiredValue(_)
        ));

        let short = TransformerSpec::new(FILTER_NAME)
            .with_column_index(0)
            .with_paras([">="]);
        assert!(matches!(
            FilterTransformer::from_spec(&short).unwrap_err(),
            RfError::Config(_)
        ));

        let empty_value = TransformerSpec::new(FILTER_NAME)
            .with_column_index(0)
            .with_paras([">=", ""]);
        assert!(matches!(
            FilterTransformer::from_spec(&empty_value).unwrap_err(),
            RfError::Config(_)
        ));

        let bad_op = TransformerSpec::new(FILTER_NAME)
            .with_column_index(0)
            .with_paras(["<>", "10"]);
        assert!(matches!(
            FilterTransformer::from_spec(&bad_op).unwrap_err(),
            RfError::Config(_)
        ));
    }

    #[test]
    fn test_greater_or_equal_long() {
        let f = filter(">=", "10");
        assert!(!kept(&f, Column::long(10)));
        assert!(!kept(&f, Column::long(11)));
        assert!(kept(&f, Column::long(9)));
    }

    #[test]
    fn test_null_kept_for_every_ordering_operator() {
        for op in [">", ">=", "<", "<="] {
            let f = filter(op, "10");
            assert!(kept(&f, Column::Long(None)), "operator {op}");
            assert!(kept(&f, Column::Null), "operator {op}");
        }
    }

    #[test]
    fn test_less_double() {
        let f = filter("<", "2.5");
        assert!(!kept(&f, Column::double(2.0)));
        assert!(kept(&f, Column::double(2.5)));
        assert!(kept(&f, Column::double(3.0)));
    }

    #[test]
    fn test_ordering_on_string_form() {
        let f = filter(">", "banana");
        assert!(!kept(&f, Column::string("cherry")));
        assert!(kept(&f, Column::string("apple")));
        assert!(kept(&f, Column::string("banana")));
    }

    #[test]
    fn test_date_compares_by_epoch_value() {
        let f = filter(">=", "1700000000000");
        let at = |ms| Column::date(DateTime::from_timestamp_millis(ms).unwrap());
        assert!(!kept(&f, at(1_700_000_000_000)));
        assert!(kept(&f, at(1_699_999_999_999)));
    }

    #[test]
    fn test_equal_drops_on_equal() {
        let f = filter("==", "7");
        assert!(!kept(&f, Column::long(7)));
        assert!(kept(&f, Column::long(8)));

        let f = filter("=", "abc");
        assert!(!kept(&f, Column::string("abc")));
        assert!(kept(&f, Column::string("abd")));
    }

    #[test]
    fn test_equal_against_null_literal() {
        let f = filter("==", "null");
        assert!(!kept(&f, Column::String(None)));
        assert!(kept(&f, Column::string("abc")));

        let f = filter("==", "NULL");
        assert!(!kept(&f, Column::String(None)));

        let f = filter("==", "7");
        assert!(kept(&f, Column::Long(None)));
    }

    #[test]
    fn test_not_equal() {
        let f = filter("!=", "7");
        assert!(!kept(&f, Column::long(8)));
        assert!(kept(&f, Column::long(7)));
    }

    #[test]
    fn test_not_equal_against_null_literal() {
        let f = filter("!=", "null");
        assert!(kept(&f, Column::Double(None)));
        assert!(!kept(&f, Column::double(1.0)));

        let f = filter("!=", "x");
        assert!(!kept(&f, Column::Double(None)));
    }

    #[test]
    fn test_like_full_match() {
        let f = filter("like", "ab.*");
        assert!(!kept(&f, Column::string("abcdef")));
        assert!(kept(&f, Column::string("xxabc")));
        assert!(kept(&f, Column::String(None)));
    }

    #[test]
    fn test_not_like() {
        let f = filter("not like", "ab.*");
        assert!(kept(&f, Column::string("abcdef")));
        assert!(!kept(&f, Column::string("xxabc")));
        assert!(!kept(&f, Column::String(None)));
    }

    #[test]
    fn test_unparsable_comparison_value_is_execution_error() {
        let f = filter(">=", "ten");
        let mut ctx = TransformContext::new();
        let error = f.evaluate(record(Column::long(1)), &mut ctx).unwrap_err();
        assert!(matches!(
            error,
            RfError::Transform(TransformError::Execution(_))
        ));
    }

    #[test]
    fn test_column_index_out_of_bounds() {
        let spec = TransformerSpec::new(FILTER_NAME)
            .with_column_index(5)
            .with_paras(["==", "1"]);
        let f = FilterTransformer::from_spec(&spec).unwrap();
        let mut ctx = TransformContext::new();
        let error = f.evaluate(record(Column::long(1)), &mut ctx).unwrap_err();
        assert!(matches!(error, RfError::Record(_)));
    }

    #[test]
    fn test_filter_never_mutates_the_record() {
        let f = filter(">=", "10");
        let original = record(Column::long(9));
        let mut ctx = TransformContext::new();
        let kept = f.evaluate(original.clone(), &mut ctx).unwrap().unwrap();
        assert_eq!(kept, original);
    }
}
