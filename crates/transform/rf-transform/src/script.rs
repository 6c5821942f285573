//! The whole-row scripted transform, backed by Rhai.

use crate::config::TransformerSpec;
use crate::execution::{Transform, TransformContext};
use crate::registry::SCRIPT_NAME;
use rf_error::{Result, RfError, TransformError};
use rf_record::{Column, Record};
use rhai::{Array, Dynamic, Engine, Map, Scope, AST};
use std::path::Path;
use tracing::{debug, warn};

pub(crate) fn build(spec: &TransformerSpec) -> Result<Box<dyn Transform>> {
    Ok(Box::new(ScriptTransformer::from_spec(spec)?))
}

/// Executes a user-supplied Rhai script against each record.
///
/// The script sees two scope variables: `record`, an array of the column
/// values, and `ctx`, the shared execution context map, whose mutations
/// persist across records. Returning `()` drops the record; returning an
/// array replaces the row. The script is compiled once per job and the
/// AST reused for every record in every task.
pub struct ScriptTransformer {
    engine: Engine,
    ast: AST,
}

impl std::fmt::Debug for ScriptTransformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptTransformer").finish_non_exhaustive()
    }
}

impl ScriptTransformer {
    /// Compiles the transform from a configured entry.
    ///
    /// The body comes from `code`, or from `code_file` when no inline
    /// code is set; when both are present the inline code wins and the
    /// file is ignored with a warning. `extra_packages` entries are
    /// auxiliary script files prepended to the body, for shared helper
    /// functions.
    ///
    /// # Errors
    ///
    /// Returns a required-value error when neither source is set, a
    /// configuration error for an unreadable file, and a compilation
    /// error when the script does not parse.
    pub fn from_spec(spec: &TransformerSpec) -> Result<Self> {
        let code = match (&spec.code, &spec.code_file) {
            (Some(code), None) => code.clone(),
            (Some(code), Some(_)) => {
                warn!("Both code and code_file are set, picking code and ignoring the file");
                code.clone()
            }
            (None, Some(path)) => read_script_file(path)?,
            (None, None) => {
                return Err(RfError::RequiredValue(format!(
                    "code or code_file must be set: name={SCRIPT_NAME}"
                )))
            }
        };

        let mut body = String::new();
        for package in &spec.extra_packages {
            body.push_str(&read_script_file(package)?);
            body.push('\n');
        }
        body.push_str(&code);

        let engine = create_engine();
        let ast = engine.compile(&body).map_err(|e| {
            TransformError::Compilation(format!("{SCRIPT_NAME} failed to compile: {e}"))
        })?;

        debug!(
            bytes = body.len(),
            packages = spec.extra_packages.len(),
            "Compiled scripted transform"
        );

        Ok(Self { engine, ast })
    }
}

/// Engine with safety limits; scripts are user input.
fn create_engine() -> Engine {
    let mut engine = Engine::new();

    engine.set_max_expr_depths(64, 64);
    engine.set_max_operations(100_000);
    engine.set_max_string_size(1_000_000);
    engine.set_max_array_size(10_000);
    engine.set_max_map_size(10_000);
    engine.set_max_call_levels(16);
    engine.set_optimization_level(rhai::OptimizationLevel::Full);

    engine
}

fn read_script_file(path: &str) -> Result<String> {
    if !Path::new(path).is_file() {
        return Err(RfError::Config(format!(
            "the code file `{path}` does not exist or is not a file"
        )));
    }
    std::fs::read_to_string(path)
        .map_err(|e| RfError::Io(format!("failed to read code file `{path}`: {e}")))
}

fn column_to_dynamic(column: &Column) -> Dynamic {
    match column {
        Column::String(Some(s)) => Dynamic::from(s.clone()),
        Column::Long(Some(v)) => Dynamic::from(*v),
        Column::Double(Some(v)) => Dynamic::from(*v),
        Column::Bool(Some(b)) => Dynamic::from(*b),
        // Dates cross the script boundary as epoch milliseconds.
        Column::Date(Some(d)) => Dynamic::from(d.timestamp_millis()),
        Column::Bytes(Some(b)) => Dynamic::from_blob(b.clone()),
        _ => Dynamic::UNIT,
    }
}

fn dynamic_to_column(value: Dynamic) -> Result<Column> {
    if value.is_unit() {
        return Ok(Column::Null);
    }
    if value.is_int() {
        return Ok(Column::long(value.cast::<i64>()));
    }
    if value.is_float() {
        return Ok(Column::double(value.cast::<f64>()));
    }
    if value.is_bool() {
        return Ok(Column::boolean(value.cast::<bool>()));
    }
    if value.is_string() {
        return match value.into_string() {
            Ok(s) => Ok(Column::string(s)),
            Err(type_name) => Err(TransformError::Execution(format!(
                "script produced a value of unsupported type {type_name}"
            ))
            .into()),
        };
    }
    match value.into_blob() {
        Ok(blob) => Ok(Column::bytes(blob)),
        Err(type_name) => Err(TransformError::Execution(format!(
            "script produced a column value of unsupported type {type_name}"
        ))
        .into()),
    }
}

fn context_to_dynamic(ctx: &TransformContext) -> Result<Dynamic> {
    rhai::serde::to_dynamic(ctx).map_err(|e| {
        TransformError::Execution(format!("cannot expose execution context to the script: {e}"))
            .into()
    })
}

fn dynamic_to_context(map: Map) -> Result<TransformContext> {
    rhai::serde::from_dynamic(&Dynamic::from(map)).map_err(|e| {
        TransformError::Execution(format!("cannot read execution context back from script: {e}"))
            .into()
    })
}

impl Transform for ScriptTransformer {
    fn name(&self) -> &str {
        SCRIPT_NAME
    }

    fn evaluate(&self, record: Record, ctx: &mut TransformContext) -> Result<Option<Record>> {
        let row: Array = record.columns().iter().map(column_to_dynamic).collect();

        let mut scope = Scope::new();
        scope.push("record", row);
        scope.push_dynamic("ctx", context_to_dynamic(ctx)?);

        let result = self
            .engine
            .eval_ast_with_scope::<Dynamic>(&mut scope, &self.ast)
            .map_err(|e| TransformError::Execution(format!("script execution failed: {e}")))?;

        // Context mutations made by the script survive into later
        // records and pipeline stages.
        if let Some(map) = scope.get_value::<Map>("ctx") {
            *ctx = dynamic_to_context(map)?;
        }

        if result.is_unit() {
            return Ok(None);
        }
        if result.is_array() {
            let mut transformed = Record::new();
            for value in result.cast::<Array>() {
                transformed.add_column(dynamic_to_column(value)?);
            }
            return Ok(Some(transformed));
        }

        Err(TransformError::Execution(
            "script must return an array of column values, or () to drop the record".to_string(),
        )
        .into())
    }
}
