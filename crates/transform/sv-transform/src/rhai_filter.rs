//! RhaiFilter - the scripted record filter.

use crate::builtin::register_builtin_functions;
use crate::config::FilterConfig;
use rhai::{AST, Dynamic, Engine, Scope};
use serde_json::Value;
use std::path::Path;
use sv_error::{Result, SvError};
use sv_traits::RecordFilter;
use tracing::debug;

/// Record filter that evaluates a Rhai script against each record.
///
/// The script sees the parsed record as `record`. Its final value becomes
/// the output record; `()` drops the record. A script error fails only the
/// record being evaluated.
pub struct RhaiFilter {
    /// Pre-compiled script.
    ast: AST,

    engine: Engine,

    name: String,
}

impl std::fmt::Debug for RhaiFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RhaiFilter")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl RhaiFilter {
    /// Compiles the inline script in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SvError::Config`] if no inline script is set or the script
    /// does not compile.
    pub fn new(config: &FilterConfig) -> Result<Self> {
        let script = config
            .script
            .as_deref()
            .ok_or_else(|| SvError::Config("No filter script provided".to_string()))?;

        Self::compile(script)
    }

    /// Loads and compiles the script named by `config.script_file`, or the
    /// inline script if no file is set.
    pub async fn from_config(config: &FilterConfig) -> Result<Self> {
        config.validate().map_err(SvError::Config)?;

        match &config.script_file {
            Some(path) => Self::from_file(path).await,
            None => Self::new(config),
        }
    }

    /// Loads and compiles a script from a local file.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let script = tokio::fs::read_to_string(path).await.map_err(|e| {
            SvError::Config(format!(
                "Failed to read filter script {}: {e}",
                path.display()
            ))
        })?;

        debug!(path = %path.display(), "Loaded filter script");
        Ok(Self::compile(&script)?.with_name(path.display().to_string()))
    }

    fn compile(script: &str) -> Result<Self> {
        let mut engine = Self::create_engine();
        register_builtin_functions(&mut engine);

        let ast = engine
            .compile(script)
            .map_err(|e| SvError::Config(format!("Filter script compilation failed: {e}")))?;

        Ok(Self {
            ast,
            engine,
            name: "rhai".to_string(),
        })
    }

    /// Creates a Rhai engine with safety limits.
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

    /// Sets the filter name used in logs.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl RecordFilter for RhaiFilter {
    fn apply(&self, record: Value) -> Result<Option<Value>> {
        let record = rhai::serde::to_dynamic(record)
            .map_err(|e| anyhow::anyhow!("Record cannot be passed to script: {e}"))?;

        let mut scope = Scope::new();
        scope.push("record", record);

        let result: Dynamic = self
            .engine
            .eval_ast_with_scope(&mut scope, &self.ast)
            .map_err(|e| anyhow::anyhow!("Script execution failed: {e}"))?;

        if result.is_unit() {
            return Ok(None);
        }

        let value = rhai::serde::from_dynamic::<Value>(&result)
            .map_err(|e| anyhow::anyhow!("Script result is not JSON-compatible: {e}"))?;

        Ok(Some(value))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
