//! Source generation for schema files

use crate::load;
use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use wiregen_codegen::{Backend, Capabilities, PlanOptions, SchemaPlan, backend_for, write_files};
use wiregen_core::CompileConfig;

/// Run the generate command.
///
/// `langs` overrides the configured backends, `output` the configured
/// output directory.
pub fn run(
    schemas: &[PathBuf],
    config: &CompileConfig,
    langs: &[String],
    output: Option<PathBuf>,
) -> Result<()> {
    let output = output_dir(config, output);
    let written = generate(schemas, config, langs, &output)?;

    println!(
        "✓ Generated {} file(s) from {} schema(s) into {}",
        written.len(),
        schemas.len(),
        output.display()
    );
    for path in &written {
        println!("  {}", path.display());
    }

    Ok(())
}

/// Compile every schema with every selected backend and write the results.
///
/// Each schema file is resolved and planned on its own. Backends are
/// looked up before any schema is read so a misspelled name fails fast.
pub fn generate(
    schemas: &[PathBuf],
    config: &CompileConfig,
    langs: &[String],
    output: &Path,
) -> Result<Vec<PathBuf>> {
    let backends = select_backends(config, langs)?;
    let caps = Capabilities::from_config(config);
    let options = PlanOptions::from(config);

    let mut written = Vec::new();
    for path in schemas {
        let schema = load::schema(path)?;
        let plan = SchemaPlan::build(Arc::clone(&schema), options);

        if plan.messages().next().is_none() {
            warn!(path = %path.display(), "schema declares no messages");
        }

        for backend in &backends {
            let files = backend
                .render(&plan, &caps)
                .with_context(|| format!("{} backend failed on {}", backend.name(), path.display()))?;
            let paths = write_files(&files, output)
                .with_context(|| format!("Failed to write {} output", backend.name()))?;
            info!(
                schema = %path.display(),
                backend = backend.name(),
                files = paths.len(),
                "generated"
            );
            written.extend(paths);
        }
    }

    Ok(written)
}

fn select_backends(config: &CompileConfig, langs: &[String]) -> Result<Vec<Box<dyn Backend>>> {
    let names = if langs.is_empty() {
        config.backends.as_slice()
    } else {
        langs
    };
    if names.is_empty() {
        bail!("No backends selected; pass --lang or set `backends` in the config");
    }
    names
        .iter()
        .map(|name| backend_for(name).with_context(|| format!("Invalid backend '{name}'")))
        .collect()
}

fn output_dir(config: &CompileConfig, output: Option<PathBuf>) -> PathBuf {
    output
        .or_else(|| config.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."))
}
