//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::OutputMode;
use crate::AppError;
use crate::document::{Format, parse_model, render_model};
use autodeps_core::{Entry, Model, ModelPath, Sorter, Warning};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum model document size (100 MB).
///
/// This prevents memory exhaustion from malicious or accidental large files.
const MAX_MODEL_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), AppError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| AppError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(AppError::IoError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Validate an input path.
///
/// Canonicalizes the path (resolving symlinks and "..") and ensures it
/// names an existing regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, AppError> {
    let canonical = path.canonicalize().map_err(|e| {
        AppError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(AppError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Validate an output path: its parent directory must exist.
fn validate_output_path(path: &Path) -> Result<PathBuf, AppError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        AppError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(AppError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| AppError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

// =============================================================================
// LOADING
// =============================================================================

/// Read and parse a model document.
pub fn load_model(file: &Path, format: Option<&str>) -> Result<Model, AppError> {
    let format = Format::resolve(format, file)?;
    tracing::info!("Loading model from {:?} (format: {})", file, format);

    let validated_path = validate_file_path(file)?;
    validate_file_size(&validated_path, MAX_MODEL_FILE_SIZE)?;

    let contents = std::fs::read(&validated_path)
        .map_err(|e| AppError::IoError(format!("Read file: {}", e)))?;

    let model = parse_model(&contents, format)?;
    tracing::debug!(
        "Loaded model {}({}) with {} entries",
        model.name,
        model.id,
        model.flattened_len()
    );
    Ok(model)
}

fn log_warnings(warnings: &[Warning]) {
    for warning in warnings {
        tracing::warn!("{}", warning);
    }
}

/// Every annotation in the model tree as `(owning model path, entry, deps)`.
fn collect_annotations(model: &Model, path: &ModelPath, out: &mut Vec<(String, String, String)>) {
    for (entry, deps) in &model.depends_on {
        out.push((path.to_string(), entry.clone(), deps.to_string()));
    }
    for (key, entry) in &model.entries {
        if let Entry::Model(nested) = entry {
            collect_annotations(nested, &path.child(key), out);
        }
    }
}

// =============================================================================
// ANALYZE COMMAND
// =============================================================================

/// Annotate a model and print or write the result.
pub fn cmd_analyze(
    mode: OutputMode,
    file: &Path,
    format: Option<&str>,
    output: Option<&Path>,
) -> Result<(), AppError> {
    let mut model = load_model(file, format)?;
    let report = Sorter::sort(&mut model)?;
    log_warnings(&report.warnings);
    tracing::info!(
        "Annotated {} entries of model {}({})",
        report.annotated,
        model.name,
        model.id
    );

    let written = match output {
        Some(output) => {
            let validated_output = validate_output_path(output)?;
            let rendered = render_model(&model)?;
            std::fs::write(&validated_output, rendered.as_bytes())
                .map_err(|e| AppError::IoError(format!("Write file: {}", e)))?;
            Some(validated_output)
        }
        None => None,
    };

    if mode.json {
        let mut out = serde_json::json!({
            "name": model.name,
            "id": model.id,
            "order": report.order,
            "annotated": report.annotated,
            "warnings": report.warnings,
        });
        match &written {
            Some(path) => out["output"] = serde_json::json!(path.to_string_lossy()),
            None => out["model"] = serde_json::to_value(&model)?,
        }
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if !mode.quiet {
        println!("Model {} ({})", model.name, model.id);
        println!("Annotated {} entries", report.annotated);
        if !report.warnings.is_empty() {
            println!("Warnings: {}", report.warnings.len());
        }
        if let Some(path) = &written {
            println!("Wrote annotated model to {:?}", path);
        }
    }

    if mode.verbose {
        println!();
        println!("Order: {}", report.order.join(", "));
    }

    if written.is_none() || mode.verbose {
        let mut annotations = Vec::new();
        collect_annotations(&model, &ModelPath::root(), &mut annotations);
        println!();
        for (path, entry, deps) in annotations {
            println!("  {}  {} -> {}", path, entry, deps);
        }
    }

    Ok(())
}

// =============================================================================
// ORDER COMMAND
// =============================================================================

/// Print the evaluation order.
pub fn cmd_order(mode: OutputMode, file: &Path, format: Option<&str>) -> Result<(), AppError> {
    let model = load_model(file, format)?;
    let schedule = Sorter::schedule(&model)?;
    log_warnings(&schedule.warnings);

    if mode.json {
        let output = serde_json::json!({
            "name": model.name,
            "order": schedule.order,
            "entries": schedule.entries,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if !mode.quiet {
        println!(
            "Evaluation order of {} ({} vertices)",
            model.name,
            schedule.order.len()
        );
    }
    let entries: BTreeSet<&str> = schedule.entries.iter().map(String::as_str).collect();
    for (position, vertex) in schedule.order.iter().enumerate() {
        if entries.contains(vertex.as_str()) {
            println!("{:>4}. {}", position + 1, vertex);
        } else if mode.verbose {
            println!("{:>4}. {} (result)", position + 1, vertex);
        }
    }

    Ok(())
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// Validate a model without writing anything.
pub fn cmd_check(mode: OutputMode, file: &Path, format: Option<&str>) -> Result<(), AppError> {
    let model = load_model(file, format)?;
    let mut scratch = model.clone();

    match Sorter::sort(&mut scratch) {
        Ok(report) => {
            log_warnings(&report.warnings);
            if mode.json {
                let output = serde_json::json!({
                    "valid": true,
                    "name": model.name,
                    "vertices": report.order.len(),
                    "annotated": report.annotated,
                    "warnings": report.warnings,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else if !mode.quiet {
                println!(
                    "OK: {} ({}) - {} vertices, {} annotated entries, {} warnings",
                    model.name,
                    model.id,
                    report.order.len(),
                    report.annotated,
                    report.warnings.len()
                );
            }
            Ok(())
        }
        Err(e) => {
            if mode.json {
                let output = serde_json::json!({
                    "valid": false,
                    "name": model.name,
                    "error": e.message(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            Err(e.into())
        }
    }
}

// =============================================================================
// GRAPH COMMAND
// =============================================================================

/// Print the dependency graph.
pub fn cmd_graph(mode: OutputMode, file: &Path, format: Option<&str>) -> Result<(), AppError> {
    let model = load_model(file, format)?;
    let graph = Sorter::graph(&model)?;

    if mode.json {
        let edges: Vec<serde_json::Value> = graph
            .edges()
            .map(|(from, to)| serde_json::json!({ "from": from, "to": to }))
            .collect();
        let output = serde_json::json!({
            "name": model.name,
            "vertices": graph.vertices().collect::<Vec<_>>(),
            "edges": edges,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if !mode.quiet {
        println!("Dependency graph of {} ({})", model.name, model.id);
        println!("Vertices: {}", graph.vertex_count());
        println!("Edges:    {}", graph.edge_count());
        println!();
    }
    for (from, to) in graph.edges() {
        println!("  {} -> {}", from, to);
    }

    Ok(())
}
