//! Whole-document commands: status, export, import, validate

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::Utc;

use super::output::Output;
use super::session::Session;
use crate::domain::{schema, DocumentStore};

pub async fn status(output: &Output) -> Result<()> {
    let session = Session::open(output).await?;
    let (pages, nav_nodes, blocks, dangling) = session.read(|store| {
        let doc = store.document();
        let dangling: Vec<String> = doc.dangling_slugs().into_iter().map(String::from).collect();
        (doc.pages.len(), doc.nav_count(), doc.block_count(), dangling)
    })?;
    let status = session.status();
    let backend = session.backend_label();
    let config = &session.project().config().project;

    if output.is_json() {
        output.data(&serde_json::json!({
            "root": session.project().root().display().to_string(),
            "backend": config.storage.backend.as_str(),
            "location": backend,
            "debounce_ms": config.autosave.debounce_ms,
            "pages": pages,
            "navigation_nodes": nav_nodes,
            "blocks": blocks,
            "dangling_slugs": dangling,
            "sync": status,
        }));
    } else {
        println!("Wiki: {}", session.project().root().display());
        println!("Backend: {}", backend);
        println!("Autosave: {} ms", config.autosave.debounce_ms);
        println!();
        println!("Pages: {}", pages);
        println!("Navigation nodes: {}", nav_nodes);
        println!("Blocks: {}", blocks);

        if !dangling.is_empty() {
            println!();
            println!("Navigation entries without a page:");
            for slug in &dangling {
                println!("  {}", slug);
            }
        }
    }

    session.close().await
}

pub async fn export(output: &Output, target: Option<&Path>) -> Result<()> {
    let session = Session::open(output).await?;
    let bytes = session
        .read(|store| store.export_json())?
        .context("Failed to serialize wiki")?;

    match target {
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.write_all(b"\n")?;
        }
        Some(path) => {
            let path = if path.is_dir() {
                path.join(DocumentStore::export_file_name(Utc::now().date_naive()))
            } else {
                path.to_path_buf()
            };
            fs::write(&path, &bytes)
                .with_context(|| format!("Failed to write export: {}", path.display()))?;
            output.success(&format!("Exported wiki to {}", path.display()));
        }
    }

    session.close().await
}

pub async fn import(output: &Output, file: &Path) -> Result<()> {
    let bytes =
        fs::read(file).with_context(|| format!("Failed to read import: {}", file.display()))?;

    let session = Session::open(output).await?;
    session
        .edit(|store| store.import_json(&bytes))?
        .with_context(|| format!("Failed to import {}", file.display()))?;
    session.close().await?;

    output.success(&format!("Imported wiki from {}", file.display()));
    Ok(())
}

pub fn validate(output: &Output, file: &Path) -> Result<()> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let raw: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", file.display()))?;

    let document = match schema::validate(&raw) {
        Ok(document) => document,
        Err(e) => bail!("{} is invalid: {}", file.display(), e),
    };

    if output.is_json() {
        output.data(&serde_json::json!({
            "valid": true,
            "pages": document.pages.len(),
            "navigation_nodes": document.nav_count(),
            "blocks": document.block_count(),
        }));
    } else {
        output.success(&format!(
            "{} is valid: {} pages, {} navigation nodes, {} blocks",
            file.display(),
            document.pages.len(),
            document.nav_count(),
            document.block_count()
        ));
    }

    Ok(())
}
