use std::path::{Path, PathBuf};

use anyhow::Context;
use dance_config::prelude::{load_suite, ConfigError, Suite};

/// Suites found in a projects directory, and the ones that failed to load.
#[derive(Debug, Default)]
pub struct Projects {
    pub suites: Vec<Suite>,
    pub errors: Vec<(String, ConfigError)>,
}

/// Load every `*.yml` and `*.yaml` document in `dir`, sorted by suite name.
///
/// The file stem is the suite name. If `filter` is not empty only the named suites are loaded,
/// and naming a suite that does not exist is an error. A document that fails to load is recorded
/// against its suite and does not stop the others from loading.
pub fn load_projects(dir: &Path, filter: &[String]) -> anyhow::Result<Projects> {
    let mut files = project_files(dir)?;

    if !filter.is_empty() {
        if let Some(unknown) = filter.iter().find(|f| !files.iter().any(|(n, _)| n == *f)) {
            anyhow::bail!("No project named '{unknown}' in {}", dir.display());
        }
        files.retain(|(name, _)| filter.contains(name));
    }

    let mut projects = Projects::default();
    for (name, path) in files {
        let loaded = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::MalformedDocument {
                reason: format!("failed to read {}: {e}", path.display()),
            })
            .and_then(|text| load_suite(&name, &text));

        match loaded {
            Ok(suite) => projects.suites.push(suite),
            Err(e) => {
                log::error!("Failed to load project {name}: {e}");
                projects.errors.push((name, e));
            }
        }
    }

    log::info!(
        "Loaded {} suite(s) from {}, {} failed",
        projects.suites.len(),
        dir.display(),
        projects.errors.len()
    );

    Ok(projects)
}

fn project_files(dir: &Path) -> anyhow::Result<Vec<(String, PathBuf)>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read projects directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to list projects directory {}", dir.display()))?
            .path();

        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == "yml" || e == "yaml");
        if !is_yaml || !path.is_file() {
            continue;
        }

        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            log::warn!("Skipping project with a non UTF-8 name: {}", path.display());
            continue;
        };
        files.push((name.to_string(), path.clone()));
    }

    files.sort();
    Ok(files)
}
