use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use tempfile::NamedTempFile;
use tracing::info;

use super::config::Config;
use super::error::{FileError, Result};
use super::{json, yaml};
use crate::network::Topology;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Format {
    /// Canonical `{"nodes": [...], "links": [...]}` document.
    Json,
    /// The same document in YAML.
    Yaml,
    /// Bare `[["h1", "s1"], ...]` connection list read by the launcher.
    Links,
}


impl Format {
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".links") || name.ends_with(".links.json") {
            Some(Format::Links)
        } else if name.ends_with(".json") {
            Some(Format::Json)
        } else if name.ends_with(".yaml") || name.ends_with(".yml") {
            Some(Format::Yaml)
        } else {
            None
        }
    }
    pub fn encode(self, topo: &Topology) -> Result<String> {
        match self {
            Format::Json  => json::write_topology(topo),
            Format::Yaml  => yaml::write_topology(topo),
            Format::Links => json::write_link_list(topo),
        }
    }
    pub fn decode(self, text: &str, config: &Config) -> Result<Topology> {
        match self {
            Format::Json  => json::read_topology(text, config.limits),
            Format::Yaml  => yaml::read_topology(text, config.limits),
            Format::Links => json::read_link_list(text, config.limits, &config.layout),
        }
    }
}

impl FromStr for Format {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json"         => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            "links"        => Ok(Format::Links),
            other => Err(format!("unknown format `{}`, expected json, yaml or links", other)),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Json  => f.write_str("json"),
            Format::Yaml  => f.write_str("yaml"),
            Format::Links => f.write_str("links"),
        }
    }
}

/// Reads a topology. Without an explicit format it is taken from the
/// extension, and a `.json` file holding an array is read as a link list.
pub fn load(path: impl AsRef<Path>, format: Option<Format>, config: &Config)
    -> Result<Topology, FileError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(|source| FileError::io(path, source))?;
    let format = match format {
        Some(format) => format,
        None => match Format::from_path(path) {
            Some(Format::Json) if text.trim_start().starts_with('[') => Format::Links,
            Some(format) => format,
            None => return Err(FileError::UnknownFormat(path.to_owned())),
        },
    };
    let topo = format.decode(&text, config)?;
    info!(path = %path.display(), %format, nodes = topo.node_count(),
          links = topo.link_count(), "loaded topology");
    Ok(topo)
}

/// Writes a topology through a sibling temporary file that replaces the
/// target only once fully written.
pub fn save(path: impl AsRef<Path>, topo: &Topology, format: Option<Format>)
    -> Result<(), FileError> {
    let path = path.as_ref();
    let format = format.or_else(|| Format::from_path(path))
        .ok_or_else(|| FileError::UnknownFormat(path.to_owned()))?;
    let text = format.encode(topo)?;
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)
        .map_err(|source| FileError::io(dir, source))?;
    file.write_all(text.as_bytes())
        .and_then(|_| file.as_file().sync_all())
        .map_err(|source| FileError::io(file.path(), source))?;
    file.persist(path)
        .map_err(|err| FileError::io(path, err.error))?;
    info!(path = %path.display(), %format, "saved topology");
    Ok(())
}
