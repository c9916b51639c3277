//! Filesystem-backed variable file loading.

use crate::loader::VarsLoader;
use crate::vars::{shape_of, Vars};
use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use walkdir::WalkDir;

/// Extensions probed for entity-named files, in probe order. The empty
/// extension comes first so a directory named after the entity is found
/// before same-named files.
const DEFAULT_EXTENSIONS: &[&str] = &["", ".yml", ".yaml", ".json"];

/// Loads variable files from disk.
///
/// Discovery probes `dir/<name><ext>` for every configured extension, in
/// order, and expands an entity-named directory into its files recursively,
/// each directory level sorted by file name. Every probe that matches is
/// returned, so `web01.yml` and `web01.yaml` side by side yield two files.
///
/// Parsing dispatches on the file extension (`.json` and `.toml` get their
/// own parsers, everything else is treated as YAML) and normalizes into
/// generic JSON values. Parsed files are memoized per loader, so a file
/// shared by many entities is read and parsed once.
pub struct FileVarsLoader {
    extensions: Vec<String>,
    allow_dir: bool,
    parsed: Mutex<HashMap<PathBuf, Vars>>,
}

impl FileVarsLoader {
    /// Loader with the default extension list and directory expansion on.
    pub fn new() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            allow_dir: true,
            parsed: Mutex::new(HashMap::new()),
        }
    }

    /// Set the probed extension list. An empty entry probes the bare entity
    /// name; other entries may be given with or without the leading dot.
    pub fn extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    /// Set whether a directory named after the entity is expanded into its
    /// files (default) or skipped.
    pub fn allow_dir(mut self, allow: bool) -> Self {
        self.allow_dir = allow;
        self
    }

    /// All variable files inside an entity-named directory, depth-first with
    /// each level sorted by file name.
    fn dir_vars_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let walker = WalkDir::new(dir)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(keep_dir_entry);

        let mut found = Vec::new();
        for entry in walker {
            let entry =
                entry.with_context(|| format!("walking vars directory {}", dir.display()))?;
            if entry.file_type().is_file() && self.matches_extension(entry.path()) {
                found.push(entry.into_path());
            }
        }
        Ok(found)
    }

    /// Whether a file found inside an entity-named directory is a variable
    /// file. Extensionless files always qualify.
    fn matches_extension(&self, path: &Path) -> bool {
        match path.extension().and_then(|e| e.to_str()) {
            None => true,
            Some(ext) => {
                self.extensions.iter().any(|configured| configured.trim_start_matches('.') == ext)
            }
        }
    }

    fn parse(path: &Path, content: &str) -> Result<Vars> {
        // An empty vars file defines nothing.
        if content.trim().is_empty() {
            return Ok(Vars::new());
        }

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
        let value: Value = match ext.as_str() {
            "json" => serde_json::from_str(content)
                .with_context(|| format!("invalid JSON in {}", path.display()))?,
            "toml" => {
                let raw: toml::Value = toml::from_str(content)
                    .with_context(|| format!("invalid TOML in {}", path.display()))?;
                serde_json::to_value(raw)
                    .with_context(|| format!("unsupported TOML value in {}", path.display()))?
            }
            _ => {
                let raw: serde_yaml::Value = serde_yaml::from_str(content)
                    .with_context(|| format!("invalid YAML in {}", path.display()))?;
                serde_json::to_value(raw)
                    .with_context(|| format!("unsupported YAML value in {}", path.display()))?
            }
        };

        match value {
            Value::Object(vars) => Ok(vars),
            // A file holding only comments or an explicit null defines
            // nothing, same as an empty file.
            Value::Null => Ok(Vars::new()),
            other => bail!(
                "vars file {} must contain a mapping, got {}",
                path.display(),
                shape_of(&other)
            ),
        }
    }
}

impl Default for FileVarsLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl VarsLoader for FileVarsLoader {
    fn find_vars_files(&self, dir: &Path, name: &str) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        for ext in &self.extensions {
            let candidate = candidate_path(dir, name, ext);
            if !candidate.exists() {
                continue;
            }
            if candidate.is_dir() {
                if self.allow_dir {
                    found.extend(self.dir_vars_files(&candidate)?);
                }
            } else {
                found.push(candidate);
            }
        }
        Ok(found)
    }

    fn load_from_file(&self, path: &Path) -> Result<Vars> {
        {
            let parsed = self.parsed.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(vars) = parsed.get(path) {
                return Ok(vars.clone());
            }
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("failed reading vars file {}", path.display()))?;
        let vars = Self::parse(path, &content)?;

        let mut parsed = self.parsed.lock().unwrap_or_else(PoisonError::into_inner);
        parsed.insert(path.to_path_buf(), vars.clone());
        Ok(vars)
    }
}

/// The probe path for one extension: `dir/<name><ext>`, inserting the dot
/// when the configured extension lacks one.
fn candidate_path(dir: &Path, name: &str, ext: &str) -> PathBuf {
    if ext.is_empty() {
        return dir.join(name);
    }
    if ext.starts_with('.') {
        dir.join(format!("{name}{ext}"))
    } else {
        dir.join(format!("{name}.{ext}"))
    }
}

/// Traversal filter for entity-named directories: hidden entries and editor
/// backups are pruned, and only extension-less directories are descended
/// into (a `conf.d`-style name is data for some other tool, not a vars
/// source).
fn keep_dir_entry(entry: &walkdir::DirEntry) -> bool {
    if entry.depth() == 0 {
        return true;
    }
    let name = entry.file_name().to_string_lossy();
    if name.starts_with('.') || name.ends_with('~') {
        return false;
    }
    !(entry.file_type().is_dir() && entry.path().extension().is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| p.file_name().and_then(|n| n.to_str()).unwrap_or("").to_string())
            .collect()
    }

    #[test]
    fn probes_extensions_in_order_and_keeps_every_match() {
        let tmp = TempDir::new().expect("tmp");
        let dir = tmp.path();
        fs::write(dir.join("web01"), "a: 1\n").expect("write bare");
        fs::write(dir.join("web01.yml"), "a: 2\n").expect("write yml");
        fs::write(dir.join("web01.yaml"), "a: 3\n").expect("write yaml");
        fs::write(dir.join("web01.json"), "{\"a\": 4}\n").expect("write json");
        // Same stem, different entity: never probed.
        fs::write(dir.join("web02.yml"), "a: 5\n").expect("write other");

        let loader = FileVarsLoader::new();
        let found = loader.find_vars_files(dir, "web01").expect("find");
        assert_eq!(names(&found), ["web01", "web01.yml", "web01.yaml", "web01.json"]);
    }

    #[test]
    fn entity_directory_expands_depth_first_and_sorted() {
        let tmp = TempDir::new().expect("tmp");
        let entity_dir = tmp.path().join("web01");
        fs::create_dir_all(entity_dir.join("nested")).expect("mkdir nested");
        fs::write(entity_dir.join("b.yml"), "b: 1\n").expect("write b");
        fs::write(entity_dir.join("a.yml"), "a: 1\n").expect("write a");
        fs::write(entity_dir.join("nested/c.yml"), "c: 1\n").expect("write c");
        // Noise that must never be picked up.
        fs::write(entity_dir.join(".hidden.yml"), "h: 1\n").expect("write hidden");
        fs::write(entity_dir.join("d.yml~"), "d: 1\n").expect("write backup");
        fs::write(entity_dir.join("skipped.txt"), "nope\n").expect("write txt");

        let loader = FileVarsLoader::new();
        let found = loader.find_vars_files(tmp.path(), "web01").expect("find");
        assert_eq!(names(&found), ["a.yml", "b.yml", "c.yml"]);
    }

    #[test]
    fn dotted_directory_names_are_not_recursed_into() {
        let tmp = TempDir::new().expect("tmp");
        let entity_dir = tmp.path().join("web01");
        fs::create_dir_all(entity_dir.join("conf.d")).expect("mkdir conf.d");
        fs::write(entity_dir.join("conf.d/x.yml"), "x: 1\n").expect("write x");
        fs::write(entity_dir.join("main.yml"), "m: 1\n").expect("write main");

        let loader = FileVarsLoader::new();
        let found = loader.find_vars_files(tmp.path(), "web01").expect("find");
        assert_eq!(names(&found), ["main.yml"]);
    }

    #[test]
    fn allow_dir_false_skips_entity_directories() {
        let tmp = TempDir::new().expect("tmp");
        let entity_dir = tmp.path().join("web01");
        fs::create_dir_all(&entity_dir).expect("mkdir");
        fs::write(entity_dir.join("a.yml"), "a: 1\n").expect("write a");
        fs::write(tmp.path().join("web01.yml"), "top: 1\n").expect("write top");

        let loader = FileVarsLoader::new().allow_dir(false);
        let found = loader.find_vars_files(tmp.path(), "web01").expect("find");
        assert_eq!(names(&found), ["web01.yml"]);
    }

    #[test]
    fn parses_yaml_json_and_toml_into_the_same_value_model() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("a.yml"), "port: 53\nnames: [ns1, ns2]\n").expect("yml");
        fs::write(tmp.path().join("b.json"), r#"{"port": 53, "names": ["ns1", "ns2"]}"#)
            .expect("json");
        fs::write(tmp.path().join("c.toml"), "port = 53\nnames = [\"ns1\", \"ns2\"]\n")
            .expect("toml");

        let loader = FileVarsLoader::new();
        let expected = json!({"port": 53, "names": ["ns1", "ns2"]});
        for file in ["a.yml", "b.json", "c.toml"] {
            let vars = loader.load_from_file(&tmp.path().join(file)).expect(file);
            assert_eq!(Value::Object(vars), expected, "mismatch for {file}");
        }
    }

    #[test]
    fn empty_and_null_files_define_nothing() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("empty.yml"), "").expect("empty");
        fs::write(tmp.path().join("comment.yml"), "# nothing here\n").expect("comment");

        let loader = FileVarsLoader::new();
        assert!(loader.load_from_file(&tmp.path().join("empty.yml")).expect("empty").is_empty());
        assert!(loader
            .load_from_file(&tmp.path().join("comment.yml"))
            .expect("comment")
            .is_empty());
    }

    #[test]
    fn scalar_top_level_is_an_error() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("scalar.yml"), "just a string\n").expect("write");

        let loader = FileVarsLoader::new();
        let err = loader.load_from_file(&tmp.path().join("scalar.yml")).unwrap_err();
        assert!(err.to_string().contains("must contain a mapping"), "got: {err}");
    }

    #[test]
    fn parsed_files_are_memoized() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("web01.yml");
        fs::write(&path, "a: 1\n").expect("write");

        let loader = FileVarsLoader::new();
        let first = loader.load_from_file(&path).expect("first load");

        // Rewriting the file does not invalidate the per-loader memo.
        fs::write(&path, "a: 2\n").expect("rewrite");
        let second = loader.load_from_file(&path).expect("second load");
        assert_eq!(first, second);
    }
}
