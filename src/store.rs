use crate::template::{default_templates, Template};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Load one of the persisted string-keyed maps. A missing file is the normal
/// first-run case and a corrupt one must not take the app down, so both come
/// back as an empty map.
pub fn load_map(path: &Path) -> BTreeMap<String, String> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => return BTreeMap::new(),
    };
    match serde_json::from_str(&raw) {
        Ok(map) => map,
        Err(err) => {
            warn!(path = %path.display(), %err, "unreadable state file, starting empty");
            BTreeMap::new()
        }
    }
}

pub fn save_map(path: &Path, map: &BTreeMap<String, String>) -> Result<(), String> {
    let json = serde_json::to_string_pretty(map).map_err(|e| e.to_string())?;
    fs::write(path, json).map_err(|e| e.to_string())
}

/// Load the two parallel owned-state maps and repair lockstep: an owner entry
/// whose key has no value cannot be trusted and is dropped. Value entries
/// without an owner are fine, those are locally original.
pub fn load_owned_state(
    values_path: &Path,
    owners_path: &Path,
) -> (BTreeMap<String, String>, BTreeMap<String, String>) {
    let values = load_map(values_path);
    let mut owners = load_map(owners_path);

    let before = owners.len();
    owners.retain(|key, _| values.contains_key(key));
    if owners.len() != before {
        warn!(
            dropped = before - owners.len(),
            "dropped owner entries with no matching value"
        );
    }

    (values, owners)
}

pub fn save_owned_state(
    values_path: &Path,
    owners_path: &Path,
    values: &BTreeMap<String, String>,
    owners: &BTreeMap<String, String>,
) -> Result<(), String> {
    save_map(values_path, values)?;
    save_map(owners_path, owners)
}

/// Load the template list, falling back to the built-in set when the file is
/// missing, corrupt, or empty.
pub fn load_templates(path: &Path) -> Vec<Template> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => return default_templates(),
    };
    match serde_json::from_str::<Vec<Template>>(&raw) {
        Ok(templates) if !templates.is_empty() => templates,
        Ok(_) => default_templates(),
        Err(err) => {
            warn!(path = %path.display(), %err, "unreadable template file, using defaults");
            default_templates()
        }
    }
}

pub fn save_templates(path: &Path, templates: &[Template]) -> Result<(), String> {
    let json = serde_json::to_string_pretty(templates).map_err(|e| e.to_string())?;
    fs::write(path, json).map_err(|e| e.to_string())
}

/// Write a single template to its own file, for sharing between users.
pub fn export_template(path: &Path, template: &Template) -> Result<(), String> {
    let json = serde_json::to_string_pretty(template).map_err(|e| e.to_string())?;
    fs::write(path, json).map_err(|e| e.to_string())
}

/// Read a shared template file. Unlike the bulk loaders this reports failure:
/// an explicit import deserves an error message, not a silent default.
pub fn import_template(path: &Path) -> Result<Template, String> {
    let raw = fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&raw).map_err(|e| e.to_string())
}
