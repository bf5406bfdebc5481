use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Input widget class for a declared variable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableKind {
    #[default]
    Text,
    Multiline,
}

/// One named placeholder slot a template can reference as `[name]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDeclaration {
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub kind: VariableKind,
}

impl VariableDeclaration {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind: VariableKind::Text,
        }
    }

    pub fn multiline(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind: VariableKind::Multiline,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryError {
    DuplicateName { name: String },
    InvalidName { name: String },
    EmptyLabel { name: String },
    UnknownName { name: String },
}

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap())
}

/// Ordered set of variable declarations, keyed by unique name.
///
/// Declaration order is what UIs display and what the render engine walks, so
/// it is preserved; name uniqueness is enforced at insertion time and every
/// mutation either fully applies or fully refuses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableRegistry {
    declarations: Vec<VariableDeclaration>,
}

impl VariableRegistry {
    pub fn empty() -> Self {
        Self {
            declarations: Vec::new(),
        }
    }

    /// Build a registry from a declaration list, refusing the whole list on
    /// the first invalid or duplicate entry.
    pub fn from_declarations(
        declarations: Vec<VariableDeclaration>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::empty();
        for declaration in declarations {
            registry.insert(declaration)?;
        }
        Ok(registry)
    }

    fn validate(&self, declaration: &VariableDeclaration) -> Result<(), RegistryError> {
        if !identifier_re().is_match(&declaration.name) {
            return Err(RegistryError::InvalidName {
                name: declaration.name.clone(),
            });
        }
        if declaration.label.trim().is_empty() {
            return Err(RegistryError::EmptyLabel {
                name: declaration.name.clone(),
            });
        }
        Ok(())
    }

    pub fn insert(&mut self, declaration: VariableDeclaration) -> Result<(), RegistryError> {
        self.validate(&declaration)?;
        if self.get(&declaration.name).is_some() {
            return Err(RegistryError::DuplicateName {
                name: declaration.name,
            });
        }
        self.declarations.push(declaration);
        Ok(())
    }

    /// Replace the declaration called `name`. Renaming onto another existing
    /// declaration is refused; position in the ordering is kept.
    pub fn update(
        &mut self,
        name: &str,
        declaration: VariableDeclaration,
    ) -> Result<(), RegistryError> {
        self.validate(&declaration)?;
        let idx = self
            .declarations
            .iter()
            .position(|d| d.name == name)
            .ok_or_else(|| RegistryError::UnknownName {
                name: name.to_string(),
            })?;
        if declaration.name != name && self.get(&declaration.name).is_some() {
            return Err(RegistryError::DuplicateName {
                name: declaration.name,
            });
        }
        self.declarations[idx] = declaration;
        Ok(())
    }

    /// Remove a declaration by name. Returns whether anything was dropped so
    /// callers can clear the matching value-map entry.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.declarations.len();
        self.declarations.retain(|d| d.name != name);
        self.declarations.len() != before
    }

    pub fn get(&self, name: &str) -> Option<&VariableDeclaration> {
        self.declarations.iter().find(|d| d.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariableDeclaration> {
        self.declarations.iter()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

impl Default for VariableRegistry {
    /// The stock declaration set the publisher ships with.
    fn default() -> Self {
        Self {
            declarations: vec![
                VariableDeclaration::new("Game_name", "Nom du jeu"),
                VariableDeclaration::new("Game_version", "Version du jeu"),
                VariableDeclaration::new("Translate_version", "Version de la traduction"),
                VariableDeclaration::new("Game_link", "Lien du jeu"),
                VariableDeclaration::new("Translate_link", "Lien de la traduction"),
                VariableDeclaration::multiline("Overview", "Synopsis"),
                VariableDeclaration::new("is_modded_game", "Mod compatible"),
                VariableDeclaration::new("Mod_link", "Lien du mod"),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_name() {
        let mut registry = VariableRegistry::empty();
        registry
            .insert(VariableDeclaration::new("Game_name", "Nom du jeu"))
            .unwrap();
        let err = registry
            .insert(VariableDeclaration::new("Game_name", "Autre"))
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateName {
                name: "Game_name".to_string()
            }
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn rejects_invalid_identifier() {
        let mut registry = VariableRegistry::empty();
        for bad in ["", "1abc", "has space", "hy-phen"] {
            assert!(matches!(
                registry.insert(VariableDeclaration::new(bad, "Label")),
                Err(RegistryError::InvalidName { .. })
            ));
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn rejects_empty_label() {
        let mut registry = VariableRegistry::empty();
        assert!(matches!(
            registry.insert(VariableDeclaration::new("Ok_name", "   ")),
            Err(RegistryError::EmptyLabel { .. })
        ));
    }

    #[test]
    fn update_keeps_position_and_refuses_name_collisions() {
        let mut registry = VariableRegistry::default();
        registry
            .update("Game_version", VariableDeclaration::new("Game_version", "Version"))
            .unwrap();
        assert_eq!(
            registry.iter().nth(1).map(|d| d.label.as_str()),
            Some("Version")
        );

        let err = registry
            .update("Game_version", VariableDeclaration::new("Game_name", "Version"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateName { .. }));

        let err = registry
            .update("Nope", VariableDeclaration::new("Nope", "Label"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::UnknownName { .. }));
    }

    #[test]
    fn remove_reports_whether_something_was_dropped() {
        let mut registry = VariableRegistry::default();
        assert!(registry.remove("Mod_link"));
        assert!(!registry.remove("Mod_link"));
        assert!(registry.get("Mod_link").is_none());
    }

    #[test]
    fn default_registry_declares_the_stock_variables() {
        let registry = VariableRegistry::default();
        assert_eq!(registry.len(), 8);
        assert_eq!(
            registry.get("Overview").map(|d| d.kind),
            Some(VariableKind::Multiline)
        );
        assert_eq!(
            registry.iter().next().map(|d| d.name.as_str()),
            Some("Game_name")
        );
    }
}
