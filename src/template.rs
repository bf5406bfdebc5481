use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A reusable post template. `content` is plain text with `[Name]`
/// placeholders and the structural markers the render engine understands.
/// Templates are only ever mutated by explicit user edits; a render pass
/// treats them as immutable input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub content: String,
}

impl Template {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            content: content.into(),
        }
    }

    /// Placeholder names referenced by this template, in order of first
    /// appearance, duplicates removed. Structural markers count too since
    /// they share the bracket syntax; callers filter if they only want
    /// registry-backed names.
    pub fn placeholder_names(&self) -> Vec<String> {
        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| Regex::new(r"\[([A-Za-z_][A-Za-z0-9_]*)\]").unwrap());

        let mut seen = Vec::new();
        for caps in re.captures_iter(&self.content) {
            let name = &caps[1];
            if !seen.iter().any(|s: &String| s == name) {
                seen.push(name.to_string());
            }
        }
        seen
    }
}

/// The stock release-announcement template the publisher ships with.
pub fn default_template() -> Template {
    Template::new(
        "my",
        "Mes traductions",
        "\
## :flag_fr: La traduction française de [Game_name] est disponible ! :tada:

Vous pouvez l'installer dès maintenant pour profiter du jeu dans notre langue. Bon jeu à tous ! :point_down:

1. :computer: **Infos du Jeu**
   * **Nom du jeu :** [Game_name]
   * **Version du jeu :** `[Game_version]`
   * **Version traduite :** `[Translate_version]`
   * **Type de traduction :** [Translation_Type]
   * **Mod compatible :** [is_modded_game]

2. :link: **Liens requis**
   * [Jeu original](<[Game_link]>)
[MOD_LINKS_LINE]

3. :link: **Traductions**
[TRANSLATION_LINKS_LINE]

**Synopsis du jeu :**
> [Overview]
[instruction]",
    )
}

pub fn default_templates() -> Vec<Template> {
    vec![default_template()]
}
