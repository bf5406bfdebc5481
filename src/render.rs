use crate::link;
use crate::registry::{VariableKind, VariableRegistry};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Structural marker replaced by the assembled mod-links line.
pub const MOD_LINKS_MARKER: &str = "[MOD_LINKS_LINE]";
/// Structural marker replaced by the assembled translation-links line.
pub const TRANSLATION_LINKS_MARKER: &str = "[TRANSLATION_LINKS_LINE]";
/// Structural marker replaced by a zero-width space, for forcing blank lines
/// through forum renderers that trim them.
pub const INVISIBLE_CHAR_MARKER: &str = "[INVISIBLE_CHAR]";
/// Derived-label placeholder fed from toggle state, not from the value map.
pub const TRANSLATION_TYPE_MARKER: &str = "[Translation_Type]";
/// Free-text field rendered as a fenced numbered block.
pub const INSTRUCTION_MARKER: &str = "[instruction]";

pub const VAR_IS_MODDED: &str = "is_modded_game";
pub const VAR_GAME_LINK: &str = "Game_link";
pub const VAR_MOD_LINK: &str = "Mod_link";
pub const VAR_TRANSLATE_LINK: &str = "Translate_link";
pub const VAR_MOD_LABEL: &str = "main_mod_label";
pub const VAR_TRANSLATION_LABEL: &str = "main_translation_label";
pub const VAR_INSTRUCTION: &str = "instruction";

const DEFAULT_MOD_LABEL: &str = "Mod";
const DEFAULT_TRANSLATION_LABEL: &str = "Traduction";

/// Secondary link shown next to a primary one. Only rendered when both
/// fields are non-empty after trimming.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraLink {
    pub label: String,
    pub link: String,
}

impl ExtraLink {
    pub fn new(label: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            link: link.into(),
        }
    }
}

/// Toggle state a render pass depends on, passed in explicitly so the engine
/// stays a pure function of its arguments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Human description of how the translation was produced.
    pub translation_type: String,
    /// Translation ships inside the game itself; hides the standalone
    /// translation link section when that section would be empty.
    pub integrated: bool,
    /// Prefix applied to continuation lines of multiline values.
    pub quote_prefix: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            translation_type: "Automatique".to_string(),
            integrated: false,
            quote_prefix: "> ".to_string(),
        }
    }
}

fn value_of<'a>(values: &'a BTreeMap<String, String>, name: &str) -> &'a str {
    values.get(name).map(|v| v.trim()).unwrap_or("")
}

fn label_of<'a>(values: &'a BTreeMap<String, String>, name: &str, default: &'a str) -> &'a str {
    let label = value_of(values, name);
    if label.is_empty() { default } else { label }
}

/// Assemble one display line from a primary link plus its extras, each as a
/// `[label](<url>)` Markdown link, joined by `" - "`. Empty when there is
/// nothing to show.
fn link_line(primary_url: &str, primary_label: &str, extras: &[ExtraLink]) -> String {
    let mut parts = Vec::new();
    if !primary_url.is_empty() {
        parts.push(format!("[{primary_label}](<{primary_url}>)"));
    }
    for extra in extras {
        let label = extra.label.trim();
        let url = extra.link.trim();
        if label.is_empty() || url.is_empty() {
            continue;
        }
        parts.push(format!("[{label}](<{}>)", link::normalize(url)));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!("   * {}", parts.join(" - "))
    }
}

fn prefix_continuation_lines(text: &str, prefix: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
            out.push_str(prefix);
        }
        out.push_str(line);
    }
    out
}

/// Render a free-text instruction field as a fenced, numbered block; one
/// number per non-empty input line. Empty input renders to nothing at all.
fn instruction_block(raw: &str) -> String {
    let content = raw.trim();
    if content.is_empty() {
        return String::new();
    }
    let numbered = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(i, line)| format!("{}. {line}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");
    format!("```\nInstructions d'installation :\n{numbered}\n```")
}

fn translations_section_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"3\. :link: \*\*Traductions\*\*\n\[TRANSLATION_LINKS_LINE\]\n?").unwrap()
    })
}

fn translate_link_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^.*\[Translate_link\].*$").unwrap())
}

fn blank_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").unwrap())
}

/// Substitute a template into final post text.
///
/// The passes run in a fixed order because later ones consume text earlier
/// ones produce: boolean flag, structural link lines, generic placeholders,
/// derived translation-type label, integrated-mode line stripping, the
/// instruction block, and finally blank-run collapsing. A declared variable
/// with an empty value leaves its `[name]` placeholder visible on purpose:
/// that is how missing input shows up in the preview.
pub fn render(
    template: &str,
    registry: &VariableRegistry,
    values: &BTreeMap<String, String>,
    options: &RenderOptions,
    extra_mod_links: &[ExtraLink],
    extra_translation_links: &[ExtraLink],
) -> String {
    let mut content = template.to_string();

    // 1. Boolean flag: the mod-compatible slot renders as a two-state label.
    let modded_text = if value_of(values, VAR_IS_MODDED) == "true" {
        "Oui"
    } else {
        "Non"
    };
    content = content.replace(&format!("[{VAR_IS_MODDED}]"), modded_text);

    // 2. Structural link lines.
    let mod_line = link_line(
        &link::normalize(value_of(values, VAR_MOD_LINK)),
        label_of(values, VAR_MOD_LABEL, DEFAULT_MOD_LABEL),
        extra_mod_links,
    );
    let translation_line = link_line(
        &link::normalize(value_of(values, VAR_TRANSLATE_LINK)),
        label_of(values, VAR_TRANSLATION_LABEL, DEFAULT_TRANSLATION_LABEL),
        extra_translation_links,
    );
    content = content.replace(MOD_LINKS_MARKER, &mod_line);
    if options.integrated && translation_line.is_empty() {
        // An integrated translation with no standalone links drops the whole
        // section, header included, not just the marker.
        content = translations_section_re().replace_all(&content, "").into_owned();
    } else {
        content = content.replace(TRANSLATION_LINKS_MARKER, &translation_line);
    }

    // 3. Generic placeholders. The link-bearing declarations were consumed by
    // the line pass above; the flag was consumed in pass 1.
    for declaration in registry.iter() {
        let name = declaration.name.as_str();
        if matches!(name, VAR_IS_MODDED | VAR_MOD_LINK | VAR_TRANSLATE_LINK) {
            continue;
        }
        let mut value = value_of(values, name).to_string();
        if name == VAR_GAME_LINK {
            value = link::normalize(&value);
        }
        if declaration.kind == VariableKind::Multiline && !value.is_empty() {
            value = prefix_continuation_lines(&value, &options.quote_prefix);
        }
        if !value.is_empty() {
            content = content.replace(&format!("[{name}]"), &value);
        }
    }

    // 4. Derived label from toggle state.
    let type_display = if options.integrated {
        format!("{} (Intégrée)", options.translation_type)
    } else {
        options.translation_type.clone()
    };
    content = content.replace(TRANSLATION_TYPE_MARKER, &type_display);

    // 5. Integrated mode: legacy templates reference the standalone
    // translation link inline; those lines go away entirely.
    if options.integrated {
        content = translate_link_line_re().replace_all(&content, "").into_owned();
    }

    // 6. Instruction block and invisible separator.
    content = content.replace(
        INSTRUCTION_MARKER,
        &instruction_block(value_of(values, VAR_INSTRUCTION)),
    );
    content = content.replace(INVISIBLE_CHAR_MARKER, "\u{200B}");

    // 7. Collapse what the removals left behind, after all substitutions.
    blank_run_re().replace_all(&content, "\n\n").into_owned()
}
