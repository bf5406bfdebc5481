use crate::debounce::{Debounced, TEMPLATE_SWITCH_WINDOW, TEXT_INPUT_WINDOW};
use crate::link::{self, LinkConfig, LinkSource};
use crate::registry::{RegistryError, VariableDeclaration, VariableRegistry};
use crate::render::{
    render, ExtraLink, RenderOptions, VAR_GAME_LINK, VAR_MOD_LINK, VAR_TRANSLATE_LINK,
};
use crate::template::{default_templates, Template};
use std::collections::BTreeMap;
use std::time::Instant;

/// Which of the two extra-link lists an edit targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkGroup {
    Mod,
    Translation,
}

/// Single-threaded editing session: templates, declarations, live values and
/// toggles, with the two debouncers gating preview recomputation. The UI
/// feeds edits in and polls for a fresh preview; rendering itself stays a
/// pure function underneath.
#[derive(Clone, Debug)]
pub struct Composer {
    templates: Vec<Template>,
    registry: VariableRegistry,
    values: BTreeMap<String, String>,
    options: RenderOptions,
    extra_mod_links: Vec<ExtraLink>,
    extra_translation_links: Vec<ExtraLink>,
    template_switch: Debounced<usize>,
    input_settle: Debounced<u64>,
    edits: u64,
}

impl Composer {
    pub fn new(templates: Vec<Template>, registry: VariableRegistry) -> Self {
        let templates = if templates.is_empty() {
            default_templates()
        } else {
            templates
        };
        Self {
            templates,
            registry,
            values: BTreeMap::new(),
            options: RenderOptions::default(),
            extra_mod_links: Vec::new(),
            extra_translation_links: Vec::new(),
            template_switch: Debounced::new(0, TEMPLATE_SWITCH_WINDOW),
            input_settle: Debounced::new(0, TEXT_INPUT_WINDOW),
            edits: 0,
        }
    }

    pub fn current_template(&self) -> &Template {
        &self.templates[*self.template_switch.value()]
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn registry(&self) -> &VariableRegistry {
        &self.registry
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    fn touch(&mut self, now: Instant) {
        self.edits += 1;
        self.input_settle.set(self.edits, now);
    }

    /// Record a keystroke-level value change. The link-bearing fields are
    /// normalized on entry so a pasted URL is already canonical by the time
    /// anything reads it back.
    pub fn set_input(&mut self, name: &str, value: &str, now: Instant) {
        let stored = match name {
            VAR_GAME_LINK | VAR_TRANSLATE_LINK | VAR_MOD_LINK => link::normalize(value),
            _ => value.to_string(),
        };
        self.values.insert(name.to_string(), stored);
        self.touch(now);
    }

    /// Resolve a source+value pair to its canonical URL and store it under
    /// the given link variable. Pasting a full site URL while a site source
    /// is selected first extracts the bare thread id, like the original
    /// entry form.
    pub fn set_link_config(&mut self, name: &str, mut config: LinkConfig, now: Instant) {
        if matches!(config.source, LinkSource::F95 | LinkSource::Lewd)
            && config.value.contains("http")
        {
            config.value = link::extract_thread_id(&config.value, config.source);
        }
        let resolved = link::build_final_link(&config);
        self.values.insert(name.to_string(), resolved);
        self.touch(now);
    }

    pub fn set_translation_type(&mut self, translation_type: &str, now: Instant) {
        self.options.translation_type = translation_type.to_string();
        self.touch(now);
    }

    pub fn set_integrated(&mut self, integrated: bool, now: Instant) {
        self.options.integrated = integrated;
        self.touch(now);
    }

    /// Switch the active template. Out-of-range indexes clamp to the last
    /// template instead of failing; the list only shrinks via user deletes.
    pub fn select_template(&mut self, idx: usize, now: Instant) {
        let idx = idx.min(self.templates.len() - 1);
        self.template_switch.set(idx, now);
    }

    pub fn add_variable(&mut self, declaration: VariableDeclaration) -> Result<(), RegistryError> {
        self.registry.insert(declaration)
    }

    /// Remove a declaration and its live value together, so a deleted
    /// variable cannot keep ghost input around.
    pub fn remove_variable(&mut self, name: &str, now: Instant) -> bool {
        let removed = self.registry.remove(name);
        if removed {
            self.values.remove(name);
            self.touch(now);
        }
        removed
    }

    pub fn push_extra_link(&mut self, group: LinkGroup, extra: ExtraLink, now: Instant) {
        self.links_mut(group).push(extra);
        self.touch(now);
    }

    pub fn update_extra_link(
        &mut self,
        group: LinkGroup,
        idx: usize,
        extra: ExtraLink,
        now: Instant,
    ) {
        let links = self.links_mut(group);
        if let Some(slot) = links.get_mut(idx) {
            *slot = extra;
            self.touch(now);
        }
    }

    pub fn remove_extra_link(&mut self, group: LinkGroup, idx: usize, now: Instant) {
        let links = self.links_mut(group);
        if idx < links.len() {
            links.remove(idx);
            self.touch(now);
        }
    }

    fn links_mut(&mut self, group: LinkGroup) -> &mut Vec<ExtraLink> {
        match group {
            LinkGroup::Mod => &mut self.extra_mod_links,
            LinkGroup::Translation => &mut self.extra_translation_links,
        }
    }

    /// Advance the debouncers; when either settles, recompute and return the
    /// fresh preview. `None` means nothing changed since the last poll.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let template_settled = self.template_switch.poll(now);
        let input_settled = self.input_settle.poll(now);
        if template_settled || input_settled {
            Some(self.render_now())
        } else {
            None
        }
    }

    /// Render immediately from the latest state, bypassing the quiescence
    /// windows. The publish path uses this so the posted text can never lag
    /// behind the inputs.
    pub fn render_now(&mut self) -> String {
        self.template_switch.flush();
        self.input_settle.flush();
        render(
            &self.templates[*self.template_switch.value()].content,
            &self.registry,
            &self.values,
            &self.options,
            &self.extra_mod_links,
            &self.extra_translation_links,
        )
    }
}

impl Default for Composer {
    fn default() -> Self {
        Self::new(default_templates(), VariableRegistry::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn preview_waits_for_the_input_window() {
        let t0 = Instant::now();
        let mut composer = Composer::new(
            vec![Template::new("t", "T", "[Game_name]")],
            VariableRegistry::default(),
        );

        composer.set_input("Game_name", "Lost Solace", t0);
        assert_eq!(composer.poll(t0 + Duration::from_millis(100)), None);

        let preview = composer.poll(t0 + Duration::from_millis(300));
        assert_eq!(preview.as_deref(), Some("Lost Solace"));
        assert_eq!(composer.poll(t0 + Duration::from_millis(400)), None);
    }

    #[test]
    fn retyping_restarts_the_window_and_keeps_only_the_last_value() {
        let t0 = Instant::now();
        let mut composer = Composer::new(
            vec![Template::new("t", "T", "[Game_name]")],
            VariableRegistry::default(),
        );

        composer.set_input("Game_name", "Lo", t0);
        composer.set_input("Game_name", "Lost", t0 + Duration::from_millis(200));
        assert_eq!(composer.poll(t0 + Duration::from_millis(350)), None);

        let preview = composer.poll(t0 + Duration::from_millis(500));
        assert_eq!(preview.as_deref(), Some("Lost"));
    }

    #[test]
    fn link_inputs_are_normalized_on_entry() {
        let t0 = Instant::now();
        let mut composer = Composer::default();
        composer.set_input(
            "Game_link",
            "<https://f95zone.to/threads/a-game.7/post-3>",
            t0,
        );
        assert_eq!(
            composer.values().get("Game_link").map(String::as_str),
            Some("https://f95zone.to/threads/a-game.7/")
        );
    }

    #[test]
    fn link_config_with_pasted_url_extracts_the_thread_id() {
        let t0 = Instant::now();
        let mut composer = Composer::default();
        composer.set_link_config(
            "Translate_link",
            LinkConfig {
                source: LinkSource::Lewd,
                value: "https://lewdcorner.com/threads/my-tl.4242/".to_string(),
            },
            t0,
        );
        assert_eq!(
            composer.values().get("Translate_link").map(String::as_str),
            Some("https://lewdcorner.com/threads/4242/")
        );
    }

    #[test]
    fn template_switch_settles_on_its_own_window() {
        let t0 = Instant::now();
        let mut composer = Composer::new(
            vec![
                Template::new("a", "A", "first"),
                Template::new("b", "B", "second"),
            ],
            VariableRegistry::default(),
        );

        composer.select_template(1, t0);
        assert_eq!(composer.current_template().id, "a");

        let preview = composer.poll(t0 + Duration::from_millis(100));
        assert_eq!(preview.as_deref(), Some("second"));
        assert_eq!(composer.current_template().id, "b");
    }

    #[test]
    fn select_template_clamps_out_of_range_indexes() {
        let t0 = Instant::now();
        let mut composer = Composer::default();
        composer.select_template(99, t0);
        composer.poll(t0 + Duration::from_millis(100));
        assert_eq!(composer.current_template().id, "my");
    }

    #[test]
    fn removing_a_variable_clears_its_value() {
        let t0 = Instant::now();
        let mut composer = Composer::default();
        composer.set_input("Mod_link", "https://example.com/mod", t0);

        assert!(composer.remove_variable("Mod_link", t0));
        assert!(composer.values().get("Mod_link").is_none());
        assert!(!composer.remove_variable("Mod_link", t0));
    }

    #[test]
    fn render_now_does_not_wait() {
        let t0 = Instant::now();
        let mut composer = Composer::new(
            vec![Template::new("t", "T", "[Game_name]")],
            VariableRegistry::default(),
        );
        composer.set_input("Game_name", "Now", t0);
        assert_eq!(composer.render_now(), "Now");
    }

    #[test]
    fn toggles_feed_the_preview() {
        let t0 = Instant::now();
        let mut composer = Composer::new(
            vec![Template::new("t", "T", "[Translation_Type]")],
            VariableRegistry::default(),
        );
        composer.set_translation_type("Manuelle", t0);
        composer.set_integrated(true, t0);
        assert_eq!(composer.render_now(), "Manuelle (Intégrée)");
    }
}
