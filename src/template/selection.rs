use super::Template;

/// Identifies one image load; only the newest ticket may draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    template_id: String,
}

impl LoadTicket {
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub fn template_id(&self) -> &str {
        &self.template_id
    }
}

#[derive(Debug, Default)]
pub struct TemplateSelection {
    templates: Vec<Template>,
    selected: Option<usize>,
    generation: u64,
    closed: bool,
}

impl TemplateSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn selected(&self) -> Option<&Template> {
        self.selected.and_then(|index| self.templates.get(index))
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Replaces the list and selects its first entry.
    pub fn replace(&mut self, templates: Vec<Template>) -> Option<LoadTicket> {
        self.templates = templates;
        self.selected = None;
        self.select(0)
    }

    pub fn select(&mut self, index: usize) -> Option<LoadTicket> {
        let template_id = self.templates.get(index)?.id.clone();
        self.selected = Some(index);
        self.generation = self.generation.wrapping_add(1);
        tracing::debug!(index, generation = self.generation, "template selected");
        Some(LoadTicket {
            generation: self.generation,
            template_id,
        })
    }

    /// `roll(n)` must return an index below `n`.
    pub fn select_random(&mut self, roll: impl FnOnce(usize) -> usize) -> Option<LoadTicket> {
        if self.templates.is_empty() {
            return None;
        }
        let index = roll(self.templates.len()).min(self.templates.len() - 1);
        self.select(index)
    }

    /// Whether a finished load may still be drawn.
    pub fn accepts(&self, ticket: &LoadTicket) -> bool {
        !self.closed
            && ticket.generation == self.generation
            && self
                .selected()
                .is_some_and(|template| template.id == ticket.template_id)
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    pub const fn is_closed(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(id: &str) -> Template {
        Template {
            id: id.to_string(),
            name: format!("Template {id}"),
            url: format!("https://i.test/{id}.png"),
            width: 100,
            height: 100,
            box_count: 2,
        }
    }

    fn selection() -> (TemplateSelection, LoadTicket) {
        let mut selection = TemplateSelection::new();
        let ticket = selection
            .replace(vec![template("a"), template("b"), template("c")])
            .expect("first template should be selected");
        (selection, ticket)
    }

    #[test]
    fn replace_selects_first_template() {
        let (selection, ticket) = selection();
        assert_eq!(selection.selected().map(|t| t.id.as_str()), Some("a"));
        assert_eq!(ticket.template_id(), "a");
        assert!(selection.accepts(&ticket));
    }

    #[test]
    fn superseded_load_is_rejected() {
        let (mut selection, first) = selection();
        let second = selection.select(1).expect("index 1 exists");

        assert!(!selection.accepts(&first));
        assert!(selection.accepts(&second));
    }

    #[test]
    fn reselecting_same_template_still_supersedes_older_load() {
        let (mut selection, first) = selection();
        let again = selection.select(0).unwrap();
        assert_eq!(again.template_id(), first.template_id());
        assert!(!selection.accepts(&first));
        assert!(selection.accepts(&again));
    }

    #[test]
    fn closed_selection_accepts_nothing() {
        let (mut selection, ticket) = selection();
        selection.close();
        assert!(selection.is_closed());
        assert!(!selection.accepts(&ticket));
    }

    #[test]
    fn random_selection_uses_roll_and_clamps() {
        let (mut selection, _) = selection();
        let ticket = selection.select_random(|n| n - 1).unwrap();
        assert_eq!(ticket.template_id(), "c");
        let ticket = selection.select_random(|_| 99).unwrap();
        assert_eq!(ticket.template_id(), "c");

        let mut empty = TemplateSelection::new();
        assert!(empty.select_random(|_| 0).is_none());
        assert!(empty.replace(Vec::new()).is_none());
    }

    #[test]
    fn select_out_of_range_keeps_state() {
        let (mut selection, ticket) = selection();
        assert!(selection.select(7).is_none());
        assert!(selection.accepts(&ticket));
    }
}
