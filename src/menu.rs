//! The showcase list: labels, some of which name a catalog model.
//!
//! Only items with a model can become active. Moving up or down skips the rest
//! and wraps at either end.

use crate::config::Config;

#[derive(Clone, Debug, PartialEq)]
pub struct MenuItem {
    pub label: String,
    /// Catalog index this item selects, if it has a model.
    pub model: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct Menu {
    items: Vec<MenuItem>,
    active: usize,
}

impl Menu {
    /// Build a menu, resolving each label to a model with `lookup`.
    ///
    /// If `initial` has no model, the first item after it that does becomes active.
    pub fn new<S: AsRef<str>>(
        labels: &[S],
        lookup: impl Fn(&str) -> Option<usize>,
        initial: usize,
    ) -> Self {
        let items = labels
            .iter()
            .map(|label| {
                let label = label.as_ref();
                MenuItem {
                    label: label.to_string(),
                    model: lookup(label),
                }
            })
            .collect();
        let mut menu = Self { items, active: 0 };
        menu.active = menu
            .find_from(initial.min(menu.items.len().saturating_sub(1)), 1)
            .unwrap_or(0);
        menu
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.menu.items,
            |label| config.model_index(label),
            config.menu.initial,
        )
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn active_item(&self) -> Option<&MenuItem> {
        self.items.get(self.active)
    }

    pub fn active_model(&self) -> Option<usize> {
        self.active_item().and_then(|item| item.model)
    }

    /// Move to the next item with a model and return that model.
    pub fn move_down(&mut self) -> Option<usize> {
        self.step(1)
    }

    /// Move to the previous item with a model and return that model.
    pub fn move_up(&mut self) -> Option<usize> {
        self.step(self.items.len().saturating_sub(1))
    }

    /// Activate the first item showing catalog model `model`. Returns false and
    /// leaves the active item alone when no item shows it.
    pub fn activate_model(&mut self, model: usize) -> bool {
        match self.items.iter().position(|item| item.model == Some(model)) {
            Some(index) => {
                self.active = index;
                true
            }
            None => false,
        }
    }

    /// Window title for the active item.
    pub fn title(&self, base: &str) -> String {
        match self.active_item() {
            Some(item) if item.model.is_some() => format!("{base} - {}", item.label),
            _ => base.to_string(),
        }
    }

    fn step(&mut self, stride: usize) -> Option<usize> {
        let from = (self.active + stride) % self.items.len().max(1);
        if let Some(index) = self.find_from(from, stride) {
            self.active = index;
        }
        self.active_model()
    }

    /// First index with a model, visiting every item once from `start` by `stride`.
    fn find_from(&self, start: usize, stride: usize) -> Option<usize> {
        let len = self.items.len();
        (0..len)
            .map(|i| (start + i * stride) % len)
            .find(|&index| self.items[index].model.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn showcase() -> Menu {
        Menu::from_config(&Config::default())
    }

    #[test]
    fn showcase_starts_on_stool() {
        let menu = showcase();
        assert_eq!(menu.active(), 1);
        assert_eq!(menu.active_model(), Some(0));
        assert_eq!(menu.title("xfade"), "xfade - Stool");
    }

    #[test]
    fn navigation_skips_items_without_models() {
        let mut menu = showcase();
        assert_eq!(menu.move_down(), Some(1));
        assert_eq!(menu.active_item().unwrap().label, "Table");
        assert_eq!(menu.move_down(), Some(2));
        assert_eq!(menu.active_item().unwrap().label, "Bench");
        // wraps past the end back to Stool
        assert_eq!(menu.move_down(), Some(0));
        assert_eq!(menu.move_up(), Some(2));
    }

    #[test]
    fn initial_item_without_model_moves_forward() {
        let menu = Menu::new(&["Lamp", "Chair", "Desk"], |l| (l == "Desk").then_some(4), 0);
        assert_eq!(menu.active(), 2);
        assert_eq!(menu.active_model(), Some(4));
    }

    #[test]
    fn activate_model_finds_item() {
        let mut menu = showcase();
        assert!(menu.activate_model(2));
        assert_eq!(menu.active_item().unwrap().label, "Bench");
        assert!(!menu.activate_model(7));
        assert_eq!(menu.active_item().unwrap().label, "Bench");
    }

    #[test]
    fn menu_without_models_stays_put() {
        let mut menu = Menu::new(&["A", "B"], |_| None, 1);
        assert_eq!(menu.move_down(), None);
        assert_eq!(menu.title("xfade"), "xfade");
    }
}
