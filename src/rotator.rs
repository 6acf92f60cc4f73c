//! Panel and widget rotation state
//!
//! `Rotator` cycles which one of N embedded panels is visible. It is plain
//! state: whatever timer drives the dashboard holds it and calls
//! [`Rotator::advance`] on every tick.
//!
//! `WidgetRotator` picks the next widget with something to show, skipping
//! widgets that render blank content.

use log::{debug, info};

/// Placeholder returned when no widget has content.
pub const NO_CONTENT: &str = "<!-- No content -->";

/// One rotating panel (an embedded frame on the dashboard).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    pub id: String,
    pub src: String,
    pub visible: bool,
}

impl Panel {
    fn new(counter: usize) -> Self {
        Self {
            id: format!("rotate_{}", counter),
            src: format!("/rotate?counter={}", counter),
            visible: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Rotator {
    panels: Vec<Panel>,
    index: usize,
}

impl Rotator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_count(count: usize) -> Self {
        let mut r = Self::new();
        r.reset(count);
        r
    }

    /// Rebuild the panel set for a freshly fetched count. All panels start
    /// hidden and rotation restarts at the first one.
    pub fn reset(&mut self, count: usize) {
        info!("Rotator reset: count={}", count);
        self.panels = (0..count).map(Panel::new).collect();
        self.index = 0;
    }

    pub fn count(&self) -> usize {
        self.panels.len()
    }

    /// Index of the panel the next `advance` will show.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn visible(&self) -> Option<&Panel> {
        self.panels.iter().find(|p| p.visible)
    }

    /// Show the panel at the current index, hide all others, then move the
    /// index on (wrapping to 0 after the last panel).
    ///
    /// Returns the index that became visible, or `None` with no panels.
    pub fn advance(&mut self) -> Option<usize> {
        debug!("Rotator advance: index={}", self.index);
        let shown = (self.index < self.panels.len()).then_some(self.index);
        for (i, panel) in self.panels.iter_mut().enumerate() {
            panel.visible = Some(i) == shown;
        }
        self.index = if self.index + 1 < self.panels.len() { self.index + 1 } else { 0 };
        shown
    }
}

/// Content-aware rotation over an ordered widget list.
///
/// Alongside the cursor it keeps a loop counter `n` that increases every
/// time the cursor wraps past the last widget; renderers receive it so a
/// widget can vary what it shows on each pass.
#[derive(Debug, Clone)]
pub struct WidgetRotator {
    widgets: Vec<String>,
    index: usize,
    n: u64,
}

impl WidgetRotator {
    pub fn new(widgets: Vec<String>) -> Self {
        Self::from_state(widgets, 0, 0)
    }

    /// Resume from a previously returned `(index, n)`; an out-of-range index
    /// wraps.
    pub fn from_state(widgets: Vec<String>, index: usize, n: u64) -> Self {
        let index = if widgets.is_empty() { 0 } else { index % widgets.len() };
        Self { widgets, index, n }
    }

    pub fn state(&self) -> (usize, u64) {
        (self.index, self.n)
    }

    pub fn widgets(&self) -> &[String] {
        &self.widgets
    }

    fn step(&mut self) {
        if self.index + 1 == self.widgets.len() {
            self.index = 0;
            self.n += 1;
        } else {
            self.index += 1;
        }
    }

    /// Render widgets from the cursor on until one yields non-blank content.
    /// After at most one full pass returns [`NO_CONTENT`].
    pub fn next_content<F>(&mut self, mut render: F) -> String
    where
        F: FnMut(&str, u64) -> String,
    {
        for _ in 0..self.widgets.len() {
            let name = &self.widgets[self.index];
            let html = render(name, self.n).trim().to_string();
            if html.is_empty() {
                debug!("Widget {} has no content, skipping", name);
            }
            self.step();
            if !html.is_empty() {
                return html;
            }
        }
        NO_CONTENT.to_string()
    }
}
