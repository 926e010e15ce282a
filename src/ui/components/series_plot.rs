use std::collections::{HashMap, VecDeque};

use ratatui::{
    layout::Rect,
    style::Style,
    symbols::Marker,
    text::Span,
    widgets::{Axis, Chart, Dataset, GraphType, Widget},
};

use super::draw_frame;
use crate::metrics::sanitize_percent;
use crate::ui::canvas::Canvas;
use crate::ui::theme::Theme;

/// Line plot of per-entity usage over time.
///
/// Each entity name is bound to a slot the first time it is recorded and
/// keeps that slot (and so its color) while it has samples inside the
/// history window, however the source reorders its rows. A slot whose
/// samples have all aged out is released and its index reused.
pub struct SeriesPlot {
    title: String,
    theme: Theme,
    capacity: usize,
    tick: u64,
    index: HashMap<String, usize>,
    slots: Vec<Option<Slot>>,
}

struct Slot {
    name: String,
    history: VecDeque<(f64, f64)>,
}

impl SeriesPlot {
    pub fn new(title: impl Into<String>, theme: Theme, capacity: usize) -> Self {
        Self {
            title: title.into(),
            theme,
            capacity: capacity.max(1),
            tick: 0,
            index: HashMap::new(),
            slots: Vec::new(),
        }
    }

    pub fn slot_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Number of live slots.
    pub fn slot_count(&self) -> usize {
        self.index.len()
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Samples recorded for `slot`, oldest first, as `(tick, value)`.
    pub fn series(&self, slot: usize) -> Option<&VecDeque<(f64, f64)>> {
        self.slots.get(slot)?.as_ref().map(|s| &s.history)
    }

    /// Record one poll's worth of samples. Malformed values are skipped.
    pub fn record<'a, I>(&mut self, samples: I)
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        self.tick += 1;
        let x = self.tick as f64;
        for (name, value) in samples {
            let Some(value) = sanitize_percent(value) else {
                continue;
            };
            let slot = self.bind(name);
            if let Some(Some(slot)) = self.slots.get_mut(slot) {
                if slot.history.len() == self.capacity {
                    slot.history.pop_front();
                }
                slot.history.push_back((x, value));
            }
        }
        self.expire();
    }

    fn bind(&mut self, name: &str) -> usize {
        if let Some(slot) = self.index.get(name) {
            return *slot;
        }
        let slot = Slot {
            name: name.to_string(),
            history: VecDeque::with_capacity(self.capacity),
        };
        let index = match self.slots.iter().position(Option::is_none) {
            Some(free) => {
                self.slots[free] = Some(slot);
                free
            }
            None => {
                self.slots.push(Some(slot));
                self.slots.len() - 1
            }
        };
        self.index.insert(name.to_string(), index);
        index
    }

    /// Drop samples older than the last `capacity` ticks and release slots
    /// left empty.
    fn expire(&mut self) {
        let oldest = self.tick.saturating_sub(self.capacity as u64) as f64;
        for entry in self.slots.iter_mut() {
            let Some(slot) = entry.as_mut() else {
                continue;
            };
            while slot.history.front().is_some_and(|(x, _)| *x <= oldest) {
                slot.history.pop_front();
            }
            if slot.history.is_empty() {
                self.index.remove(&slot.name);
                *entry = None;
            }
        }
        while matches!(self.slots.last(), Some(None)) {
            self.slots.pop();
        }
    }

    fn x_bounds(&self, width: u16) -> [f64; 2] {
        let right = self.tick as f64;
        [right - width as f64, right]
    }

    /// Upper y bound: the largest sample at or after `left`, never below 100.
    fn y_max_since(&self, left: f64) -> f64 {
        self.slots
            .iter()
            .flatten()
            .flat_map(|s| s.history.iter())
            .filter(|(x, _)| *x >= left)
            .map(|(_, v)| *v)
            .fold(100.0, f64::max)
    }

    pub fn draw(&self, canvas: &mut Canvas, area: Rect, focused: bool) {
        let inner = draw_frame(canvas, area, &self.title, &self.theme, focused);
        if inner.width < 3 || inner.height < 3 {
            return;
        }

        let [left, right] = self.x_bounds(inner.width);
        let points: Vec<(usize, &str, Vec<(f64, f64)>)> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                let slot = slot.as_ref()?;
                let data: Vec<(f64, f64)> = slot
                    .history
                    .iter()
                    .filter(|(x, _)| *x >= left)
                    .copied()
                    .collect();
                (!data.is_empty()).then_some((index, slot.name.as_str(), data))
            })
            .collect();
        let datasets: Vec<Dataset> = points
            .iter()
            .map(|(index, name, data)| {
                Dataset::default()
                    .name(name.to_string())
                    .marker(Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(self.theme.series_color(*index)))
                    .data(data)
            })
            .collect();

        let chart = Chart::new(datasets)
            .x_axis(
                Axis::default()
                    .style(self.theme.border_style(false))
                    .bounds([left, right]),
            )
            .y_axis(
                Axis::default()
                    .title(Span::styled("%", self.theme.text_style()))
                    .style(self.theme.border_style(false))
                    .bounds([0.0, self.y_max_since(left)]),
            );
        chart.render(inner, canvas.buffer_mut());
    }
}
