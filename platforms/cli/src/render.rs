use tmi::Snapshot;

/// Turns a machine snapshot into something a terminal can show.
pub trait Renderer {
    fn render(&self, snapshot: &Snapshot) -> String;
}

/// Draws a window of tape cells centered on the head, with markers above and below it.
///
/// ```text
/// state: start | cycle: 0 | position: 0
///    v
/// |_|1|1|_|
///    ^
/// ```
pub struct TextRenderer {
    width: usize,
}

impl TextRenderer {
    /// Creates a renderer that shows at most `width` cells.
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
        }
    }

    /// Creates a renderer whose cell row fits in `columns` terminal columns.
    ///
    /// Every cell takes two columns and the row ends with one closing `|`.
    pub fn fit(columns: u16) -> Self {
        Self::new(usize::from(columns.saturating_sub(1)) / 2)
    }

    /// Number of cells drawn at most.
    pub fn width(&self) -> usize {
        self.width
    }

    /// The range of cells to show, as `(start, end)` storage indices.
    fn window(&self, snapshot: &Snapshot) -> (usize, usize) {
        let len = snapshot.tape.len();
        let mut start = snapshot.head.saturating_sub(self.width / 2);
        let end = (start + self.width).min(len);

        // Shift left when the head is close to the right end
        if end - start < self.width {
            start = end.saturating_sub(self.width);
        }

        (start, end)
    }
}

impl Renderer for TextRenderer {
    fn render(&self, snapshot: &Snapshot) -> String {
        let (start, end) = self.window(snapshot);

        let mut header = format!(
            "state: {} | cycle: {} | position: {}",
            snapshot.state, snapshot.cycle_count, snapshot.position
        );
        if snapshot.complete {
            header.push_str(" | halted");
        }

        let cells: String = snapshot.tape[start..end]
            .iter()
            .map(|symbol| format!("|{symbol}"))
            .collect();

        let marker = " ".repeat(2 * (snapshot.head - start) + 1);

        format!("{header}\n{marker}v\n{cells}|\n{marker}^")
    }
}
