//! Box-drawing exporter
//!
//! Draws each class as a box in a grid, one generalization tree after the
//! other, followed by one line per relationship.

use anyhow::Result;
use unicode_width::UnicodeWidthStr;

use super::database::{ClassNode, DiagramDatabase, NodeGroup, RelationshipEdge};
use crate::core::{Exporter, LinkType};

const TOP_LEFT: char = '┌';
const TOP_RIGHT: char = '┐';
const BOTTOM_LEFT: char = '└';
const BOTTOM_RIGHT: char = '┘';
const HORIZONTAL: char = '─';
const VERTICAL: char = '│';
const T_LEFT: char = '├';
const T_RIGHT: char = '┤';

/// Character grid
struct Canvas {
    cells: Vec<Vec<char>>,
    width: usize,
    height: usize,
}

impl Canvas {
    fn new(width: usize, height: usize) -> Self {
        Self {
            cells: vec![vec![' '; width]; height],
            width,
            height,
        }
    }

    fn set(&mut self, x: usize, y: usize, c: char) {
        if y < self.height && x < self.width {
            self.cells[y][x] = c;
        }
    }

    fn draw_horizontal(&mut self, x: usize, y: usize, len: usize, c: char) {
        for i in 0..len {
            self.set(x + i, y, c);
        }
    }

    fn draw_text(&mut self, x: usize, y: usize, text: &str) {
        for (i, c) in text.chars().enumerate() {
            self.set(x + i, y, c);
        }
    }

    fn draw_text_centered(&mut self, x: usize, y: usize, width: usize, text: &str) {
        let padding = width.saturating_sub(UnicodeWidthStr::width(text)) / 2;
        self.draw_text(x + padding, y, text);
    }

    fn separator(&mut self, x: usize, y: usize, w: usize) {
        self.set(x, y, T_LEFT);
        self.draw_horizontal(x + 1, y, w - 2, HORIZONTAL);
        self.set(x + w - 1, y, T_RIGHT);
    }

    fn render(&self) -> String {
        self.cells
            .iter()
            .map(|row| row.iter().collect::<String>().trim_end().to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A class box with its position in the grid
struct PlacedBox<'a> {
    class: &'a ClassNode,
    title: String,
    x: usize,
    y: usize,
    width: usize,
}

/// Box-drawn class diagram exporter
pub struct AsciiExporter {
    box_padding: usize,
    box_spacing: usize,
    max_boxes_per_row: usize,
}

impl AsciiExporter {
    pub fn new() -> Self {
        Self {
            box_padding: 1,
            box_spacing: 2,
            max_boxes_per_row: 3,
        }
    }

    pub fn with_boxes_per_row(mut self, count: usize) -> Self {
        self.max_boxes_per_row = count.max(1);
        self
    }

    fn title(class: &ClassNode) -> String {
        if class.is_virtual {
            format!("«interface» {}", class.name)
        } else if class.is_abstract {
            format!("{} {{abstract}}", class.name)
        } else {
            class.name.clone()
        }
    }

    fn box_size(&self, class: &ClassNode, title: &str) -> (usize, usize) {
        let content = class
            .attributes
            .iter()
            .map(|a| a.label.as_str())
            .chain(class.operations.iter().map(String::as_str))
            .map(UnicodeWidthStr::width)
            .chain(std::iter::once(UnicodeWidthStr::width(title)))
            .max()
            .unwrap_or(0);
        let width = content + self.box_padding * 2 + 2;

        let mut height = 3;
        if !class.attributes.is_empty() {
            height += 1 + class.attributes.len();
        }
        if !class.operations.is_empty() {
            height += 1 + class.operations.len();
        }
        (width, height)
    }

    /// Lay boxes out row by row; each generalization tree starts a new row
    fn layout<'a>(&self, database: &'a DiagramDatabase) -> (Vec<PlacedBox<'a>>, usize, usize) {
        let mut rows: Vec<Vec<&'a ClassNode>> = Vec::new();
        for group in database.groups() {
            let members: Vec<&ClassNode> = match group {
                NodeGroup::Single(class) => vec![class],
                NodeGroup::Cluster { ranks, .. } => ranks.into_iter().flat_map(|(_, c)| c).collect(),
            };
            for chunk in members.chunks(self.max_boxes_per_row) {
                rows.push(chunk.to_vec());
            }
        }

        let mut placed = Vec::new();
        let (mut total_width, mut y) = (0, 0);
        for row in rows {
            let mut x = 0;
            let mut row_height = 0;
            for class in row {
                let title = Self::title(class);
                let (width, height) = self.box_size(class, &title);
                placed.push(PlacedBox {
                    class,
                    title,
                    x,
                    y,
                    width,
                });
                x += width + self.box_spacing;
                row_height = row_height.max(height);
            }
            total_width = total_width.max(x);
            y += row_height + 1;
        }
        (placed, total_width, y)
    }

    fn draw_box(&self, canvas: &mut Canvas, placed: &PlacedBox<'_>) {
        let (x, w) = (placed.x, placed.width);
        let mut cy = placed.y;

        canvas.set(x, cy, TOP_LEFT);
        canvas.draw_horizontal(x + 1, cy, w - 2, HORIZONTAL);
        canvas.set(x + w - 1, cy, TOP_RIGHT);
        cy += 1;

        canvas.set(x, cy, VERTICAL);
        canvas.draw_text_centered(x + 1, cy, w - 2, &placed.title);
        canvas.set(x + w - 1, cy, VERTICAL);
        cy += 1;

        let sections = [
            placed.class.attributes.iter().map(|a| a.label.as_str()).collect::<Vec<_>>(),
            placed.class.operations.iter().map(String::as_str).collect(),
        ];
        for lines in sections.iter().filter(|lines| !lines.is_empty()) {
            canvas.separator(x, cy, w);
            cy += 1;
            for line in lines {
                canvas.set(x, cy, VERTICAL);
                canvas.draw_text(x + 1 + self.box_padding, cy, line);
                canvas.set(x + w - 1, cy, VERTICAL);
                cy += 1;
            }
        }

        canvas.set(x, cy, BOTTOM_LEFT);
        canvas.draw_horizontal(x + 1, cy, w - 2, HORIZONTAL);
        canvas.set(x + w - 1, cy, BOTTOM_RIGHT);
    }

    /// `Author ◆─────── Book  [1 author | 0..* books]`
    fn relationship_line(edge: &RelationshipEdge) -> String {
        let (tail, line, head) = match edge.link_type {
            LinkType::Generalization => ('◁', '─', '─'),
            LinkType::Realization => ('─', '╌', '▷'),
            LinkType::Composition => ('◆', '─', '─'),
            LinkType::Aggregation => ('◇', '─', '─'),
            LinkType::Association => ('─', '─', '─'),
        };
        let mut text = format!(
            "{} {}{}{} {}",
            edge.source,
            tail,
            line.to_string().repeat(6),
            head,
            edge.target
        );
        let labels: Vec<&str> = [edge.tail_label.as_str(), edge.head_label.as_str()]
            .into_iter()
            .filter(|l| !l.is_empty())
            .collect();
        if !labels.is_empty() {
            text.push_str(&format!("  [{}]", labels.join(" | ")));
        }
        if let Some(through) = &edge.through {
            text.push_str(&format!(" through {}", through));
        }
        text
    }
}

impl Default for AsciiExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter<DiagramDatabase> for AsciiExporter {
    type Output = String;

    fn export(&self, database: &DiagramDatabase) -> Result<String> {
        let (placed, width, height) = self.layout(database);
        let mut sections = Vec::new();
        if !placed.is_empty() {
            let mut canvas = Canvas::new(width + 1, height + 1);
            for placed_box in &placed {
                self.draw_box(&mut canvas, placed_box);
            }
            sections.push(canvas.render().trim_end().to_string());
        }

        let lines: Vec<String> = database
            .relationships()
            .iter()
            .map(Self::relationship_line)
            .collect();
        if !lines.is_empty() {
            sections.push(lines.join("\n"));
        }
        Ok(sections.join("\n\n"))
    }

    fn name(&self) -> &'static str {
        "ascii"
    }

    fn format(&self) -> &'static str {
        "txt"
    }
}
