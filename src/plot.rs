//! Character-grid charts printed to the terminal.
//!
//! A [`Chart`] holds scatter and line series plus optional horizontal
//! reference lines, and renders them onto a fixed-size grid with y-axis tick
//! labels, an x-axis, a title and a legend. Points outside the axis limits
//! are clipped.

use std::fmt;

const Y_LABEL_WIDTH: usize = 9;

/// Marker drawn for each point of a scatter series.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Marker {
    Circle,
    Square,
    TriangleUp,
    TriangleDown,
}

impl Marker {
    pub fn symbol(self) -> char {
        match self {
            Marker::Circle => 'o',
            Marker::Square => 's',
            Marker::TriangleUp => '^',
            Marker::TriangleDown => 'v',
        }
    }

    /// Cycles through the markers, for charts with one series per model.
    pub fn nth(n: usize) -> Self {
        [
            Marker::Circle,
            Marker::Square,
            Marker::TriangleUp,
            Marker::TriangleDown,
        ][n % 4]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Style {
    Points(Marker),
    /// Consecutive points joined by straight segments of this character.
    Line(char),
}

impl Style {
    fn symbol(self) -> char {
        match self {
            Style::Points(marker) => marker.symbol(),
            Style::Line(c) => c,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Series {
    pub label: String,
    pub points: Vec<(f64, f64)>,
    pub style: Style,
}

#[derive(Clone, Debug)]
pub struct Chart {
    title: String,
    x_label: String,
    y_label: String,
    width: usize,
    height: usize,
    x_limits: Option<(f64, f64)>,
    y_limits: Option<(f64, f64)>,
    hlines: Vec<f64>,
    series: Vec<Series>,
}

impl Chart {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: String::new(),
            y_label: String::new(),
            width: 60,
            height: 20,
            x_limits: None,
            y_limits: None,
            hlines: Vec::new(),
            series: Vec::new(),
        }
    }

    /// Plot area in characters; clamped to at least 2x2.
    pub fn size(mut self, width: usize, height: usize) -> Self {
        self.width = width.max(2);
        self.height = height.max(2);
        self
    }

    pub fn x_label(mut self, label: impl Into<String>) -> Self {
        self.x_label = label.into();
        self
    }

    pub fn y_label(mut self, label: impl Into<String>) -> Self {
        self.y_label = label.into();
        self
    }

    pub fn x_limits(mut self, min: f64, max: f64) -> Self {
        self.x_limits = Some((min, max));
        self
    }

    pub fn y_limits(mut self, min: f64, max: f64) -> Self {
        self.y_limits = Some((min, max));
        self
    }

    /// Horizontal reference line across the whole plot area.
    pub fn hline(mut self, y: f64) -> Self {
        self.hlines.push(y);
        self
    }

    pub fn scatter<X, Y>(self, label: impl Into<String>, xs: X, ys: Y, marker: Marker) -> Self
    where
        X: IntoIterator<Item = f64>,
        Y: IntoIterator<Item = f64>,
    {
        let points = xs.into_iter().zip(ys).collect();
        self.series(label, points, Style::Points(marker))
    }

    pub fn line<X, Y>(self, label: impl Into<String>, xs: X, ys: Y, symbol: char) -> Self
    where
        X: IntoIterator<Item = f64>,
        Y: IntoIterator<Item = f64>,
    {
        let points = xs.into_iter().zip(ys).collect();
        self.series(label, points, Style::Line(symbol))
    }

    pub fn series(mut self, label: impl Into<String>, points: Vec<(f64, f64)>, style: Style) -> Self {
        self.series.push(Series {
            label: label.into(),
            points,
            style,
        });
        self
    }

    pub fn render(&self) -> String {
        self.to_string()
    }

    fn limits(&self) -> ((f64, f64), (f64, f64)) {
        let finite = || {
            self.series
                .iter()
                .flat_map(|s| s.points.iter())
                .filter(|(x, y)| x.is_finite() && y.is_finite())
        };
        let x_limits = self
            .x_limits
            .unwrap_or_else(|| padded(finite().map(|&(x, _)| x)));
        let y_limits = self.y_limits.unwrap_or_else(|| {
            padded(finite().map(|&(_, y)| y).chain(self.hlines.iter().copied()))
        });
        (x_limits, y_limits)
    }

    fn grid(&self, x_limits: (f64, f64), y_limits: (f64, f64)) -> Vec<Vec<char>> {
        let mut grid = vec![vec![' '; self.width]; self.height];
        let project = Projection {
            x_limits,
            y_limits,
            width: self.width,
            height: self.height,
        };

        for &y in &self.hlines {
            if let Some(row) = project.row(y) {
                grid[row].fill('-');
            }
        }

        // Lines first so that markers stay visible on top of them.
        for series in self.series.iter().filter(|s| matches!(s.style, Style::Line(_))) {
            let symbol = series.style.symbol();
            for pair in series.points.windows(2) {
                project.segment(pair[0], pair[1], |row, col| grid[row][col] = symbol);
            }
            if let [(x, y)] = series.points.as_slice() {
                if let Some((row, col)) = project.cell(*x, *y) {
                    grid[row][col] = symbol;
                }
            }
        }

        for series in self.series.iter().filter(|s| matches!(s.style, Style::Points(_))) {
            let symbol = series.style.symbol();
            for &(x, y) in &series.points {
                if let Some((row, col)) = project.cell(x, y) {
                    grid[row][col] = symbol;
                }
            }
        }

        grid
    }
}

impl fmt::Display for Chart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (x_limits, y_limits) = self.limits();
        let grid = self.grid(x_limits, y_limits);
        let pad = " ".repeat(Y_LABEL_WIDTH);

        if !self.title.is_empty() {
            writeln!(f, "{}{:^width$}", pad, self.title, width = self.width + 1)?;
        }
        if !self.y_label.is_empty() {
            writeln!(f, "{}", self.y_label)?;
        }

        let last = self.height - 1;
        for (i, row) in grid.iter().enumerate() {
            let tick = if i == 0 {
                format!("{:>8.2}", y_limits.1)
            } else if i == last {
                format!("{:>8.2}", y_limits.0)
            } else if i == last / 2 {
                format!("{:>8.2}", (y_limits.0 + y_limits.1) / 2.0)
            } else {
                " ".repeat(8)
            };
            let line: String = row.iter().collect();
            writeln!(f, "{} |{}", tick, line.trim_end())?;
        }

        writeln!(f, "{}+{}", pad, "-".repeat(self.width))?;
        let left = format!("{:.2}", x_limits.0);
        let right = format!("{:.2}", x_limits.1);
        let gap = (self.width + 1).saturating_sub(left.len() + right.len()).max(1);
        writeln!(f, "{}{}{}{}", pad, left, " ".repeat(gap), right)?;
        if !self.x_label.is_empty() {
            writeln!(f, "{}{:^width$}", pad, self.x_label, width = self.width + 1)?;
        }

        let labelled: Vec<&Series> = self.series.iter().filter(|s| !s.label.is_empty()).collect();
        if !labelled.is_empty() {
            let entries: Vec<String> = labelled
                .iter()
                .map(|s| format!("{} {}", s.style.symbol(), s.label))
                .collect();
            writeln!(f, "{}legend: {}", pad, entries.join("   "))?;
        }

        Ok(())
    }
}

/// Data range widened by 5% on each side, or by one unit when flat.
fn padded(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let margin = if max > min { (max - min) * 0.05 } else { 1.0 };
    (min - margin, max + margin)
}

struct Projection {
    x_limits: (f64, f64),
    y_limits: (f64, f64),
    width: usize,
    height: usize,
}

impl Projection {
    /// Fractional (column, row) position; row 0 is the top.
    fn position(&self, x: f64, y: f64) -> (f64, f64) {
        let (x0, x1) = self.x_limits;
        let (y0, y1) = self.y_limits;
        let col = (x - x0) / (x1 - x0) * (self.width - 1) as f64;
        let row = (y1 - y) / (y1 - y0) * (self.height - 1) as f64;
        (col, row)
    }

    fn to_cell(&self, col: f64, row: f64) -> Option<(usize, usize)> {
        let col = col.round();
        let row = row.round();
        let inside = (0.0..=(self.width - 1) as f64).contains(&col)
            && (0.0..=(self.height - 1) as f64).contains(&row);
        inside.then(|| (row as usize, col as usize))
    }

    fn cell(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let (col, row) = self.position(x, y);
        self.to_cell(col, row)
    }

    fn row(&self, y: f64) -> Option<usize> {
        let x = self.x_limits.0;
        self.cell(x, y).map(|(row, _)| row)
    }

    /// Calls `plot` for every in-bounds cell on the segment between two points.
    fn segment(&self, from: (f64, f64), to: (f64, f64), mut plot: impl FnMut(usize, usize)) {
        if !(from.0.is_finite() && from.1.is_finite() && to.0.is_finite() && to.1.is_finite()) {
            return;
        }
        let (c0, r0) = self.position(from.0, from.1);
        let (c1, r1) = self.position(to.0, to.1);
        // Bounded so that far off-screen endpoints stay cheap.
        let steps = (c1 - c0)
            .abs()
            .max((r1 - r0).abs())
            .ceil()
            .clamp(1.0, 4.0 * (self.width + self.height) as f64) as usize;

        for step in 0..=steps {
            let t = step as f64 / steps as f64;
            if let Some((row, col)) = self.to_cell(c0 + t * (c1 - c0), r0 + t * (r1 - r0)) {
                plot(row, col);
            }
        }
    }
}
