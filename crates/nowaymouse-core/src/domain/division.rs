//! Recursive screen-grid ("division") navigation.
//!
//! The screen is split into a grid of labelled cells.  Typing a cell's label
//! narrows the active region to that cell and, unless it was the last
//! configured level, splits the cell again with the next level's grid.  After
//! the last level the pointer target is the center of the final cell.
//!
//! ```text
//! level 0 (2×1, "A" "B")        level 1 (1×2, "X" "Y") inside "B"
//! +---------+---------+         +---------+---------+
//! |         |         |         |         |    X    |
//! |    A    |    B    |  "B" →  |         +---------+
//! |         |         |         |         |    Y    |
//! +---------+---------+         +---------+---------+
//! ```
//!
//! Cells are indexed row-major: label `k` sits in column `k % cols`, row
//! `k / cols`.  Coordinates are kept as `f64` so that deep recursion does not
//! accumulate integer truncation; only the final pointer target is rounded.
//!
//! Labels are matched by accumulating pressed key names into a buffer.  This
//! requires each level's label set to be prefix-free, which
//! [`DivisionGrid::new`] enforces.

use std::collections::HashMap;

use tracing::debug;

use super::config::{ConfigError, LevelConfig};

/// Minimum width and height, in pixels, of a cell at the deepest level.
pub const MIN_CELL_PIXELS: f64 = 5.0;

/// A position in screen pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Rounds to the nearest whole pixel.
    pub fn to_pixels(self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }
}

/// One level of the division: its grid shape, labels, and the size of the
/// region it subdivides.
#[derive(Debug, Clone)]
pub struct DivisionLevel {
    cols: u32,
    rows: u32,
    labels: Vec<String>,
    index: HashMap<String, usize>,
    longest_label: usize,
    area_width: f64,
    area_height: f64,
}

impl DivisionLevel {
    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Labels in row-major order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Length, in characters, of the longest label of this level.
    pub fn longest_label(&self) -> usize {
        self.longest_label
    }

    /// Width and height of the region this level subdivides.
    pub fn area(&self) -> (f64, f64) {
        (self.area_width, self.area_height)
    }

    /// Width and height of one cell of this level.
    pub fn box_size(&self) -> (f64, f64) {
        (
            self.area_width / f64::from(self.cols),
            self.area_height / f64::from(self.rows),
        )
    }

    /// Returns the row-major index of `label`, if it is one of this level's labels.
    pub fn lookup(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    /// Returns `(column, row)` for a row-major cell index.
    pub fn cell(&self, index: usize) -> (u32, u32) {
        let index = index as u32;
        (index % self.cols, index / self.cols)
    }
}

/// The validated, precomputed set of division levels for one screen size.
#[derive(Debug, Clone)]
pub struct DivisionGrid {
    levels: Vec<DivisionLevel>,
}

impl DivisionGrid {
    /// Builds the grid for a `width × height` screen.
    ///
    /// Labels are normalised to upper case so they compare equal to the key
    /// names produced by [`crate::keymap::code_to_name`].
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when there are no levels, a shape is not at
    /// least 1×1, a label count does not equal `cols × rows`, a label is empty,
    /// duplicated, or a prefix of another label on the same level, or the
    /// deepest cell is smaller than [`MIN_CELL_PIXELS`] on either axis.
    pub fn new(width: u32, height: u32, levels: &[LevelConfig]) -> Result<Self, ConfigError> {
        if levels.is_empty() {
            return Err(ConfigError::NoDivisionLevels);
        }

        let mut area_width = f64::from(width);
        let mut area_height = f64::from(height);
        let mut built = Vec::with_capacity(levels.len());

        for (level, config) in levels.iter().enumerate() {
            if config.cols < 1 || config.rows < 1 {
                return Err(ConfigError::InvalidGridShape {
                    level,
                    cols: config.cols,
                    rows: config.rows,
                });
            }
            let expected = (config.cols as usize) * (config.rows as usize);
            if config.labels.len() != expected {
                return Err(ConfigError::LabelCountMismatch {
                    level,
                    expected,
                    actual: config.labels.len(),
                });
            }

            let labels: Vec<String> = config
                .labels
                .iter()
                .map(|label| label.trim().to_ascii_uppercase())
                .collect();
            let index = index_labels(level, &labels)?;
            let longest_label = labels
                .iter()
                .map(|label| label.chars().count())
                .max()
                .unwrap_or(0);

            built.push(DivisionLevel {
                cols: config.cols,
                rows: config.rows,
                labels,
                index,
                longest_label,
                area_width,
                area_height,
            });

            area_width /= f64::from(config.cols);
            area_height /= f64::from(config.rows);
        }

        if area_width < MIN_CELL_PIXELS || area_height < MIN_CELL_PIXELS {
            return Err(ConfigError::CellTooSmall {
                width: area_width,
                height: area_height,
            });
        }

        Ok(Self { levels: built })
    }

    /// Number of levels.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Always `false`; a grid has at least one level.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level(&self, level: usize) -> Option<&DivisionLevel> {
        self.levels.get(level)
    }

    pub fn levels(&self) -> &[DivisionLevel] {
        &self.levels
    }

    /// Size of a cell at the deepest level.
    pub fn final_cell(&self) -> (f64, f64) {
        self.levels
            .last()
            .map(DivisionLevel::box_size)
            .unwrap_or((0.0, 0.0))
    }
}

/// Builds the label→index map for one level, rejecting empty, duplicated, and
/// prefix-overlapping labels.
fn index_labels(level: usize, labels: &[String]) -> Result<HashMap<String, usize>, ConfigError> {
    let mut index = HashMap::with_capacity(labels.len());
    for (i, label) in labels.iter().enumerate() {
        if label.is_empty() {
            return Err(ConfigError::EmptyLabel { level, index: i });
        }
        if index.insert(label.clone(), i).is_some() {
            return Err(ConfigError::DuplicateLabel {
                level,
                label: label.clone(),
            });
        }
    }
    for prefix in labels {
        if let Some(longer) = labels
            .iter()
            .find(|other| *other != prefix && other.starts_with(prefix.as_str()))
        {
            return Err(ConfigError::LabelPrefixConflict {
                level,
                prefix: prefix.clone(),
                label: longer.clone(),
            });
        }
    }
    Ok(index)
}

/// What the overlay should display for one active level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridView {
    pub level: u32,
    pub origin: Point,
    pub area_width: f64,
    pub area_height: f64,
    pub cols: u32,
    pub rows: u32,
}

/// Outcome of one key press while navigating.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// The navigator is not active; the press was not consumed.
    Ignored,
    /// The buffer is a possible prefix of a label; keep typing.
    Pending,
    /// A label matched on an intermediate level.  The pointer should warp to
    /// `target` and the overlay should show `next`.
    Descend { target: Point, next: GridView },
    /// A label matched on the last level.  Navigation is finished.
    Selected { target: Point },
    /// The buffer can no longer complete any label.  Navigation is finished.
    Aborted,
}

#[derive(Debug, Clone, PartialEq)]
enum DivisionState {
    Inactive,
    Active {
        level: usize,
        origin: Point,
        buffer: String,
    },
}

/// The grid-descent state machine.
///
/// Owns the immutable [`DivisionGrid`] and the mutable progress through it.
/// All methods are synchronous and allocation-light; the caller (the input
/// router) acts on the returned [`Step`].
#[derive(Debug, Clone)]
pub struct DivisionNavigator {
    grid: DivisionGrid,
    state: DivisionState,
}

impl DivisionNavigator {
    pub fn new(grid: DivisionGrid) -> Self {
        Self {
            grid,
            state: DivisionState::Inactive,
        }
    }

    pub fn grid(&self) -> &DivisionGrid {
        &self.grid
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, DivisionState::Active { .. })
    }

    /// Current level index, or `None` when inactive.
    pub fn level(&self) -> Option<usize> {
        match &self.state {
            DivisionState::Active { level, .. } => Some(*level),
            DivisionState::Inactive => None,
        }
    }

    /// Top-left corner of the region being subdivided, or `None` when inactive.
    pub fn origin(&self) -> Option<Point> {
        match &self.state {
            DivisionState::Active { origin, .. } => Some(*origin),
            DivisionState::Inactive => None,
        }
    }

    /// Keys typed so far on the current level, or `None` when inactive.
    pub fn buffer(&self) -> Option<&str> {
        match &self.state {
            DivisionState::Active { buffer, .. } => Some(buffer.as_str()),
            DivisionState::Inactive => None,
        }
    }

    /// Starts navigation at level 0 covering the whole screen.
    ///
    /// Calling this while already active restarts from level 0.
    pub fn enter(&mut self) -> GridView {
        self.state = DivisionState::Active {
            level: 0,
            origin: Point::ORIGIN,
            buffer: String::new(),
        };
        self.view(0, Point::ORIGIN)
    }

    /// Abandons navigation without producing a target.
    pub fn reset(&mut self) {
        self.state = DivisionState::Inactive;
    }

    /// Feeds the label text of one pressed key.
    pub fn press(&mut self, key_label: &str) -> Step {
        let DivisionState::Active {
            level,
            origin,
            buffer,
        } = &mut self.state
        else {
            return Step::Ignored;
        };

        let Some(current) = self.grid.levels.get(*level) else {
            self.state = DivisionState::Inactive;
            return Step::Aborted;
        };

        buffer.push_str(key_label);

        let Some(k) = current.lookup(buffer) else {
            if buffer.chars().count() >= current.longest_label {
                debug!(level = *level, buffer = %buffer, "no division label can match; aborting");
                self.state = DivisionState::Inactive;
                return Step::Aborted;
            }
            return Step::Pending;
        };

        let (col, row) = current.cell(k);
        let (box_w, box_h) = current.box_size();
        let refined = Point::new(
            origin.x + f64::from(col) * box_w,
            origin.y + f64::from(row) * box_h,
        );
        let target = Point::new(refined.x + box_w / 2.0, refined.y + box_h / 2.0);
        debug!(level = *level, label = %buffer, col, row, "division label matched");

        let next_level = *level + 1;
        if next_level >= self.grid.len() {
            self.state = DivisionState::Inactive;
            return Step::Selected { target };
        }

        *level = next_level;
        *origin = refined;
        buffer.clear();
        Step::Descend {
            target,
            next: self.view(next_level, refined),
        }
    }

    fn view(&self, level: usize, origin: Point) -> GridView {
        let current = &self.grid.levels[level];
        let (area_width, area_height) = current.area();
        GridView {
            level: level as u32,
            origin,
            area_width,
            area_height,
            cols: current.cols,
            rows: current.rows,
        }
    }
}
