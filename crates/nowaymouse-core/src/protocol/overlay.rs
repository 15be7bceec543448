//! Text codec for overlay renderer commands.
//!
//! Wire format, one command per connection, no terminator required:
//! ```text
//! show,<level>,<originX>,<originY>,<areaW>,<areaH>,<cols>,<rows>
//! hide
//! ```
//! `level`, `cols` and `rows` are unsigned integers.  The four geometry fields
//! are decimal numbers in screen pixels; whole values are written without a
//! fractional part (`500`, not `500.0`).  Every `show` fully describes what to
//! draw, so the renderer needs no memory of earlier commands.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::domain::division::GridView;

/// Errors produced while parsing an overlay command line.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// The line has no recognised verb.
    #[error("unknown overlay command: {0:?}")]
    UnknownCommand(String),

    /// A `show` line has the wrong number of fields.
    #[error("show expects 7 fields, got {0}")]
    FieldCount(usize),

    /// A field could not be parsed as a number.
    #[error("invalid {field} value {value:?}")]
    InvalidField { field: &'static str, value: String },
}

/// Geometry of one grid for the renderer to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShowCommand {
    pub level: u32,
    pub origin_x: f64,
    pub origin_y: f64,
    pub area_width: f64,
    pub area_height: f64,
    pub cols: u32,
    pub rows: u32,
}

impl From<GridView> for ShowCommand {
    fn from(view: GridView) -> Self {
        Self {
            level: view.level,
            origin_x: view.origin.x,
            origin_y: view.origin.y,
            area_width: view.area_width,
            area_height: view.area_height,
            cols: view.cols,
            rows: view.rows,
        }
    }
}

/// A message to the overlay renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayCommand {
    Show(ShowCommand),
    Hide,
}

impl OverlayCommand {
    pub fn show(view: GridView) -> Self {
        OverlayCommand::Show(view.into())
    }

    /// Encodes the command as a single line without a trailing newline.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Parses one command line.  Surrounding whitespace and a trailing newline
    /// are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] if the verb is unknown, a `show` line does not
    /// have exactly seven fields, or a field is not a number of the expected
    /// kind.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let line = line.trim();
        if line == "hide" {
            return Ok(OverlayCommand::Hide);
        }
        let Some(rest) = line.strip_prefix("show,") else {
            return Err(ProtocolError::UnknownCommand(line.to_string()));
        };

        let fields: Vec<&str> = rest.split(',').map(str::trim).collect();
        let [level, x, y, w, h, cols, rows] = fields.as_slice() else {
            return Err(ProtocolError::FieldCount(fields.len()));
        };

        Ok(OverlayCommand::Show(ShowCommand {
            level: field("level", level)?,
            origin_x: field("originX", x)?,
            origin_y: field("originY", y)?,
            area_width: field("areaW", w)?,
            area_height: field("areaH", h)?,
            cols: field("cols", cols)?,
            rows: field("rows", rows)?,
        }))
    }
}

impl fmt::Display for OverlayCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // f64's Display already omits ".0" for whole numbers
            OverlayCommand::Show(cmd) => write!(
                f,
                "show,{},{},{},{},{},{},{}",
                cmd.level,
                cmd.origin_x,
                cmd.origin_y,
                cmd.area_width,
                cmd.area_height,
                cmd.cols,
                cmd.rows
            ),
            OverlayCommand::Hide => f.write_str("hide"),
        }
    }
}

fn field<T: FromStr>(name: &'static str, value: &str) -> Result<T, ProtocolError> {
    value.parse().map_err(|_| ProtocolError::InvalidField {
        field: name,
        value: value.to_string(),
    })
}
