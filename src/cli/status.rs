//! Status markers for per-record console lines.

use std::fmt;

use console::style;

/// Outcome shown at the start of a summary line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    /// Records were written.
    Saved,
    /// Something needs a look but the run went on.
    Attention,
    /// A record was dropped.
    Dropped,
    /// Secondary detail under a summary line.
    Detail,
}

impl Mark {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Saved => "✓",
            Self::Attention => "!",
            Self::Dropped => "✗",
            Self::Detail => "→",
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = style(self.symbol());
        let styled = match self {
            Self::Saved => symbol.green(),
            Self::Attention => symbol.yellow(),
            Self::Dropped => symbol.red(),
            Self::Detail => symbol.dim(),
        };
        write!(f, "{}", styled)
    }
}

/// Line reporting a record the detail fetcher dropped.
pub fn dropped_line(index: usize, url: &str, error: impl fmt::Display) -> String {
    format!("{} [{}] {}: {}", Mark::Dropped, index + 1, url, error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropped_lines_use_one_based_positions() {
        console::set_colors_enabled(false);
        assert_eq!(
            dropped_line(1, "https://shop.test/2", "navigation failed"),
            "✗ [2] https://shop.test/2: navigation failed"
        );
        assert_eq!(Mark::Detail.to_string(), "→");
    }
}
