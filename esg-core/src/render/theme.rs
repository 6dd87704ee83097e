use serde::{Deserialize, Serialize};
use std::fmt;

const PLOTLY: &[&str] = &[
    "#636EFA", "#EF553B", "#00CC96", "#AB63FA", "#FFA15A", "#19D3F3", "#FF6692", "#B6E880",
    "#FF97FF", "#FECB52",
];

const BOLD: &[&str] = &[
    "rgb(127, 60, 141)",
    "rgb(17, 165, 121)",
    "rgb(57, 105, 172)",
    "rgb(242, 183, 1)",
    "rgb(231, 63, 116)",
    "rgb(128, 186, 90)",
    "rgb(230, 131, 16)",
    "rgb(0, 134, 149)",
    "rgb(207, 28, 144)",
    "rgb(249, 123, 114)",
    "rgb(165, 170, 153)",
];

const GOVERNANCE: &[&str] = &["#FF5733", "#33FF57", "#3357FF"];

const LEGACY: &[&str] = &["royalblue"];

/// Dashboard section a panel belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Legacy,
    Economic,
    Social,
    Governance,
}

impl Category {
    pub const PANELS: [Category; 3] = [Category::Economic, Category::Social, Category::Governance];

    pub fn title(self) -> &'static str {
        match self {
            Category::Legacy => "ESG Dashboard",
            Category::Economic => "Economic",
            Category::Social => "Social",
            Category::Governance => "Governance",
        }
    }

    pub fn theme(self) -> Theme {
        let palette = match self {
            Category::Legacy => LEGACY,
            Category::Economic => PLOTLY,
            Category::Social => BOLD,
            Category::Governance => GOVERNANCE,
        };
        Theme {
            category: self,
            palette,
            template: "plotly_dark",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Colour sequence and chart template handed to a charting backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub category: Category,
    pub palette: &'static [&'static str],
    pub template: &'static str,
}

impl Theme {
    /// Colour for the n-th series, cycling through the palette.
    pub fn colour(&self, index: usize) -> &'static str {
        self.palette[index % self.palette.len()]
    }

    pub fn accent(&self) -> &'static str {
        self.colour(0)
    }
}
