//! Text and JSON rendering of query results for the CLI
use crate::catalog::{Brand, Gear};
use crate::cli::OutputFormat;
use crate::error::Result;
use crate::index::IndexStatus;
use crate::search::{Alternative, CatalogStats, CategoryView, GearDetail, Suggestion};
use colored::*;
use serde::Serialize;
use std::fmt::Write;

/// Human-readable rendering of a result set
pub trait TextRender {
    fn render_text(&self) -> String;
}

/// Renders `value` as pretty JSON or coloured text.
pub fn render<T>(value: &T, format: OutputFormat) -> Result<String>
where
    T: TextRender + Serialize + ?Sized,
{
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Text => Ok(value.render_text()),
    }
}

fn weight(gear: &Gear) -> String {
    gear.weight_grams
        .map_or_else(|| "? g".to_string(), |g| format!("{g} g"))
}

fn price(gear: &Gear) -> String {
    gear.price_minor
        .map_or_else(|| "?".to_string(), |p| format!("{}.{:02}", p / 100, p % 100))
}

fn gear_line(gear: &Gear) -> String {
    format!(
        "{} {} ({}, {})",
        gear.id.to_string().dimmed(),
        gear.name.bold(),
        weight(gear),
        price(gear)
    )
}

impl TextRender for [Suggestion] {
    fn render_text(&self) -> String {
        if self.is_empty() {
            return "No matches found".yellow().to_string();
        }
        let mut out = String::new();
        for s in self {
            let how = match (s.tier, s.via_brand) {
                (_, true) => format!("{:?} via brand", s.tier).to_lowercase(),
                (tier, false) => format!("{tier:?}").to_lowercase(),
            };
            let _ = writeln!(
                out,
                "{} {} [{}, d={}]",
                gear_line(&s.gear),
                s.brand_name.cyan(),
                how,
                s.distance
            );
        }
        out
    }
}

impl TextRender for [Alternative] {
    fn render_text(&self) -> String {
        if self.is_empty() {
            return "No alternatives found".yellow().to_string();
        }
        let mut out = String::new();
        for (rank, alt) in self.iter().enumerate() {
            let tier = match alt.tier {
                crate::search::Tier::SameProductType => "same type".green(),
                crate::search::Tier::SameSubcategory => "related type".yellow(),
            };
            let _ = writeln!(
                out,
                "{:>3}. {} score={:.4} [{}]",
                rank + 1,
                gear_line(&alt.gear),
                alt.score,
                tier
            );
        }
        out
    }
}

impl TextRender for GearDetail {
    fn render_text(&self) -> String {
        let mut out = format!("{} {}\n", gear_line(&self.gear), self.brand_name.cyan());
        for (key, value) in &self.gear.attributes {
            let _ = writeln!(out, "  {} {value}", format!("{key}:").dimmed());
        }
        if !self.insights.is_empty() {
            let _ = writeln!(out, "{}", "Insights".green().bold());
        }
        for insight in &self.insights {
            match &insight.category {
                Some(category) => {
                    let _ = writeln!(out, "  {} [{}]", insight.summary.bold(), category);
                }
                None => {
                    let _ = writeln!(out, "  {}", insight.summary.bold());
                }
            }
            let _ = writeln!(out, "    {}", insight.content);
        }
        out
    }
}

impl TextRender for [Gear] {
    fn render_text(&self) -> String {
        if self.is_empty() {
            return "No gear found".yellow().to_string();
        }
        self.iter().map(|g| gear_line(g) + "\n").collect()
    }
}

impl TextRender for [Brand] {
    fn render_text(&self) -> String {
        if self.is_empty() {
            return "No brands found".yellow().to_string();
        }
        let mut out = String::new();
        for brand in self {
            match &brand.country {
                Some(country) => {
                    let _ = writeln!(out, "{} ({})", brand.name.bold(), country);
                }
                None => {
                    let _ = writeln!(out, "{}", brand.name.bold());
                }
            }
        }
        out
    }
}

impl TextRender for [CategoryView] {
    fn render_text(&self) -> String {
        let mut out = String::new();
        for category in self {
            let _ = writeln!(out, "{}", category.name.bold());
            for sub in &category.subcategories {
                let _ = writeln!(out, "  {}", sub.name);
                for pt in &sub.product_types {
                    let _ = writeln!(out, "    {}", pt.dimmed());
                }
            }
        }
        out
    }
}

impl TextRender for CatalogStats {
    fn render_text(&self) -> String {
        format!(
            "{}\n  gear:          {}\n  brands:        {}\n  categories:    {}\n  subcategories: {}\n  product types: {}\n  insights:      {}\n",
            "Catalog".green().bold(),
            self.gear_count,
            self.brand_count,
            self.category_count,
            self.subcategory_count,
            self.product_type_count,
            self.insight_count
        )
    }
}

impl TextRender for IndexStatus {
    fn render_text(&self) -> String {
        let state = if self.ready {
            format!("ready (v{})", self.version).green()
        } else {
            "not ready".red()
        };
        let mut out = format!(
            "Index {state}: {} gear, {} brands\n",
            self.gear_count, self.brand_count
        );
        if let Some(err) = &self.last_error {
            let _ = writeln!(out, "  last refresh error: {}", err.red());
        }
        out
    }
}

impl<T> TextRender for Vec<T>
where
    [T]: TextRender,
{
    fn render_text(&self) -> String {
        self.as_slice().render_text()
    }
}
