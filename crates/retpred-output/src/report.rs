//! Multi-section text reports.

use crate::TABLE_WIDTH;
use std::fmt;

/// One titled block of a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Section heading
    pub heading: String,
    /// Pre-rendered body text
    pub body: String,
}

/// A titled sequence of sections, printed top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Report title
    pub title: String,
    /// Sections in order
    pub sections: Vec<Section>,
}

impl Report {
    /// Create a new report.
    pub const fn new(title: String, sections: Vec<Section>) -> Self {
        Self { title, sections }
    }

    /// Section with the given heading.
    pub fn section(&self, heading: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.heading == heading)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "#".repeat(TABLE_WIDTH))?;
        writeln!(f, "# {}", self.title)?;
        writeln!(f, "{}", "#".repeat(TABLE_WIDTH))?;
        for section in &self.sections {
            writeln!(f)?;
            writeln!(f, "## {}", section.heading)?;
            writeln!(f)?;
            write!(f, "{}", section.body)?;
            if !section.body.ends_with('\n') {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// Builder for creating reports.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    title: Option<String>,
    sections: Vec<Section>,
}

impl ReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Append a section.
    pub fn section(mut self, heading: impl Into<String>, body: impl fmt::Display) -> Self {
        self.sections.push(Section {
            heading: heading.into(),
            body: body.to_string(),
        });
        self
    }

    /// Append a section in place.
    pub fn push_section(&mut self, heading: impl Into<String>, body: impl fmt::Display) {
        self.sections.push(Section {
            heading: heading.into(),
            body: body.to_string(),
        });
    }

    /// Build the report.
    pub fn build(self) -> Report {
        Report::new(
            self.title.unwrap_or_else(|| "retpred".to_string()),
            self.sections,
        )
    }
}
