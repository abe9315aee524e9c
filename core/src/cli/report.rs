use crate::api::ConversionSummary;
use std::fmt;

/// Text report formatter for a conversion run
pub struct TextReport<'a> {
    summary: &'a ConversionSummary,
}

impl<'a> TextReport<'a> {
    /// Creates a new text report
    pub fn new(summary: &'a ConversionSummary) -> Self {
        Self { summary }
    }
}

impl<'a> fmt::Display for TextReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Conversion Summary")?;
        writeln!(f, "==================")?;
        writeln!(f)?;
        writeln!(f, "Series:     {}", self.summary.series_count())?;
        writeln!(f, "Converted:  {}", self.summary.converted.len())?;
        writeln!(f, "Failed:     {}", self.summary.failed.len())?;

        for outcome in &self.summary.converted {
            writeln!(f)?;
            writeln!(f, "Series UID: {}", outcome.series_uid)?;
            writeln!(
                f,
                "  Description: {}",
                outcome.description.as_deref().unwrap_or("none")
            )?;
            writeln!(f, "  Files:       {}", outcome.file_count)?;
            writeln!(f, "  Volume:      {}", outcome.plan)?;
            writeln!(f, "  SUV:         {}", outcome.suv_applied)?;
            writeln!(f, "  Output:      {}", outcome.output.display())?;
        }

        if !self.summary.failed.is_empty() {
            writeln!(f)?;
            writeln!(f, "Failures")?;
            writeln!(f, "--------")?;
            for failure in &self.summary.failed {
                writeln!(f, "{}: {}", failure.series_uid, failure.reason)?;
            }
        }

        Ok(())
    }
}
