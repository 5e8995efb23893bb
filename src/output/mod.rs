mod csv;
mod json;
mod text;

use peakdetect::{Detection, Extremum, Method, Peak};

pub use self::csv::CsvFormatter;
pub use self::json::JsonFormatter;
pub use self::text::TextFormatter;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Csv,
    Json,
}

/// Detection result for one input file
pub struct PeakReport {
    pub source: String,
    pub method: Method,
    pub samples: usize,
    pub detection: Detection,
}

impl PeakReport {
    /// Maxima and minima merged into one position-ordered list
    pub fn merged(&self) -> Vec<(Extremum, Peak)> {
        let peaks = &self.detection.peaks;
        let mut merged: Vec<(Extremum, Peak)> = peaks
            .maxima
            .iter()
            .map(|p| (Extremum::Maximum, *p))
            .chain(peaks.minima.iter().map(|p| (Extremum::Minimum, *p)))
            .collect();
        merged.sort_by(|a, b| a.1.position.total_cmp(&b.1.position));
        merged
    }
}

pub trait Formatter: Send {
    fn format(&self, report: &PeakReport) -> String;

    fn header(&self) -> Option<&'static str> {
        None
    }
}

pub fn create_formatter(format: OutputFormat, verbose: bool) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(verbose)),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}
