use serde::Serialize;

use super::{Formatter, PeakReport};
use peakdetect::{Extremum, Method, Peak};

pub struct JsonFormatter;

#[derive(Serialize)]
struct JsonReport<'a> {
    file: &'a str,
    method: Method,
    samples: usize,
    maxima: &'a [Peak],
    minima: &'a [Peak],
    failures: Vec<JsonFailure>,
}

#[derive(Serialize)]
struct JsonFailure {
    kind: Extremum,
    position: f64,
    error: String,
}

impl Formatter for JsonFormatter {
    fn format(&self, report: &PeakReport) -> String {
        let detection = &report.detection;
        let json = JsonReport {
            file: &report.source,
            method: report.method,
            samples: report.samples,
            maxima: &detection.peaks.maxima,
            minima: &detection.peaks.minima,
            failures: detection
                .failures
                .iter()
                .map(|f| JsonFailure {
                    kind: f.candidate.kind,
                    position: f.candidate.peak.position,
                    error: f.error.to_string(),
                })
                .collect(),
        };
        // Plain data with string keys; serialization cannot fail
        serde_json::to_string(&json).unwrap_or_default()
    }
}
