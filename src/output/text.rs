use std::fmt::Write;

use rolling_stats::Stats;

use super::{Formatter, PeakReport};
use peakdetect::{Extremum, Peak};

pub struct TextFormatter {
    verbose: bool,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, report: &PeakReport) -> String {
        let detection = &report.detection;
        let mut out = String::new();

        let _ = writeln!(
            out,
            "{} ({}, {} samples): {} maxima, {} minima",
            report.source,
            report.method,
            report.samples,
            detection.peaks.maxima.len(),
            detection.peaks.minima.len()
        );
        for (kind, peak) in report.merged() {
            let _ = writeln!(
                out,
                "  {}  {:>16.9}  {:>16.6}",
                kind.as_str(),
                peak.position,
                peak.amplitude
            );
        }

        if self.verbose {
            for kind in [Extremum::Maximum, Extremum::Minimum] {
                summarize(&mut out, kind, detection.peaks.of_kind(kind));
            }
        }

        for failure in &detection.failures {
            let _ = writeln!(
                out,
                "  not refined: {} at {}: {}",
                failure.candidate.kind.as_str(),
                failure.candidate.peak.position,
                failure.error
            );
        }

        out.trim_end().to_string()
    }
}

fn summarize(out: &mut String, kind: Extremum, peaks: &[Peak]) {
    let mut amplitude: Stats<f64> = Stats::new();
    let mut spacing: Stats<f64> = Stats::new();
    for peak in peaks {
        amplitude.update(peak.amplitude);
    }
    for pair in peaks.windows(2) {
        spacing.update(pair[1].position - pair[0].position);
    }

    if amplitude.count > 0 {
        let _ = writeln!(
            out,
            "  {} amplitude: {:.6} ± {:.6} (range {:.6} .. {:.6})",
            kind.as_str(),
            amplitude.mean,
            amplitude.std_dev,
            amplitude.min,
            amplitude.max
        );
    }
    if spacing.count > 0 {
        let _ = writeln!(
            out,
            "  {} spacing:   {:.9} ± {:.9} (frequency {:.6})",
            kind.as_str(),
            spacing.mean,
            spacing.std_dev,
            1.0 / spacing.mean
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::tests::report;

    #[test]
    fn test_text_lists_peaks() {
        let text = TextFormatter::new(false).format(&report());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("capture.wav (parabola, 1000 samples)"));
        assert!(lines[1].trim_start().starts_with("max"));
        assert!(lines[2].trim_start().starts_with("min"));
    }

    #[test]
    fn test_verbose_adds_statistics() {
        let text = TextFormatter::new(true).format(&report());
        assert!(text.contains("max amplitude: 1.450000"), "{}", text);
        assert!(text.contains("max spacing:   1.000000000"), "{}", text);
        // A single minimum has no spacing
        assert!(!text.contains("min spacing"));
    }
}
