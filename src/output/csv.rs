use super::{Formatter, PeakReport};

pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format(&self, report: &PeakReport) -> String {
        report
            .merged()
            .iter()
            .map(|(kind, peak)| {
                format!(
                    "{},{},{:.9},{:.9}",
                    report.source,
                    kind.as_str(),
                    peak.position,
                    peak.amplitude
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn header(&self) -> Option<&'static str> {
        Some("file,kind,position,amplitude")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::tests::report;

    #[test]
    fn test_csv_rows() {
        let text = CsvFormatter.format(&report());
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], "capture.wav,max,0.250000000,1.500000000");
        assert_eq!(rows[1], "capture.wav,min,0.750000000,-1.500000000");
    }
}
