use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;
use hound::WavReader;

use peakdetect::Signal;

/// Load a signal from a WAV file or a text file, chosen by extension
pub fn load_signal<P: AsRef<Path>>(path: P, channel: u16) -> anyhow::Result<Signal> {
    let path = path.as_ref();
    let is_wav = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
    if is_wav {
        load_wav(path, channel)
    } else {
        load_text(path)
    }
}

/// Load one channel of a WAV file; positions are in seconds
///
/// Integer samples are scaled to [-1, 1).
pub fn load_wav<P: AsRef<Path>>(path: P, channel: u16) -> anyhow::Result<Signal> {
    let reader = WavReader::open(path.as_ref())
        .with_context(|| format!("opening {}", path.as_ref().display()))?;
    let spec = reader.spec();

    if channel >= spec.channels {
        anyhow::bail!(
            "channel {} requested but the file has {} channel(s)",
            channel,
            spec.channels
        );
    }

    let interleaved = read_samples(reader, &spec)?;
    let amplitudes: Vec<f64> = interleaved
        .iter()
        .skip(channel as usize)
        .step_by(spec.channels as usize)
        .copied()
        .collect();
    let sample_rate = spec.sample_rate as f64;
    let positions = (0..amplitudes.len()).map(|i| i as f64 / sample_rate).collect();

    log::info!(
        "{}: {} samples at {} Hz, channel {}",
        path.as_ref().display(),
        amplitudes.len(),
        spec.sample_rate,
        channel
    );
    Ok(Signal::new(positions, amplitudes)?)
}

fn read_samples(
    mut reader: WavReader<BufReader<File>>,
    spec: &hound::WavSpec,
) -> anyhow::Result<Vec<f64>> {
    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            let max_val = 2_i64.pow(spec.bits_per_sample as u32 - 1) as f64;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f64 / max_val))
                .collect::<Result<Vec<_>, _>>()?
        }
    };
    Ok(samples)
}

/// Load a text file with one sample per line
///
/// A line holds either an amplitude, or a position and an amplitude,
/// separated by commas and/or whitespace. Blank lines and `#` comments are
/// skipped. With one column the positions are the sample indices.
pub fn load_text<P: AsRef<Path>>(path: P) -> anyhow::Result<Signal> {
    let text = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("reading {}", path.as_ref().display()))?;
    parse_text(&text).with_context(|| format!("parsing {}", path.as_ref().display()))
}

fn parse_text(text: &str) -> anyhow::Result<Signal> {
    let mut columns: Option<usize> = None;
    let mut positions = Vec::new();
    let mut amplitudes = Vec::new();

    for (number, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let values = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|field| !field.is_empty())
            .map(|field| {
                field
                    .parse::<f64>()
                    .with_context(|| format!("line {}: invalid number {:?}", number + 1, field))
            })
            .collect::<anyhow::Result<Vec<f64>>>()?;

        match (values.len(), columns) {
            (1 | 2, None) => columns = Some(values.len()),
            (n, Some(expected)) if n == expected => {}
            (n, _) => anyhow::bail!("line {}: expected 1 or 2 columns, got {}", number + 1, n),
        }

        if let [position, amplitude] = values[..] {
            positions.push(position);
            amplitudes.push(amplitude);
        } else {
            amplitudes.push(values[0]);
        }
    }

    let signal = match columns {
        Some(2) => Signal::new(positions, amplitudes)?,
        _ => Signal::from_amplitudes(amplitudes)?,
    };
    Ok(signal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_column() {
        let signal = parse_text("# amplitude\n1.0\n2.5\n\n-3\n").unwrap();
        assert_eq!(signal.positions(), &[0.0, 1.0, 2.0]);
        assert_eq!(signal.amplitudes(), &[1.0, 2.5, -3.0]);
    }

    #[test]
    fn test_parse_two_columns() {
        let signal = parse_text("0.0, 1.0\n0.5,2.0  # comment\n1.0\t3.0\n").unwrap();
        assert_eq!(signal.positions(), &[0.0, 0.5, 1.0]);
        assert_eq!(signal.amplitudes(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_parse_rejects_mixed_columns() {
        assert!(parse_text("1.0\n2.0 3.0\n").is_err());
        assert!(parse_text("1 2 3\n").is_err());
        assert!(parse_text("1.0\nabc\n").is_err());
    }

    #[test]
    fn test_parse_rejects_decreasing_positions() {
        assert!(parse_text("1.0 0.0\n0.5 1.0\n").is_err());
    }
}
