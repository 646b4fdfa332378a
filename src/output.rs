//! Terminal rendering of prosody records.
//! Used by `prosody analyze` and `prosody tone` in text mode.

use crate::engine::record::ProsodyRecord;
use crate::engine::scheduler::EmissionStats;
use crate::engine::sink::RecordSink;
use crate::error::Result;
use owo_colors::OwoColorize;
use std::io::Write;
use std::time::Duration;

/// Time offset of the `index`-th record (zero-based) from stream start.
pub fn record_offset(index: u64, cycle_secs: f64) -> Duration {
    Duration::from_secs_f64((index + 1) as f64 * cycle_secs.max(0.0))
}

/// One human-readable line for `record`, without trailing newline.
pub fn format_record(record: &ProsodyRecord, offset: Duration, color: bool) -> String {
    let time = format!("{:>8.3}s", offset.as_secs_f64());
    let level = format!("{:>7.1} dB", record.rms_db);

    if record.is_silent {
        let label = "silent";
        return if color {
            format!("{}  {}  {}", time.dimmed(), label.dimmed(), level.dimmed())
        } else {
            format!("{}  {}  {}", time, label, level)
        };
    }

    let metrics = match (record.pitch, record.jitter, record.shimmer) {
        (Some(pitch), Some(jitter), Some(shimmer)) => format!(
            "{:>7.2} Hz  jitter {:>6.2}  shimmer {:.4}",
            pitch, jitter, shimmer
        ),
        _ => "      -- Hz  jitter     --  shimmer --".to_string(),
    };

    if record.pitch_detection_failed == Some(true) {
        let label = "held  ";
        if color {
            format!(
                "{}  {}  {}  {}",
                time.dimmed(),
                label.yellow(),
                metrics.yellow(),
                level
            )
        } else {
            format!("{}  {}  {}  {}", time, label, metrics, level)
        }
    } else {
        let label = "voiced";
        if color {
            format!("{}  {}  {}  {}", time.dimmed(), label.green(), metrics, level)
        } else {
            format!("{}  {}  {}  {}", time, label, metrics, level)
        }
    }
}

/// End-of-run summary line.
pub fn format_summary(stats: &EmissionStats, elapsed: Duration) -> String {
    format!(
        "{} records from {} of audio ({} not delivered)",
        stats.emitted,
        humantime::format_duration(Duration::from_millis(elapsed.as_millis() as u64)),
        stats.failed
    )
}

/// Writes one formatted line per record.
pub struct TextSink<W: Write + Send + 'static> {
    writer: W,
    cycle_secs: f64,
    color: bool,
    written: u64,
}

impl<W: Write + Send + 'static> TextSink<W> {
    /// `cycle_secs` is the audio time between two records.
    pub fn new(writer: W, cycle_secs: f64, color: bool) -> Self {
        Self {
            writer,
            cycle_secs,
            color,
            written: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send + 'static> RecordSink for TextSink<W> {
    fn handle(&mut self, record: &ProsodyRecord) -> Result<()> {
        let offset = record_offset(self.written, self.cycle_secs);
        writeln!(self.writer, "{}", format_record(record, offset, self.color))?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "text"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::record::{CycleOutcome, ProsodyMetrics};

    const METRICS: ProsodyMetrics = ProsodyMetrics {
        pitch: 220.18,
        jitter: 1.5,
        shimmer: 0.0125,
    };

    #[test]
    fn test_record_offset() {
        let offset = record_offset(0, 0.098_666);
        assert!((offset.as_secs_f64() - 0.098_666).abs() < 1e-9);
        assert!((record_offset(9, 0.1).as_secs_f64() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_format_silent_record() {
        let record = CycleOutcome::Silent { rms_db: -200.0 }.to_record();
        let line = format_record(&record, Duration::from_millis(100), false);
        assert!(line.contains("silent"));
        assert!(line.contains("-200.0 dB"));
        assert!(line.contains("0.100s"));
    }

    #[test]
    fn test_format_voiced_record() {
        let record = CycleOutcome::Detected {
            metrics: METRICS,
            period: 218,
            amplitude: 0.5,
            confidence: 0.97,
            rms_db: -9.0,
        }
        .to_record();
        let line = format_record(&record, Duration::from_secs(1), false);
        assert!(line.contains("voiced"));
        assert!(line.contains("220.18 Hz"));
        assert!(line.contains("jitter   1.50"));
        assert!(line.contains("shimmer 0.0125"));
    }

    #[test]
    fn test_format_failed_record() {
        let held = CycleOutcome::Failed {
            last_known: Some(METRICS),
            rms_db: -30.0,
        }
        .to_record();
        assert!(format_record(&held, Duration::ZERO, false).contains("held"));

        let empty = CycleOutcome::Failed {
            last_known: None,
            rms_db: -30.0,
        }
        .to_record();
        let line = format_record(&empty, Duration::ZERO, false);
        assert!(line.contains("-- Hz"));
    }

    #[test]
    fn test_colored_output_contains_escape_codes() {
        let record = CycleOutcome::Silent { rms_db: -80.0 }.to_record();
        let line = format_record(&record, Duration::ZERO, true);
        assert!(line.contains("\x1b["));
    }

    #[test]
    fn test_text_sink_writes_lines() {
        let mut sink = TextSink::new(Vec::new(), 0.1, false);
        sink.handle(&CycleOutcome::Silent { rms_db: -90.0 }.to_record())
            .unwrap();
        sink.handle(&CycleOutcome::Silent { rms_db: -91.0 }.to_record())
            .unwrap();
        sink.finish().unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("0.200s"));
    }

    #[test]
    fn test_format_summary() {
        let stats = EmissionStats {
            cycles: 20,
            emitted: 20,
            failed: 0,
        };
        let line = format_summary(&stats, Duration::from_secs(2));
        assert_eq!(line, "20 records from 2s of audio (0 not delivered)");
    }
}
