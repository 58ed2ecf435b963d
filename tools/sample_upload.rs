//! Sample Upload Generator
//!
//! Writes a CSV with the expected feature columns for exercising the form.
//!
//! Usage: `sample-upload [output.csv] [rows] [fraud_rate] [extra_column]`

use atm_fraud_detection::schema::EXPECTED_COLUMNS;
use rand::Rng;
use std::io::Write;
use tracing::info;

/// Random feature rows shaped like the training data
struct RowGenerator {
    rng: rand::rngs::ThreadRng,
    row_counter: u64,
}

impl RowGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
            row_counter: 0,
        }
    }

    /// Typical withdrawal: scores low, turnaround times short
    fn generate_legitimate(&mut self) -> Vec<String> {
        self.row_counter += 1;
        EXPECTED_COLUMNS
            .iter()
            .map(|column| {
                let value = match *column {
                    c if c.starts_with("Per") || c.starts_with("Dem") => self.rng.gen_range(0.0..1.0),
                    c if c.starts_with("Cred") => self.rng.gen_range(0.0..0.6),
                    "Normalised_FNT" => self.rng.gen_range(-1.0..0.5),
                    "geo_score_mean" | "geo_score_max" => self.rng.gen_range(-0.5..0.3),
                    "instance_score_mean" | "instance_score_max" => self.rng.gen_range(0.0..0.3),
                    "lambda_wt" => self.rng.gen_range(0.0..1.5),
                    _ => self.rng.gen_range(0.0..0.4),
                };
                format!("{value:.4}")
            })
            .collect()
    }

    /// Suspicious withdrawal: high geo/instance scores, long turnaround
    fn generate_suspicious(&mut self) -> Vec<String> {
        self.row_counter += 1;
        EXPECTED_COLUMNS
            .iter()
            .map(|column| {
                let value = match *column {
                    c if c.starts_with("Per") || c.starts_with("Dem") => self.rng.gen_range(0.0..1.0),
                    c if c.starts_with("Cred") => self.rng.gen_range(0.4..1.0),
                    "Normalised_FNT" => self.rng.gen_range(0.0..2.0),
                    "geo_score_mean" | "geo_score_max" => self.rng.gen_range(0.3..1.5),
                    "instance_score_mean" | "instance_score_max" => self.rng.gen_range(0.3..1.0),
                    "lambda_wt" => self.rng.gen_range(1.0..4.0),
                    _ => self.rng.gen_range(0.4..1.0),
                };
                format!("{value:.4}")
            })
            .collect()
    }

    fn row_id(&self) -> String {
        format!("txn_{:08}", self.row_counter)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sample_upload=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let output = args.get(1).map(|s| s.as_str()).unwrap_or("-");
    let count: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(100);
    let fraud_rate: f64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(0.1);
    let extra_column = args.get(4).cloned();

    info!(
        output = %output,
        count = count,
        fraud_rate = fraud_rate,
        extra_column = ?extra_column,
        "Generating sample upload"
    );

    let sink: Box<dyn Write> = if output == "-" {
        Box::new(std::io::stdout())
    } else {
        Box::new(std::fs::File::create(output)?)
    };
    let mut writer = csv::Writer::from_writer(sink);

    let mut header: Vec<String> = extra_column.iter().cloned().collect();
    header.extend(EXPECTED_COLUMNS.iter().map(|c| c.to_string()));
    writer.write_record(&header)?;

    let mut generator = RowGenerator::new();
    let mut rng = rand::thread_rng();
    let mut legitimate_count = 0;
    let mut suspicious_count = 0;

    for _ in 0..count {
        let features = if rng.gen_bool(fraud_rate.clamp(0.0, 1.0)) {
            suspicious_count += 1;
            generator.generate_suspicious()
        } else {
            legitimate_count += 1;
            generator.generate_legitimate()
        };

        let mut record: Vec<String> = Vec::with_capacity(header.len());
        if extra_column.is_some() {
            record.push(generator.row_id());
        }
        record.extend(features);
        writer.write_record(&record)?;
    }
    writer.flush()?;

    info!(
        "Completed! Wrote {} rows ({} legitimate, {} suspicious)",
        count, legitimate_count, suspicious_count
    );

    Ok(())
}
