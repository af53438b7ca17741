use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform in `[lo, hi)`.
    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

/// A grade on the 1–10 scale with two decimals.
fn grade(value: f64) -> f64 {
    (value.clamp(1.0, 10.0) * 100.0).round() / 100.0
}

struct SampleRow {
    name: String,
    class: String,
    subject: String,
    evaluation: Option<f64>,
    mock: Option<f64>,
    final_score: Option<f64>,
}

fn generate_rows(rng: &mut SimpleRng) -> Vec<SampleRow> {
    let classes = ["12A", "12B", "12C"];
    let subjects = ["Matematica", "Romana", "Informatica"];
    let first_names = ["Ana", "Bogdan", "Carmen", "Dan", "Elena", "Florin", "Gabriela"];

    let mut rows = Vec::new();
    for (c, class) in classes.iter().enumerate() {
        for (n, first) in first_names.iter().enumerate() {
            let name = format!("{first} {}", (b'A' + c as u8) as char);
            let ability = rng.range(4.0, 9.0);
            for subject in &subjects {
                let evaluation = grade(ability + rng.range(-1.0, 1.0));
                let mock = grade(evaluation + rng.range(-0.5, 1.5));
                let final_score = grade(mock + rng.range(-0.5, 1.5));
                rows.push(SampleRow {
                    name: name.clone(),
                    class: class.to_string(),
                    subject: subject.to_string(),
                    evaluation: Some(evaluation),
                    // a few students skipped the mock exam
                    mock: (n % 5 != 3).then_some(mock),
                    final_score: Some(final_score),
                });
            }
        }
    }
    rows
}

/// Headers as they tend to appear in exported school spreadsheets.
const HEADERS: [&str; 7] = [
    " Nume",
    "Clasa\n",
    "Proba",
    "Evaluare ",
    "Simulare",
    "Bacalaureat",
    "Observatii",
];

fn write_csv(rows: &[SampleRow], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    writer.write_record(HEADERS).context("writing CSV header")?;
    for (i, row) in rows.iter().enumerate() {
        let score = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
        // one unparseable final score, as typed by hand
        let final_score = if i == 4 {
            "absent".to_string()
        } else {
            score(row.final_score)
        };
        writer
            .write_record([
                row.name.as_str(),
                row.class.as_str(),
                row.subject.as_str(),
                score(row.evaluation).as_str(),
                score(row.mock).as_str(),
                final_score.as_str(),
                "",
            ])
            .with_context(|| format!("writing CSV row {i}"))?;
    }
    writer.flush().context("flushing CSV file")?;
    Ok(())
}

fn write_parquet(rows: &[SampleRow], path: &Path) -> Result<()> {
    let text = |f: fn(&SampleRow) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let number = |f: fn(&SampleRow) -> Option<f64>| -> ArrayRef {
        Arc::new(Float64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new(HEADERS[0], DataType::Utf8, false),
        Field::new(HEADERS[1], DataType::Utf8, false),
        Field::new(HEADERS[2], DataType::Utf8, false),
        Field::new(HEADERS[3], DataType::Float64, true),
        Field::new(HEADERS[4], DataType::Float64, true),
        Field::new(HEADERS[5], DataType::Float64, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            text(|r| r.name.as_str()),
            text(|r| r.class.as_str()),
            text(|r| r.subject.as_str()),
            number(|r| r.evaluation),
            number(|r| r.mock),
            number(|r| r.final_score),
        ],
    )
    .context("creating RecordBatch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(&mut rng);
    log::debug!("Generated {} rows", rows.len());

    let csv_path = Path::new("sample_scores.csv");
    let parquet_path = Path::new("sample_scores.parquet");
    write_csv(&rows, csv_path)?;
    write_parquet(&rows, parquet_path)?;

    println!(
        "Wrote {} score rows to {} and {}",
        rows.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
