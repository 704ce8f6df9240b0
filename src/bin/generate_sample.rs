use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// Write a deterministic synthetic customer experience table.
#[derive(Debug, Parser)]
#[command(about)]
struct Args {
    /// Output file; `.parquet` writes Parquet, anything else CSV.
    #[arg(short, long, default_value = "customer_experience_data.csv")]
    output: PathBuf,

    /// Number of customers.
    #[arg(short, long, default_value_t = 1000)]
    rows: usize,

    /// PRNG seed.
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
}

#[derive(Debug, Serialize)]
struct Row {
    #[serde(rename = "Customer_ID")]
    customer_id: i64,
    #[serde(rename = "Age")]
    age: i64,
    #[serde(rename = "Gender")]
    gender: &'static str,
    #[serde(rename = "Location")]
    location: &'static str,
    #[serde(rename = "Num_Interactions")]
    num_interactions: i64,
    #[serde(rename = "Feedback_Score")]
    feedback_score: i64,
    #[serde(rename = "Products_Purchased")]
    products_purchased: i64,
    #[serde(rename = "Products_Viewed")]
    products_viewed: i64,
    #[serde(rename = "Time_Spent_on_Site")]
    time_spent_on_site: f64,
    #[serde(rename = "Satisfaction_Score")]
    satisfaction_score: i64,
    #[serde(rename = "Retention_Status")]
    retention_status: &'static str,
}

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

    /// Uniform integer in `lo..=hi`.
    fn range(&mut self, lo: i64, hi: i64) -> i64 {
        lo + (self.next_f64() * (hi - lo + 1) as f64) as i64
    }

    fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        items[(self.next_f64() * items.len() as f64) as usize % items.len()]
    }
}

fn generate(rows: usize, rng: &mut SimpleRng) -> Vec<Row> {
    let locations = ["Urban", "Suburban", "Rural"];
    let genders = ["Male", "Female"];

    (0..rows)
        .map(|i| {
            let satisfaction = rng.range(1, 10);
            let viewed = rng.range(1, 50);
            let purchased = rng.range(1, viewed.min(20));
            let time_spent = (5.0 + rng.next_f64() * 55.0 * 10.0).round() / 10.0;
            // Happier, more engaged customers churn less.
            let retain_chance = 0.2 + 0.06 * satisfaction as f64 + time_spent / 300.0;
            let retained = rng.next_f64() < retain_chance.min(0.95);
            Row {
                customer_id: i as i64 + 1,
                age: rng.range(18, 69),
                gender: rng.pick(&genders),
                location: rng.pick(&locations),
                num_interactions: rng.range(1, 20),
                feedback_score: rng.range(1, 5),
                products_purchased: purchased,
                products_viewed: viewed,
                time_spent_on_site: time_spent,
                satisfaction_score: satisfaction,
                retention_status: if retained { "Retained" } else { "Churned" },
            }
        })
        .collect()
}

fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV file")?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[Row]) -> Result<()> {
    let int_col = |f: fn(&Row) -> i64| Int64Array::from(rows.iter().map(f).collect::<Vec<_>>());
    let str_col =
        |f: fn(&Row) -> &'static str| StringArray::from(rows.iter().map(f).collect::<Vec<_>>());

    let schema = Arc::new(Schema::new(vec![
        Field::new("Customer_ID", DataType::Int64, false),
        Field::new("Age", DataType::Int64, false),
        Field::new("Gender", DataType::Utf8, false),
        Field::new("Location", DataType::Utf8, false),
        Field::new("Num_Interactions", DataType::Int64, false),
        Field::new("Feedback_Score", DataType::Int64, false),
        Field::new("Products_Purchased", DataType::Int64, false),
        Field::new("Products_Viewed", DataType::Int64, false),
        Field::new("Time_Spent_on_Site", DataType::Float64, false),
        Field::new("Satisfaction_Score", DataType::Int64, false),
        Field::new("Retention_Status", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(int_col(|r| r.customer_id)),
            Arc::new(int_col(|r| r.age)),
            Arc::new(str_col(|r| r.gender)),
            Arc::new(str_col(|r| r.location)),
            Arc::new(int_col(|r| r.num_interactions)),
            Arc::new(int_col(|r| r.feedback_score)),
            Arc::new(int_col(|r| r.products_purchased)),
            Arc::new(int_col(|r| r.products_viewed)),
            Arc::new(Float64Array::from(
                rows.iter().map(|r| r.time_spent_on_site).collect::<Vec<_>>(),
            )),
            Arc::new(int_col(|r| r.satisfaction_score)),
            Arc::new(str_col(|r| r.retention_status)),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut rng = SimpleRng::new(args.seed);
    let rows = generate(args.rows, &mut rng);

    let is_parquet = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("parquet"));
    if is_parquet {
        write_parquet(&args.output, &rows)?;
    } else {
        write_csv(&args.output, &rows)?;
    }

    log::info!("Wrote {} customers to {}", rows.len(), args.output.display());
    println!("Wrote {} customers to {}", rows.len(), args.output.display());
    Ok(())
}
