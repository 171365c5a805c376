use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use rusty_frame::data::model::{Column, FloatData, IntData, Table};
use rusty_frame::data::writer::write_csv;
use rusty_frame::pipeline::DEFAULT_SOURCE;

/// Write a synthetic crime-report CSV for trying out `rusty-frame`.
#[derive(Parser)]
struct Args {
    /// Number of rows to generate.
    #[arg(long, default_value_t = 50_000)]
    rows: usize,

    /// Output file; parent directories are created.
    #[arg(long, default_value = DEFAULT_SOURCE)]
    output: PathBuf,

    /// PRNG seed.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

const AREAS: [&str; 8] = [
    "Central",
    "Rampart",
    "Southwest",
    "Hollenbeck",
    "Harbor",
    "Hollywood",
    "Wilshire",
    "Van Nuys",
];
const CRIME_CODES: [i64; 6] = [210, 310, 330, 510, 624, 740];
const SEXES: [&str; 3] = ["M", "F", "X"];
const DESCENTS: [&str; 7] = ["H", "W", "B", "O", "A", "X", "K"];

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

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n.max(1)
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len())]
    }

    /// True with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);

    let mut dr_no = Vec::with_capacity(args.rows);
    let mut date_rptd = Vec::with_capacity(args.rows);
    let mut area = Vec::with_capacity(args.rows);
    let mut crm_cd = Vec::with_capacity(args.rows);
    let mut age = Vec::with_capacity(args.rows);
    let mut sex = Vec::with_capacity(args.rows);
    let mut descent = Vec::with_capacity(args.rows);
    let mut lat = Vec::with_capacity(args.rows);
    let mut lon = Vec::with_capacity(args.rows);

    for i in 0..args.rows {
        dr_no.push(200_100_000 + i as i64);
        date_rptd.push(Some(format!(
            "{:02}/{:02}/{} 12:00:00 AM",
            1 + rng.below(12),
            1 + rng.below(28),
            2020 + rng.below(4)
        )));
        area.push(Some(rng.pick(&AREAS).to_string()));
        crm_cd.push(CRIME_CODES[rng.below(CRIME_CODES.len())]);
        // Age 0 marks "unknown victim" in the source data.
        age.push(if rng.chance(0.1) { 0 } else { 16 + rng.below(70) as i64 });
        sex.push((!rng.chance(0.05)).then(|| rng.pick(&SEXES).to_string()));
        descent.push((!rng.chance(0.05)).then(|| rng.pick(&DESCENTS).to_string()));

        let (y, x) = if rng.chance(0.01) {
            (0.0, 0.0)
        } else {
            (33.7 + rng.next_f64() * 0.6, -118.7 + rng.next_f64() * 0.6)
        };
        lat.push((y * 1e4).round() / 1e4);
        lon.push((x * 1e4).round() / 1e4);
    }

    let table = Table::from_columns([
        ("DR_NO", Column::Int(IntData::I64(dr_no))),
        ("Date Rptd", Column::Text(date_rptd)),
        ("AREA NAME", Column::Text(area)),
        ("Crm Cd", Column::Int(IntData::I64(crm_cd))),
        ("Vict Age", Column::Int(IntData::I64(age))),
        ("Vict Sex", Column::Text(sex)),
        ("Vict Descent", Column::Text(descent)),
        ("LAT", Column::Float(FloatData::F64(lat))),
        ("LON", Column::Float(FloatData::F64(lon))),
    ])?;

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    write_csv(&table, &args.output).with_context(|| format!("writing {}", args.output.display()))?;

    println!("Wrote {} rows to {}", table.n_rows(), args.output.display());
    Ok(())
}
