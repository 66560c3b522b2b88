use anyhow::{Context, Result};

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
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// True with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// Blank the cell now and then so the missing-data report has something to
/// count.
fn maybe_blank(rng: &mut SimpleRng, value: String) -> String {
    if rng.chance(0.05) {
        String::new()
    } else {
        value
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let regions = ["North", "South", "East", "West"];
    let n_rows = 200;

    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_data.csv".to_string());
    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {output_path}"))?;

    writer.write_record([
        "customer_id",
        "region",
        "age",
        "income",
        "spend",
        "visits",
        "subscribed",
    ])?;

    for i in 0..n_rows {
        let age = rng.gauss(41.0, 12.0).clamp(18.0, 90.0).round();
        let income = rng.gauss(52_000.0, 15_000.0).max(8_000.0);
        // Spend tracks income so the heatmap shows a visible correlation.
        let spend = (income * 0.08 + rng.gauss(0.0, 600.0)).max(0.0);
        let visits = (spend / 400.0 + rng.gauss(0.0, 2.0)).max(0.0).round();
        let subscribed = rng.chance(0.35);

        let record = [
            format!("C{i:04}"),
            rng.pick(&regions).to_string(),
            maybe_blank(&mut rng, format!("{age}")),
            maybe_blank(&mut rng, format!("{income:.2}")),
            maybe_blank(&mut rng, format!("{spend:.2}")),
            format!("{visits}"),
            if subscribed { "True" } else { "False" }.to_string(),
        ];
        writer.write_record(&record)?;
    }
    writer.flush()?;

    println!("Wrote {n_rows} rows to {output_path}");
    Ok(())
}
