//! Summary table across all benchmarks and sizes.
//!
//! Columns: Benchmark | Size | Executor | Seq (ms) | Par (ms) | Readback (ms)
//! | Speedup | w/ transfer | CV% | Verify

use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::harness::{format_size, DataPoint};

fn speedup_cell(speedup: f64) -> Cell {
    let text = format!("{speedup:.2}x");
    let color = if speedup >= 5.0 {
        Color::Green
    } else if speedup >= 2.0 {
        Color::Cyan
    } else if speedup >= 1.0 {
        Color::Yellow
    } else {
        Color::Red
    };
    Cell::new(text).fg(color).set_alignment(CellAlignment::Right)
}

fn right(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

pub fn build_table(data: &[DataPoint]) -> Table {
    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            [
                "Benchmark",
                "Size",
                "Executor",
                "Seq (ms)",
                "Par (ms)",
                "Readback (ms)",
                "Speedup",
                "w/ transfer",
                "CV%",
                "Verify",
            ]
            .into_iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
        );

    for dp in data {
        let executor = match dp.executor.device() {
            Some(info) => format!("{} ({})", info.name, info.kind),
            None => dp.executor.to_string(),
        };
        let verify = if dp.verification.passed() {
            Cell::new("PASSED").fg(Color::Green)
        } else {
            Cell::new(format!("FAILED ({})", dp.verification.errors)).fg(Color::Red)
        };

        table.add_row(vec![
            Cell::new(&dp.experiment),
            right(format_size(dp.size)),
            Cell::new(executor),
            right(format!("{:.3}", dp.sequential.mean)),
            right(format!("{:.3}", dp.parallel.mean)),
            right(
                dp.transfer
                    .as_ref()
                    .map_or_else(|| "-".to_string(), |t| format!("{:.3}", t.mean)),
            ),
            speedup_cell(dp.speedup),
            match dp.speedup_with_transfer {
                Some(s) => speedup_cell(s),
                None => right("-".to_string()),
            },
            right(format!("{:.1}", dp.parallel.cv_percent)),
            verify,
        ]);
    }
    table
}

pub fn render_summary(data: &[DataPoint]) {
    if data.is_empty() {
        println!("No results to display.");
        return;
    }
    println!("\n=== Summary ===");
    println!("{}", build_table(data));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiments::Executor;
    use crate::stats::compute_stats;
    use hetero_primitives::Verification;
    use std::collections::HashMap;

    fn point(name: &str, errors: usize) -> DataPoint {
        DataPoint {
            experiment: name.to_string(),
            size: 10_000,
            input_bytes: 40_000,
            executor: Executor::HostPool { threads: 8 },
            sequential: compute_stats(&[4.0]),
            parallel: compute_stats(&[1.0]),
            transfer: None,
            parallel_total: None,
            speedup: 4.0,
            speedup_with_transfer: None,
            verification: Verification::from_error_count(2, errors),
            samples: Vec::new(),
            metrics: HashMap::new(),
        }
    }

    #[test]
    fn test_table_rows() {
        let table = build_table(&[point("minmax", 0), point("selection-sort", 3)]);
        let text = table.to_string();
        assert!(text.contains("minmax"));
        assert!(text.contains("10K"));
        assert!(text.contains("4.00x"));
        assert!(text.contains("PASSED"));
        assert!(text.contains("FAILED (3)"));
    }
}
