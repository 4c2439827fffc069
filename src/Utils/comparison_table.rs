//! Side by side table of the three solutions, printed with tabled.
use crate::numerical::BVP_linear::BVP_comparison::ComparisonReport;
use crate::numerical::BVP_linear::BVP_errors::BVPResult;
use crate::numerical::BVP_linear::BVP_utils::format_elapsed;
use tabled::{builder::Builder, settings::Style};

/// Rows x = a, a + table_step, ..., b; one column per method with the sample nearest to x.
/// A method that failed gets a column of "failed".
pub fn comparison_table(report: &ComparisonReport) -> BVPResult<String> {
    let xs = report.table_abscissas()?;
    let mut builder = Builder::default();
    let mut header = vec!["x".to_string()];
    header.extend(report.outcomes.iter().map(|o| o.method.to_string()));
    builder.push_record(header);
    for x in xs {
        let mut row = vec![format!("{:.2}", x)];
        for outcome in &report.outcomes {
            let cell = match &outcome.result {
                Ok(sample) => format!("{:.6}", sample.nearest(x).1),
                Err(_) => "failed".to_string(),
            };
            row.push(cell);
        }
        builder.push_record(row);
    }
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    Ok(table.to_string())
}

/// elapsed time and status of every method
pub fn timing_table(report: &ComparisonReport) -> String {
    let mut builder = Builder::default();
    builder.push_record(["method", "status", "points", "time"]);
    for outcome in &report.outcomes {
        let (status, points) = match &outcome.result {
            Ok(sample) => ("ok".to_string(), sample.len().to_string()),
            Err(e) => (e.to_string(), "-".to_string()),
        };
        builder.push_record([
            outcome.method.to_string(),
            status,
            points,
            format_elapsed(outcome.elapsed),
        ]);
    }
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::BVP_linear::BVP_comparison::LinearBVPTask;
    use crate::numerical::BVP_linear::BVP_problem::ProblemDefinition;

    #[test]
    fn test_table_layout() {
        let report = LinearBVPTask::new(ProblemDefinition::reference(), 0.1, 3).run();
        let table = comparison_table(&report).unwrap();
        assert!(table.contains("Shooting"));
        assert!(table.contains("Finite difference"));
        assert!(table.contains("Variational"));
        assert!(table.contains("0.60"));
        // boundary value of every method at x = 1
        assert_eq!(table.matches("2.000000").count(), 3);
        assert!(!table.contains("failed"));
    }

    #[test]
    fn test_failed_method_column() {
        let report = LinearBVPTask::new(ProblemDefinition::reference(), 0.07, 3).run();
        let table = comparison_table(&report).unwrap();
        assert_eq!(table.matches("failed").count(), 6);
        let timing = timing_table(&report);
        assert!(timing.contains("configuration error"));
    }
}
