use crate::numerical::BVP_linear::BVP_problem::SolutionSample;
use plotters::prelude::*;
use std::error::Error;

/// Draws every sample as a line on one PNG chart with a legend
pub fn plot_solutions(
    samples: &[&SolutionSample],
    filename: &str,
    caption: &str,
) -> Result<(), Box<dyn Error>> {
    if samples.is_empty() {
        return Err("nothing to plot".into());
    }
    let x_min = samples.iter().map(|s| s.x().min()).fold(f64::INFINITY, f64::min);
    let x_max = samples.iter().map(|s| s.x().max()).fold(f64::NEG_INFINITY, f64::max);
    let y_min = samples.iter().map(|s| s.y().min()).fold(f64::INFINITY, f64::min);
    let y_max = samples.iter().map(|s| s.y().max()).fold(f64::NEG_INFINITY, f64::max);
    let y_pad = 0.05 * (y_max - y_min).abs().max(1e-12);

    let root_area = BitMapBackend::new(filename, (800, 600)).into_drawing_area();
    root_area.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root_area)
        .caption(caption, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(x_min..x_max, (y_min - y_pad)..(y_max + y_pad))?;
    chart.configure_mesh().x_desc("x").y_desc("y").draw()?;

    for (col, sample) in samples.iter().enumerate() {
        let color = Palette99::pick(col);
        let series: Vec<(f64, f64)> = sample.points().collect();
        chart
            .draw_series(LineSeries::new(series, &color))?
            .label(format!(" {}", sample.method))
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], &Palette99::pick(col))
            });
    }
    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    root_area.present()?;
    Ok(())
}
