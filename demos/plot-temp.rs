use miette::{miette, IntoDiagnostic};
use plotters::prelude::*;
use weatherdata::ObservationStore;

fn to_chrono(date: time::Date) -> miette::Result<chrono::NaiveDate> {
    chrono::NaiveDate::from_ymd_opt(date.year(), date.month() as u32, date.day() as u32)
        .ok_or_else(|| miette!("chrono can't represent {date}"))
}

/// Whole degrees around every value, never empty.
fn temperature_axis(points: &[(chrono::NaiveDate, f64)]) -> std::ops::Range<f64> {
    let (low, high) = points.iter().fold((f64::MAX, f64::MIN), |(low, high), (_, t)| {
        (low.min(*t), high.max(*t))
    });
    let (low, high) = (low.floor(), high.ceil());
    // a flat series still needs some height
    if high <= low {
        low..low + 1.0
    } else {
        low..high
    }
}

fn main() -> miette::Result<()> {
    env_logger::init();

    let input = std::env::args().nth(1).ok_or_else(|| miette!("Missing filename"))?;
    println!("opening {input}");
    let output = format!("{input}.png");
    let store = ObservationStore::load(&input)?;

    let (from, to) = store
        .first_date()
        .zip(store.last_date())
        .ok_or_else(|| miette!("{input} is empty"))?;
    let averages = store.average_per_day(from, to)?;

    let points = averages
        .iter()
        .map(|day| Ok((to_chrono(day.date)?, day.temperature)))
        .collect::<miette::Result<Vec<_>>>()?;

    let root = BitMapBackend::new(&output, (1920, 1080)).into_drawing_area();
    root.fill(&WHITE).into_diagnostic()?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Average temperature from {from} to {to}"),
            ("sans-serif", 60).into_font(),
        )
        .margin(5)
        .x_label_area_size(80)
        .y_label_area_size(80)
        .build_cartesian_2d(to_chrono(from)?..to_chrono(to)?, temperature_axis(&points))
        .into_diagnostic()?;

    chart.configure_mesh().draw().into_diagnostic()?;

    chart
        .draw_series(LineSeries::new(points, GREEN))
        .into_diagnostic()?
        .label("Average temperature")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GREEN));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .into_diagnostic()?;

    root.present().into_diagnostic()?;
    println!("wrote {output}");

    Ok(())
}
