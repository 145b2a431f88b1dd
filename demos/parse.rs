use miette::{miette, IntoDiagnostic};
use time::{macros::format_description, Date};
use weatherdata::ObservationStore;

fn main() -> miette::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let file = args.next().ok_or_else(|| miette!("Missing filename"))?;
    println!("opening {file}");
    let store = ObservationStore::load(&file)?;

    let format = format_description!("[year]-[month]-[day]");
    let from = match args.next() {
        Some(date) => Date::parse(&date, format).into_diagnostic()?,
        None => store.first_date().ok_or_else(|| miette!("{file} is empty"))?,
    };
    let to = match args.next() {
        Some(date) => Date::parse(&date, format).into_diagnostic()?,
        None => store.last_date().ok_or_else(|| miette!("{file} is empty"))?,
    };

    for day in store.average_per_day(from, to)? {
        println!("{day}");
    }
    for day in store.missing_per_day(from, to)? {
        println!("{day}");
    }
    println!("{}", store.approved_percentage(from, to)?);

    Ok(())
}
