use aeroforecast::{
    AeroForecastConfig, FjallStore, MultiLocationAggregator, OpenMeteoClient, TtlCache,
    WeatherGateway, hourly,
};
use anyhow::{Context, Result, bail};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &AeroForecastConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn usage() -> ! {
    eprintln!("usage: aeroforecast <location>");
    eprintln!("       aeroforecast --compare <location>,<location>,...");
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AeroForecastConfig::load()?;
    init_tracing(&config);

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        usage();
    }

    let store = Arc::new(
        FjallStore::open(config.cache_dir())
            .with_context(|| "Failed to open cache database")?,
    );
    let cache = TtlCache::new(Arc::clone(&store), &config.cache);
    let api = OpenMeteoClient::new(&config.weather)?;
    let gateway = WeatherGateway::new(api, cache);
    let units = config.units.system;

    if args[0] == "--compare" {
        let Some(names) = args.get(1) else { usage() };
        return compare(&gateway, names, units).await;
    }

    let query = args.join(" ");
    let locations = gateway.search_locations(&query).await?;
    let Some(location) = locations.first() else {
        bail!("No locations found for '{query}'");
    };

    let current = gateway
        .current_weather(location.latitude, location.longitude)
        .await?
        .in_units(units);
    println!(
        "{} ({}): {:.0}{} , {} - feels like {:.0}{}",
        location.display_name(),
        location.country,
        current.temperature,
        units.temperature_suffix(),
        current.description,
        current.feels_like,
        units.temperature_suffix(),
    );
    println!(
        "  humidity {:.0}%  wind {:.0} {}  pressure {:.0} hPa  UV {:.1}",
        current.humidity,
        current.wind_speed,
        units.wind_suffix(),
        current.pressure,
        current.uv_index,
    );
    if let Some(category) = current.air_quality_category() {
        println!(
            "  air quality: {} ({:.0})",
            category.label(),
            current.air_quality_index.unwrap_or_default()
        );
    }

    let week = gateway
        .weekly_forecast(location.latitude, location.longitude)
        .await?;
    println!("\nWeek:");
    for day in &week {
        let day = day.in_units(units);
        println!(
            "  {:<9} {:>3.0}{} / {:>3.0}{}  {:<13} precip {:.0}%",
            day.day,
            day.high,
            units.temperature_suffix(),
            day.low,
            units.temperature_suffix(),
            day.condition.label(),
            day.precipitation,
        );
    }

    let series = gateway
        .hourly_forecast(location.latitude, location.longitude)
        .await?;
    let day_labels: Vec<String> = week.iter().map(|d| d.day.clone()).collect();
    let window = hourly::window_for(&series, "Today", &day_labels, hourly::current_local_time());
    println!("\nToday, hour by hour:");
    for record in window {
        let record = record.in_units(units);
        println!(
            "  {:>5}  {:>3.0}{}  {:<13} wind {:.0} {}",
            record.time,
            record.temperature,
            units.temperature_suffix(),
            record.condition.label(),
            record.wind_speed,
            units.wind_suffix(),
        );
    }

    Ok(())
}

async fn compare(
    gateway: &WeatherGateway<Arc<FjallStore>>,
    names: &str,
    units: aeroforecast::UnitSystem,
) -> Result<()> {
    let mut locations = Vec::new();
    for name in names.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        match gateway.search_locations(name).await?.into_iter().next() {
            Some(location) => locations.push(location),
            None => eprintln!("No locations found for '{name}', skipping"),
        }
    }
    if locations.is_empty() {
        bail!("Nothing to compare");
    }

    let mut aggregator = MultiLocationAggregator::new();
    let results = aggregator.fetch_all(gateway, &locations).await;

    for location in &locations {
        match results.get(&location.id) {
            Some(conditions) => {
                let weather = conditions.weather.in_units(units);
                println!(
                    "{:<24} {:>3.0}{}  {:<13}{}",
                    location.display_name(),
                    weather.temperature,
                    units.temperature_suffix(),
                    weather.condition.label(),
                    if conditions.stale { "  (stale)" } else { "" },
                );
            }
            None => println!("{:<24} unavailable", location.display_name()),
        }
    }

    Ok(())
}
