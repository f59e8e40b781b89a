use climatrend::{ClimaTrend, ClimaTrendError, LookupMode, Record, RecordWriter, Variable};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), ClimaTrendError> {
    let cache = std::env::temp_dir().join("climatrend_demo");
    std::fs::create_dir_all(&cache)
        .map_err(|e| ClimaTrendError::CacheDirCreation(cache.clone(), e))?;
    write_demo_dataset(&cache.join("climate_records.bin"))?;

    let client = ClimaTrend::builder()
        .cache_folder(cache)
        .lookup_mode(LookupMode::Streaming)
        .build()
        .await?;

    let forecast = client
        .describe()
        .latitude(-12.05)
        .longitude(-77.04)
        .date("2026-06-01")
        .time("12")
        .call()
        .await?;
    println!("{}", forecast.long_description);
    println!("{:#?}", forecast);

    let day = client
        .daily()
        .latitude(-12.05)
        .longitude(-77.04)
        .date("2026-06-01")
        .call()
        .await?;
    for (label, t) in day.labels.iter().zip(&day.temperatures) {
        println!("{label}  {t:?}");
    }

    Ok(())
}

/// A coarse grid around Lima with a slow warming trend, one snapshot per year at noon.
fn write_demo_dataset(path: &Path) -> Result<(), ClimaTrendError> {
    let mut writer = RecordWriter::create(path)?;
    for year in 2015..=2024 {
        let mut points = Vec::new();
        let mut temperatures = Vec::new();
        let mut dew_points = Vec::new();
        let mut precipitation = Vec::new();
        for i in 0..5 {
            for j in 0..5 {
                let lon = -78.0 + 0.5 * i as f64;
                let lat = -13.0 + 0.5 * j as f64;
                let warming = 0.08 * (year - 2015) as f64;
                points.push((lon, lat));
                temperatures.push(19.0 + 0.6 * (lat + 12.0) - 0.3 * (lon + 77.0) + warming);
                dew_points.push(14.0 + 0.2 * (lat + 12.0));
                precipitation.push(0.05 * j as f64);
            }
        }
        let record = Record::new(format!("{year}-06-01 12:00:00").as_str(), points)
            .with_variable(Variable::Temperature, temperatures)
            .with_variable(Variable::Humidity, dew_points)
            .with_variable(Variable::Precipitation, precipitation);
        writer.append(&record)?;
    }
    writer.finish()?;
    Ok(())
}
