//! Sector search command.

use std::sync::Arc;

use clap::Args;
use luopan::config::{ConfigFile, SearchSettings};
use luopan::geo::{measure, CoordFrame, FramedPoint, GeoPoint, Measurement};
use luopan::search::{
    AsyncReqwestClient, PoiProviderFactory, PoiRecord, SearchOutcome, SectorSearch,
    SectorSearchRequest,
};
use luopan::sector::SectorQuery;
use serde::Serialize;

use crate::error::CliError;

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Keyword to search for
    pub keyword: String,

    /// Search origin as lat,lon
    #[arg(long, allow_hyphen_values = true)]
    pub origin: GeoPoint,

    /// Sector start bearing in degrees
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub start: f64,

    /// Sector end bearing in degrees (start > end wraps through north)
    #[arg(long, default_value_t = 360.0, allow_hyphen_values = true)]
    pub end: f64,

    /// Search radius in metres (capped at search.max_radius_km)
    #[arg(long, default_value_t = 1_000.0)]
    pub radius: f64,

    /// Frame of the origin and of printed results (wgs or gcj)
    #[arg(long, default_value = "wgs")]
    pub frame: CoordFrame,

    /// Widen both sector edges by this many degrees [default: survey.angle_tolerance]
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Compass correction in degrees [default: survey.bearing_offset]
    #[arg(long, allow_hyphen_values = true)]
    pub offset: Option<f64>,

    /// Comma-separated provider chain, overriding search.providers
    #[arg(long, value_delimiter = ',')]
    pub providers: Option<Vec<String>>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// One hit, measured from the search origin.
#[derive(Debug, Serialize)]
struct Hit {
    #[serde(flatten)]
    record: PoiRecord,
    #[serde(flatten)]
    measurement: Measurement,
}

#[derive(Debug, Serialize)]
struct SearchReport {
    provider: Option<String>,
    radius_meters: f64,
    radius_clamped: bool,
    results: Vec<Hit>,
}

fn build_request(args: &SearchArgs, config: &ConfigFile) -> SectorSearchRequest {
    let sector = SectorQuery::new(args.origin, args.start, args.end, args.radius)
        .with_tolerance(args.tolerance.unwrap_or(config.survey.angle_tolerance))
        .with_bearing_offset(args.offset.unwrap_or(config.survey.bearing_offset));

    SectorSearchRequest {
        keyword: args.keyword.clone(),
        sector,
        frame: args.frame,
    }
}

fn effective_settings(args: &SearchArgs, config: &ConfigFile) -> SearchSettings {
    let mut settings = config.search.clone();
    if let Some(providers) = &args.providers {
        settings.providers = providers
            .iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
    }
    settings
}

fn build_report(outcome: SearchOutcome, origin: GeoPoint, frame: CoordFrame) -> SearchReport {
    let origin = FramedPoint::new(origin, frame).to_frame(CoordFrame::Wgs84).point;
    let results = outcome
        .results
        .into_iter()
        .map(|record| {
            let at = FramedPoint::new(record.point(), frame)
                .to_frame(CoordFrame::Wgs84)
                .point;
            Hit {
                measurement: measure(origin, at),
                record,
            }
        })
        .collect();

    SearchReport {
        provider: outcome.provider,
        radius_meters: outcome.radius_meters,
        radius_clamped: outcome.radius_clamped,
        results,
    }
}

pub fn run(args: SearchArgs, config: &ConfigFile) -> Result<(), CliError> {
    if !args.radius.is_finite() || args.radius < 0.0 {
        return Err(CliError::InvalidArgument(format!(
            "radius must be a non-negative number, got {}",
            args.radius
        )));
    }

    let settings = effective_settings(&args, config);
    let request = build_request(&args, config);

    let client = AsyncReqwestClient::with_timeout(settings.timeout_secs)?;
    let chain = PoiProviderFactory::new(client).create_chain(&settings)?;
    let search = Arc::new(SectorSearch::from_settings(chain, &settings));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    // Ctrl+C abandons the search rather than killing the process mid-request
    let handler_search = Arc::clone(&search);
    ctrlc::set_handler(move || {
        eprintln!("\nCancelling search...");
        handler_search.cancel_in_flight();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    tracing::info!(
        keyword = %request.keyword,
        origin = %args.origin,
        providers = ?settings.providers,
        "Starting sector search"
    );
    let outcome = runtime.block_on(search.search(&request))?;
    let report = build_report(outcome, args.origin, args.frame);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.radius_clamped {
        println!(
            "Note: radius clamped to {:.0} m (search.max_radius_km or provider limit)",
            report.radius_meters
        );
    }

    match &report.provider {
        Some(provider) => println!("{} result(s) from {}", report.results.len(), provider),
        None => println!("No provider returned results"),
    }

    for hit in &report.results {
        println!(
            "  {:<24} {:>7.1}° {} {:>8.0} m  {}",
            hit.record.name,
            hit.measurement.bearing_degrees,
            hit.measurement.shan.shan,
            hit.measurement.distance_meters,
            hit.record.address
        );
    }
    Ok(())
}
