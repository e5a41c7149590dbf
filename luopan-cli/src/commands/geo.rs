//! Point measurement, bearing classification and frame conversion.

use clap::Args;
use luopan::config::ConfigFile;
use luopan::geo::{
    angle, gcj_to_wgs_precise, haversine_distance_meters, measure, CoordFrame, FramedPoint,
    GeoPoint, Measurement,
};
use luopan::shan::{classify, sitting_facing, ShanInfo};
use serde::Serialize;

use crate::error::CliError;

#[derive(Debug, Args)]
pub struct MeasureArgs {
    /// Origin as lat,lon (use `--` before southern latitudes)
    pub from: GeoPoint,

    /// Destination as lat,lon (use `--` before southern latitudes)
    pub to: GeoPoint,

    /// Frame both points were captured in (wgs or gcj)
    #[arg(long, default_value = "wgs")]
    pub frame: CoordFrame,

    /// Compass correction in degrees added to the bearing [default: survey.bearing_offset]
    #[arg(long, allow_hyphen_values = true)]
    pub offset: Option<f64>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ClassifyArgs {
    /// Bearing in degrees (any real value, normalized into [0, 360))
    #[arg(allow_negative_numbers = true)]
    pub bearing: f64,

    /// Treat the bearing as a facing direction and show sitting/facing
    #[arg(long)]
    pub facing: bool,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Point as lat,lon (use `--` before southern latitudes)
    pub point: GeoPoint,

    /// Frame of the input point
    #[arg(long, default_value = "wgs")]
    pub from: CoordFrame,

    /// Frame to convert into
    #[arg(long, default_value = "gcj")]
    pub to: CoordFrame,

    /// Refine GCJ-02 to WGS-84 iteratively (sub-metre accuracy)
    #[arg(long)]
    pub precise: bool,
}

/// Measurement corrected for the configured compass offset.
#[derive(Debug, Serialize)]
struct MeasureReport {
    frame: CoordFrame,
    raw_bearing_degrees: f64,
    offset_degrees: f64,
    #[serde(flatten)]
    measurement: Measurement,
}

fn measure_with_offset(args: &MeasureArgs, default_offset: f64) -> MeasureReport {
    // Bearings are only meaningful in WGS-84
    let from = FramedPoint::new(args.from, args.frame).to_frame(CoordFrame::Wgs84).point;
    let to = FramedPoint::new(args.to, args.frame).to_frame(CoordFrame::Wgs84).point;

    let offset = args.offset.unwrap_or(default_offset);
    let raw = measure(from, to);
    let bearing = angle::normalize(raw.bearing_degrees + offset);

    MeasureReport {
        frame: args.frame,
        raw_bearing_degrees: raw.bearing_degrees,
        offset_degrees: offset,
        measurement: Measurement {
            bearing_degrees: bearing,
            distance_meters: raw.distance_meters,
            shan: classify(bearing),
        },
    }
}

fn describe_shan(shan: &ShanInfo) -> String {
    format!(
        "{} ({}), {} {}, {} (sector {:.1}° - {:.1}°)",
        shan.shan,
        shan.shan.pinyin(),
        shan.trigram,
        shan.trigram.direction(),
        shan.element,
        shan.sector_start_degree,
        shan.sector_end_degree()
    )
}

pub fn run_measure(args: MeasureArgs, config: &ConfigFile) -> Result<(), CliError> {
    let report = measure_with_offset(&args, config.survey.bearing_offset);
    tracing::debug!(from = %args.from, to = %args.to, frame = %args.frame, "measure");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let m = &report.measurement;
    println!("Bearing:  {:.2}°", m.bearing_degrees);
    if report.offset_degrees != 0.0 {
        println!(
            "          ({:.2}° raw, {:+.2}° offset)",
            report.raw_bearing_degrees, report.offset_degrees
        );
    }
    println!("Distance: {:.1} m", m.distance_meters);
    println!("Shan:     {}", describe_shan(&m.shan));
    Ok(())
}

pub fn run_classify(args: ClassifyArgs) -> Result<(), CliError> {
    if !args.bearing.is_finite() {
        return Err(CliError::InvalidArgument(format!(
            "bearing must be a finite number, got {}",
            args.bearing
        )));
    }

    if args.facing {
        let sf = sitting_facing(args.bearing);
        if args.json {
            println!("{}", serde_json::to_string_pretty(&sf)?);
        } else {
            println!("{}", sf.label());
            println!("Sitting: {}", describe_shan(&sf.sitting));
            println!("Facing:  {}", describe_shan(&sf.facing));
        }
        return Ok(());
    }

    let shan = classify(args.bearing);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&shan)?);
    } else {
        println!("{:.2}° -> {}", angle::normalize(args.bearing), describe_shan(&shan));
    }
    Ok(())
}

fn convert(args: &ConvertArgs) -> GeoPoint {
    match (args.from, args.to) {
        (CoordFrame::Gcj02, CoordFrame::Wgs84) if args.precise => gcj_to_wgs_precise(args.point),
        (from, to) => FramedPoint::new(args.point, from).to_frame(to).point,
    }
}

pub fn run_convert(args: ConvertArgs) -> Result<(), CliError> {
    let converted = convert(&args);
    println!("{} ({})", converted, args.to);
    println!(
        "shift: {:.1} m",
        haversine_distance_meters(args.point, converted)
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use luopan::geo::wgs_to_gcj;

    fn measure_args(offset: Option<f64>) -> MeasureArgs {
        MeasureArgs {
            from: GeoPoint::new(39.9042, 116.4074),
            to: GeoPoint::new(39.9163, 116.3972),
            frame: CoordFrame::Wgs84,
            offset,
            json: false,
        }
    }

    #[test]
    fn test_measure_uses_config_offset() {
        let report = measure_with_offset(&measure_args(None), 5.0);
        assert!((report.raw_bearing_degrees - 327.11).abs() < 0.01);
        assert!((report.measurement.bearing_degrees - 332.11).abs() < 0.01);
        assert_eq!(report.measurement.shan.index, 22);
    }

    #[test]
    fn test_explicit_offset_wins_and_wraps() {
        let report = measure_with_offset(&measure_args(Some(40.0)), 5.0);
        assert!((report.measurement.bearing_degrees - 7.11).abs() < 0.01);
        assert_eq!(report.measurement.shan.index, 0);
    }

    #[test]
    fn test_convert_roundtrip_frames() {
        let wgs = GeoPoint::new(31.2304, 121.4737);
        let gcj = convert(&ConvertArgs {
            point: wgs,
            from: CoordFrame::Wgs84,
            to: CoordFrame::Gcj02,
            precise: false,
        });
        assert_eq!(gcj, wgs_to_gcj(wgs));

        let back = convert(&ConvertArgs {
            point: gcj,
            from: CoordFrame::Gcj02,
            to: CoordFrame::Wgs84,
            precise: true,
        });
        assert!(haversine_distance_meters(back, wgs) < 0.05);
    }

    #[test]
    fn test_same_frame_is_identity() {
        let p = GeoPoint::new(10.0, 20.0);
        let out = convert(&ConvertArgs {
            point: p,
            from: CoordFrame::Gcj02,
            to: CoordFrame::Gcj02,
            precise: true,
        });
        assert_eq!(out, p);
    }
}
