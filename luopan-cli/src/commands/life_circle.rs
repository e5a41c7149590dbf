//! Life circle command: assign home/work/leisure and list connections.

use std::str::FromStr;

use clap::Args;
use luopan::config::ConfigFile;
use luopan::geo::GeoPoint;
use luopan::life_circle::{Connection, LifeCircle, LifeCircleAssigner, PointRole, SurveyPoint};
use serde::Serialize;

use crate::error::CliError;

#[derive(Debug, Args)]
pub struct LifeCircleArgs {
    /// Places as name@lat,lon (WGS-84)
    #[arg(required = true, num_args = 1..)]
    pub places: Vec<Place>,

    /// Force a role, as name=home|work|leisure (repeatable)
    #[arg(long = "role")]
    pub roles: Vec<RoleOverride>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// A named place given on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub name: String,
    pub position: GeoPoint,
}

impl FromStr for Place {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, point) = s
            .rsplit_once('@')
            .ok_or_else(|| format!("expected name@lat,lon, got '{}'", s))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(format!("missing place name in '{}'", s));
        }
        let position = point.parse::<GeoPoint>().map_err(|e| e.to_string())?;
        Ok(Place {
            name: name.to_string(),
            position,
        })
    }
}

/// `name=role` pair from `--role`.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleOverride {
    pub name: String,
    pub role: PointRole,
}

impl FromStr for RoleOverride {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, role) = s
            .rsplit_once('=')
            .ok_or_else(|| format!("expected name=role, got '{}'", s))?;
        Ok(RoleOverride {
            name: name.trim().to_string(),
            role: role.parse()?,
        })
    }
}

#[derive(Debug, Serialize)]
struct LifeCircleReport {
    circle: LifeCircle,
    connections: Vec<Connection>,
}

/// Place names double as point ids, so they must be unique.
fn survey_points(places: &[Place]) -> Result<Vec<SurveyPoint>, CliError> {
    let mut points: Vec<SurveyPoint> = Vec::with_capacity(places.len());
    for place in places {
        if points.iter().any(|p| p.id == place.name) {
            return Err(CliError::InvalidArgument(format!(
                "place '{}' given more than once",
                place.name
            )));
        }
        points.push(SurveyPoint::new(&place.name, &place.name, place.position));
    }
    Ok(points)
}

fn build(args: &LifeCircleArgs, config: &ConfigFile) -> Result<LifeCircleReport, CliError> {
    let points = survey_points(&args.places)?;

    let assigner = LifeCircleAssigner::with_keywords(config.life_circle.keyword_sets());
    for o in &args.roles {
        if !points.iter().any(|p| p.id == o.name) {
            return Err(CliError::InvalidArgument(format!(
                "--role refers to unknown place '{}'",
                o.name
            )));
        }
        assigner.set_override(o.name.as_str(), o.role);
    }

    let circle = assigner.activate(&points)?;
    let connections = circle.connections();
    Ok(LifeCircleReport {
        circle,
        connections,
    })
}

pub fn run(args: LifeCircleArgs, config: &ConfigFile) -> Result<(), CliError> {
    let report = build(&args, config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for role in PointRole::ALL {
        let point = report.circle.point(role);
        println!("{:<8} {} ({})", role, point.name, point.position);
    }
    println!();
    for c in &report.connections {
        println!(
            "{} -> {}: {:.1}° {}, {:.0} m",
            c.from.role, c.to.role, c.bearing_degrees, c.shan.shan, c.distance_meters
        );
    }
    Ok(())
}
