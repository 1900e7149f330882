use std::error::Error;
use std::process;

use clap::{Parser, Subcommand};
use road_geometry::{
    alignment::{Alignment, HorizontalAlignment, StationIncrements},
    geometry::{Point, Side},
    io::{read_alignment_json, read_pis_json, write_alignment_json},
};

#[derive(Parser)]
#[command(name = "road_geometry_cli", version)]
struct Cli {
    /// Skip horizontal elements that fail to build instead of aborting
    #[arg(long, global = true)]
    lossy: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print station, x and y at a regular interval along the alignment.
    Sample {
        path: String,
        #[arg(long, default_value_t = 10.0)]
        step: f64,
    },
    /// Print points offset from the centerline.
    Offset {
        path: String,
        offset: f64,
        #[arg(long, default_value_t = 10.0)]
        step: f64,
        #[arg(long, default_value = "left")]
        side: Side,
    },
    /// List stations with per element type increments.
    Stations {
        path: String,
        #[arg(long, default_value_t = 10.0)]
        increment: f64,
        /// Increment on lines, overriding --increment
        #[arg(long)]
        line: Option<f64>,
        /// Increment on curves, overriding --increment
        #[arg(long)]
        curve: Option<f64>,
        /// Increment on spirals, overriding --increment
        #[arg(long)]
        spiral: Option<f64>,
        #[arg(long)]
        start: Option<f64>,
        #[arg(long)]
        end: Option<f64>,
        /// Leave out element start and end stations
        #[arg(long)]
        no_geometry_points: bool,
    },
    /// Compute the station and offset of a point.
    StationOffset { path: String, x: f64, y: f64 },
    /// Print the design profile with ground elevations.
    Profile {
        path: String,
        #[arg(long, default_value_t = 10.0)]
        step: f64,
        #[arg(long)]
        design: Option<String>,
        #[arg(long)]
        surface: Option<String>,
    },
    /// Lay out an alignment from a JSON list of PIs and write it as a document.
    Layout {
        pis: String,
        output: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value_t = 0.0)]
        sta_start: f64,
    },
    /// Cut or fill between the design and surface profiles at a station.
    CutFill {
        path: String,
        station: f64,
        #[arg(long)]
        design: Option<String>,
        #[arg(long)]
        surface: Option<String>,
    },
}

fn load(path: &str, lossy: bool) -> Result<Alignment, Box<dyn Error>> {
    let data = read_alignment_json(path)?;
    let alignment = if lossy {
        let (alignment, skipped) = Alignment::from_data_lossy(data)?;
        for err in skipped {
            eprintln!("Skipped {err}");
        }
        alignment
    } else {
        Alignment::from_data(data)?
    };
    log::info!(
        "loaded {} elements from {path}, stations {:.3} to {:.3}",
        alignment.horizontal().elements().len(),
        alignment.horizontal().sta_start(),
        alignment.horizontal().sta_end()
    );
    Ok(alignment)
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Commands::Sample { path, step } => {
            let alignment = load(&path, cli.lossy)?;
            for (station, p) in alignment.horizontal().generate_points(step)? {
                println!("{:.3},{:.3},{:.3}", station, p.x, p.y);
            }
        }
        Commands::Offset {
            path,
            offset,
            step,
            side,
        } => {
            let alignment = load(&path, cli.lossy)?;
            for (station, p) in alignment
                .horizontal()
                .generate_offset_points(offset, step, side)?
            {
                println!("{:.3},{:.3},{:.3}", station, p.x, p.y);
            }
        }
        Commands::Stations {
            path,
            increment,
            line,
            curve,
            spiral,
            start,
            end,
            no_geometry_points,
        } => {
            let alignment = load(&path, cli.lossy)?;
            let increments = StationIncrements {
                line: line.unwrap_or(increment),
                curve: curve.unwrap_or(increment),
                spiral: spiral.unwrap_or(increment),
            };
            let stations = alignment.horizontal().generate_stations(
                start,
                end,
                &increments,
                !no_geometry_points,
            )?;
            for station in stations {
                println!("{:.3}", station);
            }
        }
        Commands::StationOffset { path, x, y } => {
            let alignment = load(&path, cli.lossy)?;
            match alignment.horizontal().station_offset(Point::new(x, y)) {
                Some((station, offset)) => {
                    println!("Station: {:.3} Offset: {:.3}", station, offset)
                }
                None => return Err(format!("({x}, {y}) does not project onto the alignment").into()),
            }
        }
        Commands::Profile {
            path,
            step,
            design,
            surface,
        } => {
            let alignment = load(&path, cli.lossy)?;
            let profiles = alignment
                .profiles()
                .ok_or("alignment has no profile")?;
            for w in profiles.warnings() {
                eprintln!("Warning: {w}");
            }
            let points =
                profiles.generate_profile_points(step, design.as_deref(), surface.as_deref())?;
            for p in points {
                match p.surface_elevation {
                    Some(ground) => println!(
                        "{:.3},{:.3},{:.5},{:.3}",
                        p.station, p.elevation, p.grade, ground
                    ),
                    None => println!("{:.3},{:.3},{:.5},", p.station, p.elevation, p.grade),
                }
            }
        }
        Commands::Layout {
            pis,
            output,
            name,
            sta_start,
        } => {
            let pis = read_pis_json(&pis)?;
            let alignment = HorizontalAlignment::from_pis(name, sta_start, &pis)?;
            write_alignment_json(&output, &alignment.to_data())?;
            println!(
                "Wrote {} elements, stations {:.3} to {:.3}",
                alignment.elements().len(),
                alignment.sta_start(),
                alignment.sta_end()
            );
        }
        Commands::CutFill {
            path,
            station,
            design,
            surface,
        } => {
            let alignment = load(&path, cli.lossy)?;
            let profiles = alignment
                .profiles()
                .ok_or("alignment has no profile")?;
            let diff =
                profiles.cut_fill_at_station(station, design.as_deref(), surface.as_deref())?;
            if diff >= 0.0 {
                println!("Fill {:.3} at station {:.3}", diff, station);
            } else {
                println!("Cut {:.3} at station {:.3}", -diff, station);
            }
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
