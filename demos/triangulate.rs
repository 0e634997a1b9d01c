use clap::Parser;
use geo_triangulate::interop::triangulate_geojson;
use geo_triangulate::Triangulator;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input GeoJSON file (Polygons / MultiPolygons)
    #[arg(short, long)]
    input: PathBuf,

    /// Output GeoJSON file (one Polygon feature per triangle)
    #[arg(short, long)]
    output: PathBuf,

    /// Flip edges toward a locally Delaunay triangulation
    #[arg(long, default_value_t = false)]
    optimize: bool,

    /// Coordinate tolerance
    #[arg(long, default_value_t = 1e-10)]
    eps: f64,

    /// Verify adjacency and heap invariants after every flip
    #[arg(long, default_value_t = false)]
    debug_checks: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    println!("Reading input from {:?}", args.input);
    let input = fs::read_to_string(&args.input)?;

    let triangulator = Triangulator::new()
        .with_eps(args.eps)
        .with_optimize(args.optimize)
        .with_debug_checks(args.debug_checks);

    let output = triangulate_geojson(&triangulator, &input)?;

    // Re-indent for readability
    let value: serde_json::Value = serde_json::from_str(&output)?;
    let triangle_count = value["features"].as_array().map_or(0, |f| f.len());
    println!("Produced {} triangles.", triangle_count);

    println!("Writing output to {:?}", args.output);
    fs::write(&args.output, serde_json::to_string_pretty(&value)?)?;

    Ok(())
}
