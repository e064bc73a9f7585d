use clap::{Arg, ArgAction, ArgMatches, Command};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use log::{error, info, LevelFilter};
use geomedia::{convert_file, default_output_name, emitter, match_uploads, MediaKind, Result, Upload};

fn cli() -> Command {
    Command::new("geomedia")
        .version("0.1.0")
        .about("Geotags images and videos from a GPX or KML file and converts geo files to GeoJSON")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log per-element progress"),
        )
        .subcommand(
            Command::new("match")
                .about("Writes one GeoJSON file per media file found in the geo file")
                .arg(
                    Arg::new("geo")
                        .short('g')
                        .long("geo")
                        .required(true)
                        .help("GPX or KML file whose point names are media filenames"),
                )
                .arg(
                    Arg::new("media")
                        .short('m')
                        .long("media")
                        .num_args(1..)
                        .required(true)
                        .help("Images (jpg, jpeg, png) or videos (mp4, mov, avi)"),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .default_value("output")
                        .help("Directory receiving GeoJSON and media files"),
                )
                .arg(
                    Arg::new("name")
                        .short('n')
                        .long("name")
                        .action(ArgAction::Append)
                        .value_parser(parse_name_override)
                        .help("Output GeoJSON name for a media file, as MEDIA=NAME"),
                ),
        )
        .subcommand(
            Command::new("convert")
                .about("Converts every point and placemark of a GPX or KML file into one FeatureCollection")
                .arg(Arg::new("input").required(true).help("GPX or KML file"))
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help("Output file (defaults to the input name with .geojson, '-' for stdout)"),
                ),
        )
}

fn parse_name_override(value: &str) -> std::result::Result<(String, String), String> {
    match value.split_once('=') {
        Some((media, name)) if !media.is_empty() && !name.is_empty() => {
            Ok((media.to_string(), name.to_string()))
        }
        _ => Err(format!("expected MEDIA=NAME, got {:?}", value)),
    }
}

fn run_match(matches: &ArgMatches) -> Result<()> {
    let geo_path = PathBuf::from(required(matches, "geo"));
    let output_dir = PathBuf::from(required(matches, "output"));
    let output_names: HashMap<String, String> = matches
        .get_many::<(String, String)>("name")
        .map(|pairs| pairs.cloned().collect())
        .unwrap_or_default();

    let geo = Upload::from_path(&geo_path)?;
    let media = matches
        .get_many::<String>("media")
        .map(|paths| paths.map(|p| Upload::from_path(Path::new(p))).collect::<Result<Vec<_>>>())
        .transpose()?
        .unwrap_or_default();

    let report = match_uploads(&geo, &media, &output_names)?;
    for matched in &report.matched {
        let kind = match matched.media_type.kind() {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        };
        info!("{} {} -> {}", kind, matched.caption(), matched.output_name);
    }

    let written = report.write_to(&output_dir)?;
    info!(
        "{} of {} media files located, {} files written to {}",
        report.matched.len(),
        media.len(),
        written.len(),
        output_dir.display()
    );
    Ok(())
}

fn run_convert(matches: &ArgMatches) -> Result<()> {
    let input = PathBuf::from(required(matches, "input"));
    let conversion = convert_file(&input)?;
    let text = emitter::to_pretty_json(&conversion.collection)?;

    match matches.get_one::<String>("output").map(String::as_str) {
        Some("-") => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
        Some(path) => write_output(Path::new(path), &text)?,
        None => {
            let name = input
                .file_name()
                .and_then(|n| n.to_str())
                .map(default_output_name)
                .unwrap_or_else(|| "converted.geojson".to_string());
            write_output(&input.with_file_name(name), &text)?;
        }
    }
    Ok(())
}

fn write_output(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text)?;
    info!("Written {}", path.display());
    Ok(())
}

fn required<'a>(matches: &'a ArgMatches, id: &str) -> &'a str {
    matches.get_one::<String>(id).map(String::as_str).unwrap_or_default()
}

fn main() {
    let matches = cli().get_matches();

    let level = if matches.get_flag("verbose") { LevelFilter::Debug } else { LevelFilter::Info };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let result = match matches.subcommand() {
        Some(("match", sub)) => run_match(sub),
        Some(("convert", sub)) => run_convert(sub),
        _ => Ok(()),
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}
