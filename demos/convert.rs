use netex_gtfs::{
    ConverterConfig, GtfsConverter, GtfsWriter, NetexData, StopAreaIndex, StopAreaRepository,
};

/// cargo run --example convert -- <netex> <stop areas> <gtfs.zip> [config.json]
fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        eprintln!("usage: convert <netex> <stop areas> <gtfs.zip> [config.json]");
        std::process::exit(1);
    }

    /* NetexData::new guesses if you provide a remote archive, a local archive, a directory or a
       single xml file. You can also use NetexData::from_path or NetexData::from_url
    */
    let timetable = NetexData::new(&args[1]).expect("impossible to read the NeTEx timetable");
    timetable.print_stats();

    // the stop areas are loaded once and can be refreshed between two conversions
    let stop_areas = StopAreaRepository::new(
        StopAreaIndex::from_source(&args[2]).expect("impossible to read stop areas"),
    );

    let config = match args.get(4) {
        Some(path) => ConverterConfig::from_path(path).expect("invalid configuration"),
        None => ConverterConfig::new("RB"),
    };

    let output = GtfsConverter::new(config.clone(), stop_areas.snapshot())
        .convert(&timetable)
        .expect("conversion failed");
    println!(
        "{} routes, {} trips, {} stop times",
        output.routes().len(),
        output.trips().len(),
        output.stop_times().len()
    );

    GtfsWriter::new(&output, &config.excluded_columns)
        .write_to_zip_file(&args[3])
        .expect("impossible to write the GTFS");
}
