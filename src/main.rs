use std::path;
use std::process;

use bytesize::ByteSize;
use clap::ArgEnum;
use env_logger;
use log;

use line_sort::{order, ExternalSorter, ExternalSorterBuilder};

fn main() {
    let arg_parser = build_arg_parser();

    let log_level: LogLevel = arg_parser.value_of_t_or_exit("log_level");
    init_logger(log_level);

    let sort_order: Order = arg_parser.value_of_t_or_exit("sort");
    let tmp_dir: Option<&str> = arg_parser.value_of("tmp_dir");
    let chunk_size = arg_parser.value_of("chunk_size").expect("value is required");

    let input = path::Path::new(arg_parser.value_of("input").expect("value is required"));
    let output = path::Path::new(arg_parser.value_of("output").expect("value is required"));

    let mut sorter_builder = ExternalSorterBuilder::new().with_chunk_size(
        chunk_size.parse::<ByteSize>().expect("value is pre-validated").as_u64(),
    );

    if let Some(tmp_dir) = tmp_dir {
        sorter_builder = sorter_builder.with_tmp_dir(path::Path::new(tmp_dir));
    }

    let sorter: ExternalSorter = match sorter_builder.build() {
        Ok(sorter) => sorter,
        Err(err) => {
            log::error!("sorter initialization error: {}", err);
            process::exit(1);
        }
    };

    let result = match sort_order {
        Order::Longest => sorter.sort_by(input, output, order::longest_first),
        Order::Asc => sorter.sort_by(input, output, order::lexicographic),
        Order::Desc => sorter.sort_by(input, output, |a: &str, b: &str| order::lexicographic(a, b).reverse()),
    };

    if let Err(err) = result {
        log::error!("sorting error: {}", err);
        process::exit(1);
    }
}

#[derive(Copy, Clone, clap::ArgEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn possible_values() -> impl Iterator<Item = clap::PossibleValue<'static>> {
        Self::value_variants().iter().filter_map(|v| v.to_possible_value())
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <LogLevel as clap::ArgEnum>::from_str(s, false)
    }
}

#[derive(Copy, Clone, clap::ArgEnum)]
enum Order {
    Longest,
    Asc,
    Desc,
}

impl Order {
    pub fn possible_values() -> impl Iterator<Item = clap::PossibleValue<'static>> {
        Order::value_variants().iter().filter_map(|v| v.to_possible_value())
    }
}

impl std::str::FromStr for Order {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Order as clap::ArgEnum>::from_str(s, false)
    }
}

fn build_arg_parser() -> clap::ArgMatches {
    clap::App::new("line-sort")
        .about("external text line sorter")
        .arg(
            clap::Arg::new("input")
                .short('i')
                .long("input")
                .help("file to be sorted")
                .required(true)
                .takes_value(true),
        )
        .arg(
            clap::Arg::new("output")
                .short('o')
                .long("output")
                .help("result file")
                .required(true)
                .takes_value(true),
        )
        .arg(
            clap::Arg::new("sort")
                .short('s')
                .long("sort")
                .help("sorting order")
                .takes_value(true)
                .default_value("longest")
                .possible_values(Order::possible_values()),
        )
        .arg(
            clap::Arg::new("log_level")
                .short('l')
                .long("loglevel")
                .help("logging level")
                .takes_value(true)
                .default_value("info")
                .possible_values(LogLevel::possible_values()),
        )
        .arg(
            clap::Arg::new("tmp_dir")
                .short('d')
                .long("tmp-dir")
                .help("directory to be used to store temporary data")
                .takes_value(true),
        )
        .arg(
            clap::Arg::new("chunk_size")
                .short('c')
                .long("chunk-size")
                .help("chunk size")
                .required(true)
                .takes_value(true)
                .validator(|v| match v.parse::<ByteSize>() {
                    Ok(_) => Ok(()),
                    Err(err) => Err(format!("Chunk size format incorrect: {}", err)),
                }),
        )
        .get_matches()
}

fn init_logger(log_level: LogLevel) {
    env_logger::Builder::new()
        .filter_level(match log_level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        })
        .format_timestamp_millis()
        .init();
}
