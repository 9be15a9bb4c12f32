use anyhow::Result;
use clap::{Arg, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;
use std::sync::Arc;

use obesity_cli::predict::run_prediction;
use obesity_cli::train::input::TrainConfig;
use obesity_cli::train::trainer;
use obesity_cli::util::env_or;
use obesity_server::{ApiState, WebState};

const DEFAULT_API_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_WEB_ADDR: &str = "0.0.0.0:8501";
const DEFAULT_MODEL: &str = "model/model.json";
const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("OBESITY_LOG", "error,obesity=info"))
        .init();

    let matches = Command::new("obesity")
        .version(clap::crate_version!())
        .author("Justin Sing <justincsing@gmail.com>")
        .about("Obesity-level classifier: train, predict and serve")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("train")
                .about("Train a classifier from a CSV/TSV dataset")
                .arg(
                    Arg::new("config")
                        .help("Path to training configuration file")
                        .required(false)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("train_data")
                        .short('d')
                        .long("train_data")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help(
                            "Path to training data. Overrides the training data file \
                             specified in the configuration file.",
                        )
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output_file")
                        .short('o')
                        .long("output_file")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help(
                            "File path that the trained model will be written to. \
                             Overrides the output file specified in the configuration file.",
                        )
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("predict")
                .about("Classify records from a JSON file with a trained model")
                .arg(
                    Arg::new("model")
                        .help("Path to the trained model")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("input")
                        .help("JSON file with one record or an array of records")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("serve")
                .about("Serve the inference API")
                .arg(
                    Arg::new("model")
                        .short('m')
                        .long("model")
                        .default_value(DEFAULT_MODEL)
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("Path to the trained model")
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("addr")
                        .short('a')
                        .long("addr")
                        .default_value(DEFAULT_API_ADDR)
                        .help("Address to listen on"),
                ),
        )
        .subcommand(
            Command::new("web")
                .about("Serve the form UI in front of the inference API")
                .arg(
                    Arg::new("api_url")
                        .short('u')
                        .long("api-url")
                        .help("Base URL of the inference API. Falls back to API_URL."),
                )
                .arg(
                    Arg::new("addr")
                        .short('a')
                        .long("addr")
                        .default_value(DEFAULT_WEB_ADDR)
                        .help("Address to listen on"),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("train", train_matches)) => handle_train(train_matches),
        Some(("predict", predict_matches)) => {
            let model_path: &PathBuf = predict_matches.get_one("model").unwrap();
            let input_path: &PathBuf = predict_matches.get_one("input").unwrap();

            match run_prediction(model_path, input_path) {
                Ok(labels) => {
                    for label in labels {
                        println!("{}", label);
                    }
                    Ok(())
                }
                Err(e) => {
                    log::error!("Prediction failed: {:#}", e);
                    std::process::exit(1)
                }
            }
        }
        Some(("serve", serve_matches)) => {
            let model_path: &PathBuf = serve_matches.get_one("model").unwrap();
            let addr: &String = serve_matches.get_one("addr").unwrap();
            log::info!("Loading model from {:?}", model_path);

            let state = Arc::new(ApiState::from_path(model_path)?);
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(obesity_server::api::serve(addr, state))
        }
        Some(("web", web_matches)) => {
            let api_url = web_matches
                .get_one::<String>("api_url")
                .cloned()
                .unwrap_or_else(|| env_or("API_URL", DEFAULT_API_URL));
            let addr: &String = web_matches.get_one("addr").unwrap();

            let state = Arc::new(WebState::new(api_url));
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(obesity_server::web::serve(addr, state))
        }
        _ => unreachable!(),
    }
}

fn handle_train(matches: &ArgMatches) -> Result<()> {
    let config_path = match matches.get_one::<PathBuf>("config") {
        Some(path) => path,
        None => {
            eprintln!("No config file provided. Template configuration:");
            println!(
                "{}",
                serde_json::to_string_pretty(&TrainConfig::default()).unwrap_or_default()
            );
            return Ok(());
        }
    };
    log::info!("Training from config: {:?}", config_path);

    let params = TrainConfig::from_arguments(config_path, matches)?;

    match trainer::run_training(&params) {
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Training failed: {:#}", e);
            std::process::exit(1)
        }
    }
}
