use crate::CLAP_STYLING;
use clap::{arg, command};
use url::Url;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("kompas")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("kompas")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("quiz")
                .about(
                    "Walk the AI career tree question by question and receive a \
                profession verdict with live vacancies.",
                )
                .arg(
                    arg!(-u --"base-url" <URL>)
                        .required(false)
                        .help("Base URL of the Kompas backend")
                        .value_parser(clap::value_parser!(Url))
                        .default_value("http://127.0.0.1:8080/"),
                )
                .arg(
                    arg!(-d --"depth" <STEPS>)
                        .required(false)
                        .help("Number of questions to answer before the verdict")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("30"),
                )
                .arg(
                    arg!(--"min-display-ms" <MILLIS>)
                        .required(false)
                        .help("Minimum time a loading indicator stays visible")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("1200"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save the final report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                ),
        )
        .subcommand(
            command!("ui")
                .about("Run the career quiz in the full-screen terminal interface")
                .arg(
                    arg!(-u --"base-url" <URL>)
                        .required(false)
                        .help("Base URL of the Kompas backend")
                        .value_parser(clap::value_parser!(Url))
                        .default_value("http://127.0.0.1:8080/"),
                )
                .arg(
                    arg!(-d --"depth" <STEPS>)
                        .required(false)
                        .help("Number of questions to answer before the verdict")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("30"),
                ),
        )
        .subcommand(
            command!("predict")
                .about(
                    "Get career recommendations from your skills and interests, \
                enriched with labour-market relevance data.",
                )
                .arg(
                    arg!(-u --"base-url" <URL>)
                        .required(false)
                        .help("Base URL of the Kompas backend")
                        .value_parser(clap::value_parser!(Url))
                        .default_value("http://127.0.0.1:8080/"),
                )
                .arg(
                    arg!(-s --"skills" <TEXT>)
                        .required(false)
                        .help("Comma-separated skills (prompted for interactively if omitted)"),
                )
                .arg(
                    arg!(-i --"interests" <TEXT>)
                        .required(false)
                        .help("Free-form interests (optional)"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("30"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save the analysis report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                ),
        )
}
