use clap::{Parser, Subcommand, ValueEnum};
use formfill_core::submit::{self, RoundStatus};
use formfill_core::synth::{AnswerMode, Synthesizer, TextGenerator};
use formfill_core::{fetch, llm, FieldDescriptor, FieldKind, Inspection};

#[derive(Parser)]
#[command(
    name = "formfill",
    about = "Detect a public web form's fields and submit synthesized answers"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a form link and print the detected field mapping
    Fields {
        /// Form URL (short link or canonical form link)
        url: String,

        /// Output as JSON instead of compact lines
        #[arg(long)]
        json: bool,

        /// Print the leading raw markup of the fetched page
        #[arg(long)]
        show_html: bool,
    },
    /// Submit synthesized answers to the form
    Fill {
        /// Form URL (short link or canonical form link)
        url: String,

        /// Number of submission rounds
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=10))]
        count: u32,

        /// How free-text answers are produced
        #[arg(long, value_enum, default_value_t = Mode::Random)]
        mode: Mode,

        /// API key for the generated mode
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Model for the generated mode
        #[arg(long)]
        model: Option<String>,

        /// Echo each round's payload
        #[arg(long)]
        show_payload: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Random,
    Contextual,
    Generated,
}

impl From<Mode> for AnswerMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Random => AnswerMode::Random,
            Mode::Contextual => AnswerMode::Contextual,
            Mode::Generated => AnswerMode::Generated,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let client = match fetch::build_client(&fetch::FetchConfig::default()) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Fields {
            url,
            json,
            show_html,
        } => {
            let inspection = inspect_or_exit(&client, &url);
            if show_html {
                println!("--- raw markup (first {} chars) ---", formfill_core::SNIPPET_LIMIT);
                println!("{}", inspection.html_snippet);
                println!("---");
            }
            print_fields(&inspection, json);
            if inspection.fields.is_empty() {
                eprintln!("No form fields detected. Check the URL or the form's structure.");
                std::process::exit(1);
            }
        }
        Commands::Fill {
            url,
            count,
            mode,
            api_key,
            model,
            show_payload,
        } => {
            let inspection = inspect_or_exit(&client, &url);
            if inspection.fields.is_empty() {
                eprintln!("No form fields detected. Check the URL or the form's structure.");
                std::process::exit(1);
            }
            print_fields(&inspection, false);

            let generator = build_generator(mode, api_key, model);
            let synth = match &generator {
                Some(g) => Synthesizer::with_generator(mode.into(), g.as_ref()),
                None => Synthesizer::new(mode.into()),
            };

            let report = submit::run_batch(
                &client,
                &inspection.link.submit_url,
                &inspection.fields,
                &synth,
                count,
                &mut |status: RoundStatus<'_>| {
                    if show_payload {
                        for (name, value) in status.payload {
                            println!("  {} = {}", name, value);
                        }
                    }
                    print_round(&status);
                },
            );

            println!(
                "Submitted {} of {} rounds successfully.",
                report.succeeded, report.attempted
            );
            if report.succeeded == 0 {
                std::process::exit(1);
            }
        }
    }
}

fn inspect_or_exit(client: &fetch::Client, url: &str) -> Inspection {
    match formfill_core::inspect(client, url) {
        Ok(inspection) => inspection,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn build_generator(
    mode: Mode,
    api_key: Option<String>,
    model: Option<String>,
) -> Option<Box<dyn TextGenerator>> {
    if !matches!(mode, Mode::Generated) {
        return None;
    }
    let Some(key) = api_key else {
        eprintln!("Error: --mode generated requires --api-key (or OPENAI_API_KEY).");
        std::process::exit(1);
    };
    match llm::LlmGenerator::new(key) {
        Ok(generator) => {
            let generator = match model {
                Some(m) => generator.with_model(m),
                None => generator,
            };
            Some(Box::new(generator))
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_fields(inspection: &Inspection, as_json: bool) {
    if as_json {
        println!(
            "{}",
            serde_json::to_string_pretty(&inspection.fields).unwrap()
        );
        return;
    }
    println!("view url:   {}", inspection.link.view_url);
    println!("submit url: {}", inspection.link.submit_url);
    println!("fields: {}", inspection.fields.len());
    for field in &inspection.fields {
        println!("  {}", describe(field));
    }
}

fn describe(field: &FieldDescriptor) -> String {
    let kind = match &field.kind {
        FieldKind::Text => "text".to_string(),
        FieldKind::SingleChoice { options } => format!("single choice [{}]", options.join(", ")),
        FieldKind::MultiChoice { options } => format!("multi choice [{}]", options.join(", ")),
        FieldKind::Fixed { preset: Some(v) } => format!("fixed \"{}\"", v),
        FieldKind::Fixed { preset: None } => "fixed (empty)".to_string(),
    };
    match &field.question {
        Some(q) => format!("{}: {} \"{}\"", field.name, kind, q),
        None => format!("{}: {}", field.name, kind),
    }
}

fn print_round(status: &RoundStatus<'_>) {
    let outcome = if status.result.ok {
        "ok".to_string()
    } else {
        match status.result.status {
            Some(code) => format!("failed (status {})", code),
            None => format!(
                "failed ({})",
                status.result.detail.as_deref().unwrap_or("transport error")
            ),
        }
    };
    println!("round {}/{}: {}", status.round, status.total, outcome);
}
