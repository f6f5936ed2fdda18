use crate::check::{run_check, CheckArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use student_intake::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "student-intake-api",
    about = "Run the student intake service or check a profile section offline",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Validate a saved section payload and print what it would write
    Check(CheckArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Check(args) => run_check(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_flags_parse() {
        let cli = Cli::try_parse_from([
            "student-intake-api",
            "check",
            "--section",
            "3",
            "--payload",
            "health.json",
            "--section-save",
        ])
        .expect("arguments parse");

        let Some(Command::Check(args)) = cli.command else {
            panic!("expected check command");
        };
        assert_eq!(args.section, 3);
        assert!(args.section_save);
        assert_eq!(args.payload.to_str(), Some("health.json"));
    }

    #[test]
    fn serve_is_the_default() {
        let cli = Cli::try_parse_from(["student-intake-api"]).expect("arguments parse");
        assert!(cli.command.is_none());
    }
}
