use crate::demo::{run_demo, DemoArgs};
use crate::render::{run_pdf, run_render, PdfArgs, RenderArgs};
use crate::server;
use booking_form::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Booking Form Compiler",
    about = "Render apartment booking application forms and serve them over HTTP",
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
    /// Render the designated form pages of a stored dataset to HTML
    Render(RenderArgs),
    /// Stamp a dataset onto the booking PDF template
    Pdf(PdfArgs),
    /// Render a built-in sample application and print what the compiler decided
    Demo(DemoArgs),
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
        Command::Render(args) => run_render(args),
        Command::Pdf(args) => run_pdf(args),
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["booking-form-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn pdf_command_accepts_template_override() {
        let cli = Cli::try_parse_from([
            "booking-form-api",
            "pdf",
            "--dataset",
            "form.json",
            "--template",
            "booking.pdf",
            "--output",
            "out.pdf",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Pdf(args)) => {
                assert_eq!(args.template.as_deref(), Some(std::path::Path::new("booking.pdf")));
                assert_eq!(args.output, std::path::PathBuf::from("out.pdf"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn demo_rejects_more_than_two_joint_applicants() {
        assert!(Cli::try_parse_from(["booking-form-api", "demo", "--joint-applicants", "3"]).is_err());
    }
}
