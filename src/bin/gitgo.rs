use clap::Parser;

use gup::cli::{self, Variant};
use gup::ui;

#[derive(clap::Parser)]
#[command(
    name = "gitgo",
    version,
    about = "Stage, version, commit and push a release with a hand-written message"
)]
struct Args {}

fn main() {
    let _args = Args::parse();
    cli::init_logging();

    let code = match cli::run(Variant::Gitgo, None) {
        Ok(code) => code,
        Err(e) => {
            ui::display_error(&format!("{:#}", e));
            1
        }
    };
    std::process::exit(code);
}
