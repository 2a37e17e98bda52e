use clap::Parser;

use gup::cli::{self, Variant};
use gup::ui;

#[derive(clap::Parser)]
#[command(
    name = "gup",
    version,
    about = "Stage, version, commit and push a release with an AI-drafted message"
)]
struct Args {}

fn main() {
    let _args = Args::parse();
    cli::init_logging();

    let code = match cli::run(Variant::Gup, None) {
        Ok(code) => code,
        Err(e) => {
            ui::display_error(&format!("{:#}", e));
            1
        }
    };
    std::process::exit(code);
}
