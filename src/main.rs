mod config;
mod download;
mod generate;
mod media;
mod player;
mod runtime;
mod shell;
mod track;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
