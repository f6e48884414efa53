mod app;
mod compositor;
mod config;
mod driver;
mod input;
mod model;
mod render;

use anyhow::Result;

fn main() -> Result<()> {
    app::run()
}
