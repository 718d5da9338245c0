use clap::Parser;

use civics_eval::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = Args::parse();

	civics_eval::run(args).await
}
