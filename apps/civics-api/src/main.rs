use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = civics_api::Args::parse();

	civics_api::run(args).await
}
