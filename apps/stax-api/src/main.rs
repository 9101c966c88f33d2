use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = stax_api::Args::parse();

	stax_api::run(args).await
}
