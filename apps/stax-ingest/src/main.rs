use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = stax_ingest::Args::parse();

	stax_ingest::run(args).await
}
