use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = diana_memo::Args::parse();

	diana_memo::run(args).await
}
