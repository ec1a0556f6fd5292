use anyhow::Result;

fn main() -> Result<()> {
    newsdigest::cli::run()
}
