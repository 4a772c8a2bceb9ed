fn main() -> anyhow::Result<()> {
    memeforge::run()?;
    Ok(())
}
