fn main() -> anyhow::Result<()> {
    scastat_cli::run()
}
