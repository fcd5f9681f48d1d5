fn main() -> anyhow::Result<()> {
    per_nefer::page::run()
}
