fn main() -> anyhow::Result<()> {
    transbranch::run()
}
