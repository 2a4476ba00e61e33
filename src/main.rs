fn main() -> anyhow::Result<()> {
    attendly_lib::run()
}
