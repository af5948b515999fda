fn main() -> Result<(), anyhow::Error> {
    gizmo_run::run()
}
