/// Load .env file (silently ignores if missing). Binaries call this before
/// parsing their env-backed CLI flags; library code never reads the
/// environment.
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}
