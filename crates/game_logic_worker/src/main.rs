#[tokio::main]
async fn main() {
    if let Err(e) = lib_game_logic::init().await {
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
}
