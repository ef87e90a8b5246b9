fn main() {
    env_logger::init();
    log::info!("Chess - terminal");

    if let Err(e) = chess_core::terminal::run_interactive_terminal() {
        log::error!("terminal session failed: {e}");
        std::process::exit(1);
    }
}
