fn main() {
    if let Err(err) = maskbot_lib::run() {
        log::error!("{err:#}");
        std::process::exit(1);
    }
}
