fn main() {
    wlpipe::app::cli::run();
}
