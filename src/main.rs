fn main() {
    if let Err(e) = cubelight::flow::run() {
        eprintln!("Failed to start: {:#}", e);
        std::process::exit(-1);
    }
}
